//! Literal construction

use serde_json::{Number, Value};

use super::context::Direction;
use super::options::RdfDirection;
use super::tokenizer::Scalar;
use crate::rdf::vocab::{i18n, rdf, xsd};
use crate::rdf::{Literal, NamedNode, RdfResult, Term};

/// Object of a value: a term, or a compound literal still needing its blank node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ValueTerm {
    Term(Term),
    Compound {
        value: Literal,
        language: Option<String>,
        direction: Direction,
    },
}

/// `xsd:double` canonical lexical form (`1.1E0`, `1.0E21`)
pub(crate) fn canonical_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_owned();
    }
    let formatted = format!("{:E}", value);
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// Integer lexical form when the number has no fractional part and is below 1e21
fn integer_form(number: &Number) -> Option<String> {
    if let Some(i) = number.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = number.as_u64() {
        return Some(u.to_string());
    }
    let f = number.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
        Some(format!("{:.0}", f))
    } else {
        None
    }
}

fn named(iri: &str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

/// Literal for a native JSON scalar; `None` for null.
///
/// `datatype` comes from type coercion or a value object's `@type`.
pub(crate) fn native_literal(scalar: &Scalar, datatype: Option<NamedNode>) -> Option<Literal> {
    match scalar {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(Literal::new_typed_literal(
            b.to_string(),
            datatype.unwrap_or_else(|| named(xsd::BOOLEAN)),
        )),
        Scalar::Number(n) => {
            let wants_double = datatype.as_ref().map_or(false, |d| d.as_str() == xsd::DOUBLE);
            match integer_form(n) {
                Some(lexical) if !wants_double => Some(Literal::new_typed_literal(
                    lexical,
                    datatype.unwrap_or_else(|| named(xsd::INTEGER)),
                )),
                _ => {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    Some(Literal::new_typed_literal(
                        canonical_double(f),
                        datatype.unwrap_or_else(|| named(xsd::DOUBLE)),
                    ))
                }
            }
        }
        Scalar::String(s) => Some(match datatype {
            Some(dt) => Literal::new_typed_literal(s.as_str(), dt),
            None => Literal::new_simple_literal(s.as_str()),
        }),
    }
}

/// String literal with optional language and base direction
pub(crate) fn string_literal(
    value: &str,
    language: Option<&str>,
    direction: Option<Direction>,
    mode: Option<RdfDirection>,
) -> RdfResult<ValueTerm> {
    match (direction, mode) {
        (Some(dir), Some(RdfDirection::I18nDatatype)) => {
            let tag = language.map(str::to_ascii_lowercase).unwrap_or_default();
            let datatype = NamedNode::new(format!("{}{}_{}", i18n::NAMESPACE, tag, dir.as_str()))?;
            Ok(ValueTerm::Term(Literal::new_typed_literal(value, datatype).into()))
        }
        (Some(dir), Some(RdfDirection::CompoundLiteral)) => {
            // validate the tag now, the compound node carries it as a plain string
            if let Some(tag) = language {
                Literal::new_language_tagged_literal(value, tag)?;
            }
            Ok(ValueTerm::Compound {
                value: Literal::new_simple_literal(value),
                language: language.map(str::to_owned),
                direction: dir,
            })
        }
        _ => match language {
            Some(tag) => Ok(ValueTerm::Term(Literal::new_language_tagged_literal(value, tag)?.into())),
            None => Ok(ValueTerm::Term(Literal::new_simple_literal(value).into())),
        },
    }
}

/// `rdf:JSON` literal holding the canonical form of `value`
pub(crate) fn json_literal(value: &Value) -> Literal {
    Literal::new_typed_literal(canonical_json(value), named(rdf::JSON))
}

/// RFC 8785 (JCS) serialization
pub(crate) fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // keys ordered by UTF-16 code units
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.encode_utf16().cmp(b.0.encode_utf16()));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
    }
}

/// ECMAScript number serialization
fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let f = n.as_f64().unwrap_or(0.0);
    if f == 0.0 {
        return "0".to_owned();
    }
    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        if f.fract() == 0.0 {
            format!("{:.0}", f)
        } else {
            f.to_string()
        }
    } else {
        let formatted = format!("{:e}", f);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_double() {
        assert_eq!(canonical_double(1.1), "1.1E0");
        assert_eq!(canonical_double(1e21), "1.0E21");
        assert_eq!(canonical_double(-0.5), "-5.0E-1");
        assert_eq!(canonical_double(123.456), "1.23456E2");
    }

    #[test]
    fn test_native_numbers() {
        let int = native_literal(&Scalar::Number(42.into()), None).unwrap();
        assert_eq!(int.value(), "42");
        assert_eq!(int.datatype(), xsd::INTEGER);

        let whole = Number::from_f64(5.0).unwrap();
        let lit = native_literal(&Scalar::Number(whole), None).unwrap();
        assert_eq!(lit.value(), "5");
        assert_eq!(lit.datatype(), xsd::INTEGER);

        let frac = Number::from_f64(1.5).unwrap();
        let lit = native_literal(&Scalar::Number(frac), None).unwrap();
        assert_eq!(lit.value(), "1.5E0");
        assert_eq!(lit.datatype(), xsd::DOUBLE);

        let big = Number::from_f64(1e21).unwrap();
        assert_eq!(native_literal(&Scalar::Number(big), None).unwrap().value(), "1.0E21");

        let forced = native_literal(&Scalar::Number(3.into()), Some(named(xsd::DOUBLE))).unwrap();
        assert_eq!(forced.value(), "3.0E0");
    }

    #[test]
    fn test_native_bool_and_string() {
        let b = native_literal(&Scalar::Bool(true), None).unwrap();
        assert_eq!(b.value(), "true");
        assert_eq!(b.datatype(), xsd::BOOLEAN);
        assert!(native_literal(&Scalar::Null, None).is_none());
        let s = native_literal(&Scalar::String("x".into()), None).unwrap();
        assert!(s.is_plain());
    }

    #[test]
    fn test_direction_modes() {
        let plain = string_literal("abc", Some("en"), Some(Direction::Rtl), None).unwrap();
        match plain {
            ValueTerm::Term(Term::Literal(l)) => assert_eq!(l.language(), Some("en")),
            other => panic!("unexpected {:?}", other),
        }

        let typed = string_literal("abc", Some("en-US"), Some(Direction::Rtl), Some(RdfDirection::I18nDatatype)).unwrap();
        match typed {
            ValueTerm::Term(Term::Literal(l)) => {
                assert_eq!(l.datatype(), "https://www.w3.org/ns/i18n#en-us_rtl")
            }
            other => panic!("unexpected {:?}", other),
        }

        let compound = string_literal("abc", None, Some(Direction::Ltr), Some(RdfDirection::CompoundLiteral)).unwrap();
        assert!(matches!(compound, ValueTerm::Compound { direction: Direction::Ltr, .. }));

        assert!(string_literal("abc", Some("not a tag"), None, None).is_err());
    }

    #[test]
    fn test_canonical_json() {
        let value = json!({"b": [1, 2.5, true], "a": {"z": null, "y": "\u{00e9}\n"}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"y":"é\n","z":null},"b":[1,2.5,true]}"#
        );
        assert_eq!(canonical_json(&json!(1e21)), "1e+21");
        assert_eq!(canonical_json(&json!(10.0)), "10");
        let lit = json_literal(&json!([]));
        assert_eq!(lit.value(), "[]");
        assert_eq!(lit.datatype(), rdf::JSON);
    }
}
