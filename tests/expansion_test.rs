use std::collections::HashSet;

use streamld::jsonld::{quads_from_str, JsonLdErrorCode, ParserOptions, RdfDirection};
use streamld::rdf::{GraphName, Quad, Term};

/// N-Quads line with every blank node written as `_:_`
fn shape(quad: &Quad) -> String {
    fn term(t: &Term) -> String {
        match t {
            Term::BlankNode(_) => "_:_".to_string(),
            Term::Triple(t) => format!("<< {} {} {} >>", term(&t.subject), term(&t.predicate), term(&t.object)),
            other => other.to_string(),
        }
    }
    match &quad.graph_name {
        GraphName::DefaultGraph => format!("{} {} {} .", term(&quad.subject), term(&quad.predicate), term(&quad.object)),
        GraphName::NamedNode(g) => format!(
            "{} {} {} {} .",
            term(&quad.subject),
            term(&quad.predicate),
            term(&quad.object),
            g
        ),
        GraphName::BlankNode(_) => format!(
            "{} {} {} _:_ .",
            term(&quad.subject),
            term(&quad.predicate),
            term(&quad.object)
        ),
    }
}

fn expand_with(input: &str, options: ParserOptions) -> Vec<Quad> {
    quads_from_str(input, options).unwrap()
}

fn expand(input: &str) -> Vec<Quad> {
    expand_with(input, ParserOptions::default())
}

fn sorted(quads: &[Quad]) -> Vec<String> {
    let mut lines: Vec<String> = quads.iter().map(shape).collect();
    lines.sort();
    lines
}

fn blank_nodes(quads: &[Quad]) -> HashSet<String> {
    let mut labels = HashSet::new();
    for quad in quads {
        for t in [&quad.subject, &quad.object] {
            if let Term::BlankNode(b) = t {
                labels.insert(b.as_str().to_string());
            }
        }
    }
    labels
}

const RDF_TYPE: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>";
const RDF_FIRST: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#first>";
const RDF_REST: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#rest>";
const RDF_NIL: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>";

#[test]
fn test_native_values_and_type() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://schema.org/"},
            "@id": "http://example.org/alice",
            "@type": "Person",
            "age": 30,
            "height": 1.75,
            "alive": true
        }"#,
    );
    let mut expected = vec![
        format!("<http://example.org/alice> {} <http://schema.org/Person> .", RDF_TYPE),
        r#"<http://example.org/alice> <http://schema.org/age> "30"^^<http://www.w3.org/2001/XMLSchema#integer> ."#.to_string(),
        r#"<http://example.org/alice> <http://schema.org/height> "1.75E0"^^<http://www.w3.org/2001/XMLSchema#double> ."#.to_string(),
        r#"<http://example.org/alice> <http://schema.org/alive> "true"^^<http://www.w3.org/2001/XMLSchema#boolean> ."#.to_string(),
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
}

#[test]
fn test_type_keeps_source_order() {
    let quads = expand(r#"{"@id": "http://ex/a", "http://ex/p": "o", "@type": "http://ex/T"}"#);
    assert_eq!(
        quads.iter().map(shape).collect::<Vec<_>>(),
        vec![
            r#"<http://ex/a> <http://ex/p> "o" ."#.to_string(),
            format!("<http://ex/a> {} <http://ex/T> .", RDF_TYPE),
        ]
    );
}

#[test]
fn test_anonymous_nested_node() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/"},
            "@id": "http://example.org/a",
            "knows": {"name": "B"}
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/knows> _:_ ."#,
            r#"_:_ <http://example.org/name> "B" ."#,
        ]
    );
    assert_eq!(blank_nodes(&quads).len(), 1);
}

#[test]
fn test_blank_node_labels_are_shared() {
    let quads = expand(
        r#"[
            {"@id": "_:n1", "http://example.org/p": {"@id": "_:n1"}},
            {"@id": "_:n2", "http://example.org/p": "x"}
        ]"#,
    );
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[0].subject, quads[0].object);
    assert_ne!(quads[0].subject, quads[1].subject);
}

#[test]
fn test_list_container() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/", "items": {"@container": "@list"}},
            "@id": "http://example.org/a",
            "items": ["x", "y"]
        }"#,
    );
    let mut expected = vec![
        "<http://example.org/a> <http://example.org/items> _:_ .".to_string(),
        format!(r#"_:_ {} "x" ."#, RDF_FIRST),
        format!(r#"_:_ {} "y" ."#, RDF_FIRST),
        format!("_:_ {} _:_ .", RDF_REST),
        format!("_:_ {} {} .", RDF_REST, RDF_NIL),
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
    assert_eq!(blank_nodes(&quads).len(), 2);
}

#[test]
fn test_empty_list_is_nil() {
    let quads = expand(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/items": {"@list": []}
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![format!("<http://example.org/a> <http://example.org/items> {} .", RDF_NIL)]
    );
}

#[test]
fn test_nested_lists() {
    let quads = expand(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/m": {"@list": [["x"]]}
        }"#,
    );
    // outer cell, inner cell, link
    assert_eq!(quads.len(), 5);
    assert_eq!(blank_nodes(&quads).len(), 2);
    let firsts: Vec<String> = quads
        .iter()
        .filter(|q| q.predicate.to_string() == RDF_FIRST)
        .map(|q| shape(q))
        .collect();
    assert!(firsts.contains(&format!("_:_ {} _:_ .", RDF_FIRST)));
    assert!(firsts.contains(&format!(r#"_:_ {} "x" ."#, RDF_FIRST)));
}

#[test]
fn test_reverse_property() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/"},
            "@id": "http://example.org/a",
            "@reverse": {"parent": {"@id": "http://example.org/b"}}
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec!["<http://example.org/b> <http://example.org/parent> <http://example.org/a> ."]
    );
}

#[test]
fn test_reverse_term_definition() {
    let quads = expand(
        r#"{
            "@context": {"children": {"@reverse": "http://example.org/parent", "@type": "@id"}},
            "@id": "http://example.org/a",
            "children": ["http://example.org/b", "http://example.org/c"]
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            "<http://example.org/b> <http://example.org/parent> <http://example.org/a> .",
            "<http://example.org/c> <http://example.org/parent> <http://example.org/a> .",
        ]
    );
}

#[test]
fn test_named_graph() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/"},
            "@id": "http://example.org/g",
            "@graph": [{"@id": "http://example.org/a", "name": "A"}]
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![r#"<http://example.org/a> <http://example.org/name> "A" <http://example.org/g> ."#]
    );
}

#[test]
fn test_top_level_graph_is_default_graph() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/"},
            "@graph": [
                {"@id": "http://example.org/a", "name": "A"},
                {"@id": "http://example.org/b", "name": "B"}
            ]
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/name> "A" ."#,
            r#"<http://example.org/b> <http://example.org/name> "B" ."#,
        ]
    );
}

#[test]
fn test_default_graph_option() {
    let quads = expand_with(
        r#"{"@id": "http://example.org/a", "http://example.org/p": "x"}"#,
        ParserOptions::default().with_default_graph("http://example.org/g"),
    );
    assert_eq!(
        sorted(&quads),
        vec![r#"<http://example.org/a> <http://example.org/p> "x" <http://example.org/g> ."#]
    );
}

#[test]
fn test_language_values() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/", "@language": "en"},
            "@id": "http://example.org/a",
            "label": "hi",
            "note": {"@value": "salut", "@language": "fr"},
            "count": 3
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/count> "3"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
            r#"<http://example.org/a> <http://example.org/label> "hi"@en ."#,
            r#"<http://example.org/a> <http://example.org/note> "salut"@fr ."#,
        ]
    );
}

#[test]
fn test_language_map() {
    let quads = expand(
        r#"{
            "@context": {"label": {"@id": "http://example.org/label", "@container": "@language"}},
            "@id": "http://example.org/a",
            "label": {"en": "Hello", "de": ["Hallo", "Servus"], "@none": "Hi"}
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/label> "Hallo"@de ."#,
            r#"<http://example.org/a> <http://example.org/label> "Hello"@en ."#,
            r#"<http://example.org/a> <http://example.org/label> "Hi" ."#,
            r#"<http://example.org/a> <http://example.org/label> "Servus"@de ."#,
        ]
    );
}

#[test]
fn test_id_map() {
    let quads = expand(
        r#"{
            "@context": {
                "@vocab": "http://example.org/",
                "people": {"@container": "@id"}
            },
            "@id": "http://example.org/team",
            "people": {
                "http://example.org/alice": {"name": "Alice"}
            }
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/alice> <http://example.org/name> "Alice" ."#,
            "<http://example.org/team> <http://example.org/people> <http://example.org/alice> .",
        ]
    );
}

#[test]
fn test_typed_value_coercion() {
    let quads = expand(
        r#"{
            "@context": {
                "date": {"@id": "http://example.org/date", "@type": "http://www.w3.org/2001/XMLSchema#date"},
                "homepage": {"@id": "http://example.org/homepage", "@type": "@id"}
            },
            "@id": "http://example.org/a",
            "date": "2024-01-01",
            "homepage": "http://example.org/home"
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/date> "2024-01-01"^^<http://www.w3.org/2001/XMLSchema#date> ."#,
            "<http://example.org/a> <http://example.org/homepage> <http://example.org/home> .",
        ]
    );
}

#[test]
fn test_json_literal() {
    let quads = expand(
        r#"{
            "@context": {"data": {"@id": "http://example.org/data", "@type": "@json"}},
            "@id": "http://example.org/a",
            "data": {"b": 1, "a": [true, null]}
        }"#,
    );
    assert_eq!(quads.len(), 1);
    let literal = quads[0].object.as_literal().unwrap();
    assert_eq!(literal.value(), r#"{"a":[true,null],"b":1}"#);
    assert_eq!(literal.datatype(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON");
}

#[test]
fn test_direction_as_compound_literal() {
    let quads = expand_with(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/p": {"@value": "שלום", "@language": "he", "@direction": "rtl"}
        }"#,
        ParserOptions::default().with_rdf_direction(RdfDirection::CompoundLiteral),
    );
    assert_eq!(
        sorted(&quads),
        vec![
            "<http://example.org/a> <http://example.org/p> _:_ .",
            r#"_:_ <http://www.w3.org/1999/02/22-rdf-syntax-ns#direction> "rtl" ."#,
            r#"_:_ <http://www.w3.org/1999/02/22-rdf-syntax-ns#language> "he" ."#,
            r#"_:_ <http://www.w3.org/1999/02/22-rdf-syntax-ns#value> "שלום" ."#,
        ]
    );
}

#[test]
fn test_direction_as_i18n_datatype() {
    let quads = expand_with(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/p": {"@value": "abc", "@language": "EN", "@direction": "ltr"}
        }"#,
        ParserOptions::default().with_rdf_direction(RdfDirection::I18nDatatype),
    );
    assert_eq!(quads.len(), 1);
    assert_eq!(
        quads[0].object.as_literal().unwrap().datatype(),
        "https://www.w3.org/ns/i18n#en_ltr"
    );
}

#[test]
fn test_scoped_contexts() {
    let quads = expand(
        r#"{
            "@context": {
                "@vocab": "http://example.org/",
                "author": {"@context": {"name": "http://xmlns.com/foaf/0.1/name"}},
                "Book": {"@context": {"title": "http://purl.org/dc/terms/title"}}
            },
            "@id": "http://example.org/book",
            "@type": "Book",
            "title": "Streams",
            "author": {"@id": "http://example.org/ann", "name": "Ann"}
        }"#,
    );
    let mut expected = vec![
        format!("<http://example.org/book> {} <http://example.org/Book> .", RDF_TYPE),
        r#"<http://example.org/book> <http://purl.org/dc/terms/title> "Streams" ."#.to_string(),
        "<http://example.org/book> <http://example.org/author> <http://example.org/ann> .".to_string(),
        r#"<http://example.org/ann> <http://xmlns.com/foaf/0.1/name> "Ann" ."#.to_string(),
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
}

#[test]
fn test_included_and_nest() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://example.org/", "meta": "@nest"},
            "@id": "http://example.org/a",
            "meta": {"name": "A"},
            "@included": [{"@id": "http://example.org/b", "name": "B"}]
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://example.org/a> <http://example.org/name> "A" ."#,
            r#"<http://example.org/b> <http://example.org/name> "B" ."#,
        ]
    );
}

#[test]
fn test_null_values_are_dropped() {
    let quads = expand(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/p": null,
            "http://example.org/q": [null, "x"],
            "http://example.org/r": {"@value": null}
        }"#,
    );
    assert_eq!(sorted(&quads), vec![r#"<http://example.org/a> <http://example.org/q> "x" ."#]);
}

#[test]
fn test_relative_ids_against_base() {
    let quads = expand_with(
        r#"{"@id": "doc#a", "http://example.org/p": {"@id": "../b"}}"#,
        ParserOptions::default().with_base_iri("http://example.org/dir/base"),
    );
    assert_eq!(
        sorted(&quads),
        vec!["<http://example.org/dir/doc#a> <http://example.org/p> <http://example.org/b> ."]
    );
}

#[test]
fn test_invalid_id_drops_node() {
    let quads = expand(r#"{"@id": "not an iri", "http://example.org/p": "x"}"#);
    assert!(quads.is_empty());

    let err = quads_from_str(
        r#"{"@id": "not an iri", "http://example.org/p": "x"}"#,
        ParserOptions::default().with_strict_values(true),
    )
    .unwrap_err();
    assert_eq!(err.code, JsonLdErrorCode::InvalidIdValue);
}

#[test]
fn test_errors() {
    let cases = [
        (r#"{"@id": 5}"#, JsonLdErrorCode::InvalidIdValue),
        (
            r#"{"@id": "http://example.org/a", "http://example.org/p": {"@value": "x", "http://example.org/q": "y"}}"#,
            JsonLdErrorCode::InvalidValueObject,
        ),
        (
            r#"{"@id": "http://example.org/a", "http://example.org/p": {"@value": {"a": 1}}}"#,
            JsonLdErrorCode::InvalidValueObjectValue,
        ),
        (
            r#"{"@id": "http://example.org/a", "http://example.org/p": {"@value": 1, "@language": "en"}}"#,
            JsonLdErrorCode::InvalidLanguageTaggedValue,
        ),
        (
            r#"{"@id": "http://example.org/a", "@reverse": {"http://example.org/p": "literal"}}"#,
            JsonLdErrorCode::InvalidReversePropertyValue,
        ),
        (r#"{"@context": {"@vocab": 5}}"#, JsonLdErrorCode::InvalidVocabMapping),
        (r#"{"@id": }"#, JsonLdErrorCode::SyntaxError),
        (r#"{"@id": "http://example.org/a""#, JsonLdErrorCode::UnclosedDocument),
    ];
    for (input, code) in cases {
        let err = quads_from_str(input, ParserOptions::default()).unwrap_err();
        assert_eq!(err.code, code, "input: {}", input);
    }
}

#[test]
fn test_error_carries_position() {
    let err = quads_from_str(
        "{\n  \"@id\": \"http://example.org/a\",\n  \"http://example.org/p\": {\"@value\": {}}\n}",
        ParserOptions::default().with_streaming_profile(true),
    )
    .unwrap_err();
    let position = err.position.unwrap();
    assert_eq!(position.line, 3);
}

#[test]
fn test_nulls_are_elided_from_lists() {
    let quads = expand(
        r#"{
            "@id": "http://example.org/a",
            "http://example.org/items": {"@list": ["x", null, "y"]}
        }"#,
    );
    // two cells, the null leaves no gap
    assert_eq!(quads.len(), 5);
    assert_eq!(blank_nodes(&quads).len(), 2);
}

#[test]
fn test_late_id_gives_the_same_quads() {
    let early = r#"{"@id": "http://example.org/a", "http://example.org/p": "x", "http://example.org/q": {"@id": "http://example.org/b"}}"#;
    let late = r#"{"http://example.org/p": "x", "http://example.org/q": {"@id": "http://example.org/b"}, "@id": "http://example.org/a"}"#;
    let expected = sorted(&expand(early));
    assert_eq!(sorted(&expand(late)), expected);
    let strict = ParserOptions::default().with_streaming_profile(true);
    assert_eq!(sorted(&expand_with(late, strict)), expected);
}

#[test]
fn test_blank_node_predicates_need_generalized_rdf() {
    let input = r#"{"@id": "http://example.org/a", "_:p": "x", "http://example.org/q": "y"}"#;
    assert_eq!(
        sorted(&expand(input)),
        vec![r#"<http://example.org/a> <http://example.org/q> "y" ."#]
    );
    let quads = expand_with(input, ParserOptions::default().with_generalized_rdf(true));
    assert_eq!(quads.len(), 2);
    assert!(quads.iter().any(|q| q.predicate.is_blank_node()));
}

#[test]
fn test_index_maps() {
    let quads = expand(
        r#"{
            "@context": {
                "@vocab": "http://ex/",
                "plain": {"@container": "@index"},
                "byCat": {"@container": "@index", "@index": "category"},
                "byRef": {"@container": "@index", "@index": "ref"},
                "ref": {"@type": "@id"}
            },
            "@id": "http://ex/a",
            "plain": {"one": "x", "two": {"@id": "http://ex/n"}},
            "byCat": {"news": {"@id": "http://ex/b"}, "@none": {"@id": "http://ex/d"}},
            "byRef": {"http://ex/t": {"@id": "http://ex/c"}}
        }"#,
    );
    let mut expected = vec![
        r#"<http://ex/a> <http://ex/plain> "x" ."#,
        "<http://ex/a> <http://ex/plain> <http://ex/n> .",
        "<http://ex/a> <http://ex/byCat> <http://ex/b> .",
        r#"<http://ex/b> <http://ex/category> "news" ."#,
        "<http://ex/a> <http://ex/byCat> <http://ex/d> .",
        "<http://ex/a> <http://ex/byRef> <http://ex/c> .",
        "<http://ex/c> <http://ex/ref> <http://ex/t> .",
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
}

#[test]
fn test_type_map_expands_keys_with_vocab() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://ex/", "things": {"@container": "@type"}},
            "@id": "http://ex/a",
            "things": {
                "Widget": {"@id": "http://ex/w", "name": "W"},
                "Gadget": "http://ex/g"
            }
        }"#,
    );
    let mut expected = vec![
        "<http://ex/a> <http://ex/things> <http://ex/w> .".to_string(),
        format!("<http://ex/w> {} <http://ex/Widget> .", RDF_TYPE),
        r#"<http://ex/w> <http://ex/name> "W" ."#.to_string(),
        "<http://ex/a> <http://ex/things> <http://ex/g> .".to_string(),
        format!("<http://ex/g> {} <http://ex/Gadget> .", RDF_TYPE),
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
}

#[test]
fn test_graph_containers() {
    let quads = expand(
        r#"{
            "@context": {
                "@vocab": "http://ex/",
                "g": {"@container": "@graph"},
                "gi": {"@container": ["@graph", "@id"]}
            },
            "@id": "http://ex/a",
            "g": {"@id": "http://ex/b", "name": "B"},
            "gi": {"http://ex/G1": {"@id": "http://ex/c", "name": "C"}}
        }"#,
    );
    let mut expected = vec![
        "<http://ex/a> <http://ex/g> _:_ .",
        r#"<http://ex/b> <http://ex/name> "B" _:_ ."#,
        "<http://ex/a> <http://ex/gi> <http://ex/G1> .",
        r#"<http://ex/c> <http://ex/name> "C" <http://ex/G1> ."#,
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);

    // the blank graph name is the object of the linking triple
    let link = quads.iter().find(|q| q.predicate.to_string() == "<http://ex/g>").unwrap();
    let named = quads.iter().find(|q| q.subject.to_string() == "<http://ex/b>").unwrap();
    match (&link.object, &named.graph_name) {
        (Term::BlankNode(a), GraphName::BlankNode(b)) => assert_eq!(a, b),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_set_values() {
    let quads = expand(
        r#"{
            "@context": {"@vocab": "http://ex/", "tags": {"@container": "@set"}},
            "@id": "http://ex/a",
            "tags": ["x"],
            "other": {"@set": ["y", "z"]},
            "none": {"@set": []}
        }"#,
    );
    assert_eq!(
        sorted(&quads),
        vec![
            r#"<http://ex/a> <http://ex/other> "y" ."#,
            r#"<http://ex/a> <http://ex/other> "z" ."#,
            r#"<http://ex/a> <http://ex/tags> "x" ."#,
        ]
    );
}

#[test]
fn test_subject_lists_need_the_option() {
    let input = r#"{"@id": "http://ex/a", "@reverse": {"http://ex/p": {"@list": ["x"]}}}"#;
    let err = quads_from_str(input, ParserOptions::default()).unwrap_err();
    assert_eq!(err.code, JsonLdErrorCode::InvalidReversePropertyValue);

    let quads = expand_with(input, ParserOptions::default().with_subject_lists(true));
    let mut expected = vec![
        "_:_ <http://ex/p> <http://ex/a> .".to_string(),
        format!(r#"_:_ {} "x" ."#, RDF_FIRST),
        format!("_:_ {} {} .", RDF_REST, RDF_NIL),
    ];
    expected.sort();
    assert_eq!(sorted(&quads), expected);
    assert_eq!(blank_nodes(&quads).len(), 1);
}

#[test]
fn test_language_tag_normalization() {
    let input = r#"{
        "@context": {"label": {"@id": "http://ex/label", "@container": "@language"}},
        "@id": "http://ex/a",
        "http://ex/p": {"@value": "x", "@language": "EN-US"},
        "label": {"DE-AT": "y"}
    }"#;
    assert_eq!(
        sorted(&expand(input)),
        vec![
            r#"<http://ex/a> <http://ex/label> "y"@DE-AT ."#,
            r#"<http://ex/a> <http://ex/p> "x"@EN-US ."#,
        ]
    );
    assert_eq!(
        sorted(&expand_with(input, ParserOptions::default().with_normalized_language_tags(true))),
        vec![
            r#"<http://ex/a> <http://ex/label> "y"@de-at ."#,
            r#"<http://ex/a> <http://ex/p> "x"@en-us ."#,
        ]
    );
}

#[test]
fn test_strict_values_rejects_unmapped_keys() {
    let cases = [
        r#"{"@id": "http://ex/a", "@foo": "x", "http://ex/p": "z"}"#,
        r#"{"@id": "http://ex/a", "relative": "y", "http://ex/p": "z"}"#,
    ];
    for input in cases {
        assert_eq!(
            sorted(&expand(input)),
            vec![r#"<http://ex/a> <http://ex/p> "z" ."#],
            "input: {}",
            input
        );
        let err = quads_from_str(input, ParserOptions::default().with_strict_values(true)).unwrap_err();
        assert_eq!(err.code, JsonLdErrorCode::InvalidIriMapping, "input: {}", input);
    }
}

#[test]
fn test_protected_term_in_document() {
    let different = r#"{
        "@context": [
            {"@protected": true, "name": "http://schema.org/name"},
            {"name": "http://example.org/name"}
        ],
        "@id": "http://ex/a",
        "name": "A"
    }"#;
    let err = quads_from_str(different, ParserOptions::default()).unwrap_err();
    assert_eq!(err.code, JsonLdErrorCode::ProtectedTermRedefinition);

    let identical = r#"{
        "@context": [
            {"@protected": true, "name": "http://schema.org/name"},
            {"name": "http://schema.org/name"}
        ],
        "@id": "http://ex/a",
        "name": "A"
    }"#;
    assert_eq!(
        sorted(&expand(identical)),
        vec![r#"<http://ex/a> <http://schema.org/name> "A" ."#]
    );

    let nested = r#"{
        "@context": {"@protected": true, "@vocab": "http://ex/", "name": "http://schema.org/name"},
        "@id": "http://ex/a",
        "friend": {"@context": {"name": "http://example.org/name"}, "name": "B"}
    }"#;
    let err = quads_from_str(nested, ParserOptions::default()).unwrap_err();
    assert_eq!(err.code, JsonLdErrorCode::ProtectedTermRedefinition);
}
