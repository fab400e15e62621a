//! Keywords and IRI helpers

use oxiri::Iri;

/// JSON-LD keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Annotation,
    Base,
    Container,
    Context,
    Direction,
    Graph,
    Id,
    Import,
    Included,
    Index,
    Json,
    Language,
    List,
    Nest,
    None,
    Prefix,
    Propagate,
    Protected,
    Reverse,
    Set,
    Type,
    Value,
    Version,
    Vocab,
}

impl Keyword {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "@annotation" => Self::Annotation,
            "@base" => Self::Base,
            "@container" => Self::Container,
            "@context" => Self::Context,
            "@direction" => Self::Direction,
            "@graph" => Self::Graph,
            "@id" => Self::Id,
            "@import" => Self::Import,
            "@included" => Self::Included,
            "@index" => Self::Index,
            "@json" => Self::Json,
            "@language" => Self::Language,
            "@list" => Self::List,
            "@nest" => Self::Nest,
            "@none" => Self::None,
            "@prefix" => Self::Prefix,
            "@propagate" => Self::Propagate,
            "@protected" => Self::Protected,
            "@reverse" => Self::Reverse,
            "@set" => Self::Set,
            "@type" => Self::Type,
            "@value" => Self::Value,
            "@version" => Self::Version,
            "@vocab" => Self::Vocab,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annotation => "@annotation",
            Self::Base => "@base",
            Self::Container => "@container",
            Self::Context => "@context",
            Self::Direction => "@direction",
            Self::Graph => "@graph",
            Self::Id => "@id",
            Self::Import => "@import",
            Self::Included => "@included",
            Self::Index => "@index",
            Self::Json => "@json",
            Self::Language => "@language",
            Self::List => "@list",
            Self::Nest => "@nest",
            Self::None => "@none",
            Self::Prefix => "@prefix",
            Self::Propagate => "@propagate",
            Self::Protected => "@protected",
            Self::Reverse => "@reverse",
            Self::Set => "@set",
            Self::Type => "@type",
            Self::Value => "@value",
            Self::Version => "@version",
            Self::Vocab => "@vocab",
        }
    }

    /// Bit used to track which keywords an object has already seen
    pub(crate) fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

pub fn is_keyword(s: &str) -> bool {
    Keyword::parse(s).is_some()
}

/// `@` followed by ASCII letters only: reserved for future keywords and ignored
pub fn looks_like_keyword(s: &str) -> bool {
    s.len() > 1
        && s.starts_with('@')
        && s[1..].bytes().all(|b| b.is_ascii_alphabetic())
}

pub fn is_blank_node_label(s: &str) -> bool {
    s.starts_with("_:")
}

/// Has a scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`)
pub fn has_scheme(s: &str) -> bool {
    let Some(colon) = s.find(':') else {
        return false;
    };
    let scheme = &s[..colon];
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
}

/// Absolute IRI in the JSON-LD sense: a scheme, not a blank node label
pub fn is_absolute_iri(s: &str) -> bool {
    !is_blank_node_label(s) && has_scheme(s)
}

/// Resolve `reference` against `base` (RFC 3986); `None` when either is malformed
pub fn resolve_iri(base: &str, reference: &str) -> Option<String> {
    let base = Iri::parse(base.to_owned()).ok()?;
    base.resolve(reference).ok().map(Iri::into_inner)
}

/// Last character is an RFC 3987 gen-delim, so a term mapping to it is a prefix
pub fn ends_with_gen_delim(s: &str) -> bool {
    matches!(
        s.chars().last(),
        Some(':') | Some('/') | Some('?') | Some('#') | Some('[') | Some(']') | Some('@')
    )
}
