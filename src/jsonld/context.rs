//! Active contexts and term definitions
//!
//! A [`Context`] is immutable once built; processing a local context clones
//! the term table (definitions are shared through `Arc`) and produces a new
//! one. Non-propagated contexts keep the context they replaced in
//! `previous`, which node objects nested below them revert to.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

use super::iri::{has_scheme, is_blank_node_label, is_keyword, looks_like_keyword, resolve_iri};
use super::options::ProcessingMode;

/// Base direction of a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ltr" => Some(Direction::Ltr),
            "rtl" => Some(Direction::Rtl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// `@container` mapping as a set of flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContainerMapping(u8);

impl ContainerMapping {
    pub const LIST: u8 = 1;
    pub const SET: u8 = 1 << 1;
    pub const INDEX: u8 = 1 << 2;
    pub const LANGUAGE: u8 = 1 << 3;
    pub const ID: u8 = 1 << 4;
    pub const TYPE: u8 = 1 << 5;
    pub const GRAPH: u8 = 1 << 6;

    pub fn flag(keyword: &str) -> Option<u8> {
        Some(match keyword {
            "@list" => Self::LIST,
            "@set" => Self::SET,
            "@index" => Self::INDEX,
            "@language" => Self::LANGUAGE,
            "@id" => Self::ID,
            "@type" => Self::TYPE,
            "@graph" => Self::GRAPH,
            _ => return None,
        })
    }

    pub fn insert(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn is_list(self) -> bool {
        self.has(Self::LIST)
    }

    pub fn is_graph(self) -> bool {
        self.has(Self::GRAPH)
    }

    /// Containers whose JSON object values are maps keyed by something other than properties
    pub fn is_map(self) -> bool {
        self.has(Self::INDEX | Self::LANGUAGE | Self::ID | Self::TYPE)
    }

    /// Validate a combination of container keywords
    pub fn is_valid(self, mode: ProcessingMode) -> bool {
        let bits = self.0 & !Self::SET;
        if mode == ProcessingMode::JsonLd10 {
            return matches!(
                self.0,
                Self::LIST | Self::SET | Self::INDEX | Self::LANGUAGE
            );
        }
        if self.has(Self::LIST) {
            return self.0 == Self::LIST;
        }
        if self.has(Self::GRAPH) {
            return bits == Self::GRAPH
                || bits == Self::GRAPH | Self::ID
                || bits == Self::GRAPH | Self::INDEX;
        }
        bits == 0
            || bits == Self::INDEX
            || bits == Self::LANGUAGE
            || bits == Self::ID
            || bits == Self::TYPE
    }
}

/// One term definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermDefinition {
    /// `None` maps the term to null (keys using it are dropped)
    pub iri: Option<String>,
    pub prefix: bool,
    pub protected: bool,
    pub reverse: bool,
    /// Base URL of the context the scoped context was defined in
    pub base_url: Option<String>,
    /// Scoped context, unprocessed
    pub context: Option<Value>,
    pub container: ContainerMapping,
    /// `Some(None)` is an explicit `"@direction": null`
    pub direction: Option<Option<Direction>>,
    /// Property IRI for property-valued indexes
    pub index: Option<String>,
    /// `Some(None)` is an explicit `"@language": null`
    pub language: Option<Option<String>>,
    pub nest: Option<String>,
    /// `@id`, `@vocab`, `@json`, `@none` or a datatype IRI
    pub type_mapping: Option<String>,
}

impl TermDefinition {
    /// Equality ignoring the protected flag, for protected redefinition checks
    pub fn same_definition(&self, other: &TermDefinition) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.protected = false;
        b.protected = false;
        a == b
    }

    pub fn is_keyword_alias(&self) -> bool {
        self.iri.as_deref().map_or(false, is_keyword)
    }
}

/// Active context
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub terms: FxHashMap<String, Arc<TermDefinition>>,
    pub base: Option<String>,
    /// Base IRI given by the parser options; `@context: null` resets to it
    pub original_base: Option<String>,
    pub vocab: Option<String>,
    pub language: Option<String>,
    pub direction: Option<Direction>,
    /// Context to revert to for nested node objects when this one does not propagate
    pub previous: Option<Arc<Context>>,
    pub processing_mode: ProcessingMode,
}

impl Context {
    pub fn new(base: Option<String>, processing_mode: ProcessingMode) -> Self {
        Self {
            base: base.clone(),
            original_base: base,
            processing_mode,
            ..Default::default()
        }
    }

    pub fn term(&self, term: &str) -> Option<&Arc<TermDefinition>> {
        self.terms.get(term)
    }

    pub fn has_protected_terms(&self) -> bool {
        self.terms.values().any(|d| d.protected)
    }

    /// Some term carries a scoped context
    pub fn has_scoped_terms(&self) -> bool {
        self.terms.values().any(|d| d.context.is_some())
    }

    /// The context nested node objects see
    pub fn for_node_objects(self: &Arc<Self>) -> Arc<Context> {
        match &self.previous {
            Some(previous) => previous.clone(),
            None => self.clone(),
        }
    }

    /// Resolve a value against `@base`; relative values stay relative when there is no base
    pub fn resolve_against_base(&self, value: &str) -> String {
        match &self.base {
            Some(base) => resolve_iri(base, value).unwrap_or_else(|| value.to_owned()),
            None => value.to_owned(),
        }
    }

    /// IRI expansion against this (fully processed) context.
    ///
    /// Returns `None` when the value maps to null or looks like a reserved keyword.
    pub fn expand_iri(&self, value: &str, document_relative: bool, vocab: bool) -> Option<String> {
        if is_keyword(value) {
            return Some(value.to_owned());
        }
        if looks_like_keyword(value) {
            return None;
        }
        if let Some(def) = self.terms.get(value) {
            if def.is_keyword_alias() {
                return def.iri.clone();
            }
            if vocab {
                return def.iri.clone();
            }
        }
        if let Some(colon) = value.find(':').filter(|&i| i > 0) {
            let (prefix, suffix) = (&value[..colon], &value[colon + 1..]);
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_owned());
            }
            if let Some(def) = self.terms.get(prefix) {
                let usable = def.prefix || self.processing_mode == ProcessingMode::JsonLd10;
                if let (Some(iri), true) = (&def.iri, usable) {
                    return Some(format!("{}{}", iri, suffix));
                }
            }
            if has_scheme(value) {
                return Some(value.to_owned());
            }
        }
        if vocab {
            if let Some(v) = &self.vocab {
                return Some(format!("{}{}", v, value));
            }
        }
        if document_relative && !is_blank_node_label(value) {
            return Some(self.resolve_against_base(value));
        }
        Some(value.to_owned())
    }
}
