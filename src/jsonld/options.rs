//! Parser configuration

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-LD processing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    #[serde(rename = "json-ld-1.0", alias = "1.0")]
    JsonLd10,
    #[default]
    #[serde(rename = "json-ld-1.1", alias = "1.1")]
    JsonLd11,
}

/// How `@direction` is represented in RDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdfDirection {
    /// `https://www.w3.org/ns/i18n#<lang>_<dir>` datatypes
    I18nDatatype,
    /// A blank node carrying `rdf:value`, `rdf:language` and `rdf:direction`
    CompoundLiteral,
}

/// Options recognised by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Base IRI for resolving relative `@id` values
    pub base_iri: Option<String>,
    /// Context applied before the document's own contexts (object, URL or array)
    pub initial_context: Option<Value>,
    /// Graph receiving default-graph quads (an IRI); `None` is the unnamed default graph
    pub default_graph: Option<String>,
    /// `Some(true)`: reject key orders that need lookahead.
    /// `Some(false)` and `None`: accept any order; unmapped entries wait for a
    /// later `@context` or type-scoped `@type` of their object.
    pub streaming_profile: Option<bool>,
    /// Accept `@type` after properties when no type-scoped context is involved
    pub streaming_profile_allow_out_of_order_plain_type: bool,
    /// Keep blank-node predicates
    pub produce_generalized_rdf: bool,
    /// `None` drops `@direction`
    pub rdf_direction: Option<RdfDirection>,
    /// Lower-case language tags
    pub normalize_language_tags: bool,
    pub processing_mode: ProcessingMode,
    /// Turn silently dropped invalid values into errors
    pub strict_values: bool,
    /// Accept `@list` values of reverse properties
    pub allow_subject_list: bool,
    /// Enable embedded nodes and `@annotation`
    pub rdfstar: bool,
    /// Allow `@reverse` inside embedded nodes
    pub rdfstar_reverse_in_embedded: bool,
    /// Prefix for generated blank node labels; a random one is picked per parse when unset
    pub blank_node_prefix: Option<String>,
    /// Capacity of the quad channel of the async parser
    pub channel_capacity: usize,
    /// Maximum depth of nested remote context loads
    pub max_context_recursion: usize,
    /// Number of remote contexts kept per parse
    pub remote_context_cache_size: usize,
    /// Accept plain JSON responses without a context `Link` header
    pub ignore_missing_context_link_header: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            base_iri: None,
            initial_context: None,
            default_graph: None,
            streaming_profile: None,
            streaming_profile_allow_out_of_order_plain_type: false,
            produce_generalized_rdf: false,
            rdf_direction: None,
            normalize_language_tags: false,
            processing_mode: ProcessingMode::JsonLd11,
            strict_values: false,
            allow_subject_list: false,
            rdfstar: true,
            rdfstar_reverse_in_embedded: false,
            blank_node_prefix: None,
            channel_capacity: 256,
            max_context_recursion: 8,
            remote_context_cache_size: 64,
            ignore_missing_context_link_header: false,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    pub fn with_initial_context(mut self, context: Value) -> Self {
        self.initial_context = Some(context);
        self
    }

    pub fn with_default_graph(mut self, graph: impl Into<String>) -> Self {
        self.default_graph = Some(graph.into());
        self
    }

    pub fn with_streaming_profile(mut self, streaming: bool) -> Self {
        self.streaming_profile = Some(streaming);
        self
    }

    pub fn with_out_of_order_plain_type(mut self, allow: bool) -> Self {
        self.streaming_profile_allow_out_of_order_plain_type = allow;
        self
    }

    pub fn with_generalized_rdf(mut self, enabled: bool) -> Self {
        self.produce_generalized_rdf = enabled;
        self
    }

    pub fn with_rdf_direction(mut self, direction: RdfDirection) -> Self {
        self.rdf_direction = Some(direction);
        self
    }

    pub fn with_normalized_language_tags(mut self, enabled: bool) -> Self {
        self.normalize_language_tags = enabled;
        self
    }

    pub fn with_processing_mode(mut self, mode: ProcessingMode) -> Self {
        self.processing_mode = mode;
        self
    }

    pub fn with_strict_values(mut self, strict: bool) -> Self {
        self.strict_values = strict;
        self
    }

    pub fn with_subject_lists(mut self, allow: bool) -> Self {
        self.allow_subject_list = allow;
        self
    }

    pub fn with_rdfstar(mut self, enabled: bool) -> Self {
        self.rdfstar = enabled;
        self
    }

    pub fn with_rdfstar_reverse_in_embedded(mut self, enabled: bool) -> Self {
        self.rdfstar_reverse_in_embedded = enabled;
        self
    }

    pub fn with_blank_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blank_node_prefix = Some(prefix.into());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Whether out-of-order keys are rejected instead of tolerated
    pub fn is_strict_streaming(&self) -> bool {
        self.streaming_profile == Some(true)
    }

    pub(crate) fn is_1_0(&self) -> bool {
        self.processing_mode == ProcessingMode::JsonLd10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert!(options.rdfstar);
        assert_eq!(options.processing_mode, ProcessingMode::JsonLd11);
        assert_eq!(options.max_context_recursion, 8);
        assert!(!options.is_strict_streaming());
    }

    #[test]
    fn test_builder() {
        let options = ParserOptions::new()
            .with_base_iri("http://example.org/")
            .with_streaming_profile(true)
            .with_rdf_direction(RdfDirection::CompoundLiteral)
            .with_initial_context(json!({"@vocab": "http://schema.org/"}));
        assert!(options.is_strict_streaming());
        assert_eq!(options.base_iri.as_deref(), Some("http://example.org/"));
        assert_eq!(options.rdf_direction, Some(RdfDirection::CompoundLiteral));
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r#"
base_iri: "http://example.org/doc"
streaming_profile: true
rdf_direction: i18n-datatype
processing_mode: "1.0"
"#;
        let options: ParserOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.base_iri.as_deref(), Some("http://example.org/doc"));
        assert_eq!(options.streaming_profile, Some(true));
        assert_eq!(options.rdf_direction, Some(RdfDirection::I18nDatatype));
        assert_eq!(options.processing_mode, ProcessingMode::JsonLd10);
        // unspecified fields keep their defaults
        assert_eq!(options.channel_capacity, 256);
    }
}
