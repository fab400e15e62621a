//! streamld
//!
//! Incremental JSON-LD 1.1 to RDF conversion. Documents are expanded as they
//! are read: quads leave the parser as soon as their subject, predicate,
//! object and graph are known, without building the expanded document in
//! memory.
//!
//! # Features
//!
//! - Streaming JSON tokenizer fed in arbitrary byte chunks
//! - Full context processing (scoped, protected, propagated, remote and
//!   imported contexts) with an LRU cache of remote documents
//! - The JSON-LD streaming profile: strict key order, or tolerant
//!   processing that holds unmapped entries until a late `@context` arrives
//! - Lists, containers (`@index`, `@language`, `@id`, `@type`, `@graph`),
//!   reverse properties, `@nest` and `@included`
//! - JSON literals, `rdf:direction` handling and generalized RDF
//! - RDF-star embedded nodes and `@annotation`
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use streamld::jsonld::{JsonLdStreamParser, ParserOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let file = tokio::fs::File::open("data.jsonld").await.unwrap();
//!     let parser = JsonLdStreamParser::new(ParserOptions::default());
//!     let mut quads = parser.parse(file);
//!     while let Some(quad) = quads.next().await {
//!         println!("{}", quad.unwrap());
//!     }
//! }
//! ```

pub mod jsonld;
pub mod rdf;

pub use jsonld::{
    quads_from_slice, quads_from_str, Expander, JsonLdError, JsonLdErrorCode, JsonLdResult,
    JsonLdStreamParser, ParserOptions, QuadStream,
};
pub use rdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Term, Triple};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
