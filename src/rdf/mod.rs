//! RDF data model produced by the JSON-LD expander
//!
//! This module provides the term and quad types emitted by the parser:
//! - IRIs, blank nodes and literals (thin wrappers over `oxrdf`)
//! - Embedded triples in subject/object position (RDF-star)
//! - Blank-node predicates (generalized RDF)
//! - N-Quads rendering through `Display`
//!
//! # Example
//!
//! ```rust
//! use streamld::rdf::{GraphName, Literal, NamedNode, Quad};
//!
//! let quad = Quad::new(
//!     NamedNode::new("http://example.org/alice").unwrap(),
//!     NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
//!     Literal::new_simple_literal("Alice"),
//!     GraphName::DefaultGraph,
//! );
//! assert_eq!(
//!     quad.to_string(),
//!     "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" ."
//! );
//! ```

mod types;
pub mod vocab;

pub use types::{
    BlankNode, GraphName, Literal, NamedNode, Quad, RdfError, RdfResult, Term, Triple,
};
