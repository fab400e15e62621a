//! Streaming JSON-LD to RDF
//!
//! The [`Expander`] is a push engine: JSON events go in, quads come out as
//! soon as every term they mention is known. It never performs I/O itself;
//! when a remote context is needed it reports the URL through
//! [`Expander::blocked_on`] and waits for [`Expander::provide_context`].
//!
//! [`JsonLdStreamParser`] wraps the engine with an async reader, a document
//! loader and a bounded quad channel. The `quads_from_*` functions run it
//! synchronously over a complete document.
//!
//! # Example
//!
//! ```rust
//! use streamld::jsonld::{quads_from_str, ParserOptions};
//!
//! let quads = quads_from_str(
//!     r#"{"@context": {"@vocab": "http://schema.org/"}, "@id": "http://example.org/a", "name": "A"}"#,
//!     ParserOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(quads.len(), 1);
//! ```

mod blank;
mod containers;
mod context;
mod context_processor;
mod error;
mod expander;
mod handlers;
mod http;
mod iri;
mod loader;
mod options;
mod parser;
mod pending;
mod stack;
mod star;
mod streaming;
mod tokenizer;
mod values;

pub use error::{JsonLdError, JsonLdErrorCode, JsonLdResult, TextPosition};
pub use expander::Expander;
pub use http::{open_url, options_from_response};
pub use loader::{DocumentLoader, HttpLoader, LoaderError, RemoteDocument, StaticDocumentLoader};
pub use options::{ParserOptions, ProcessingMode, RdfDirection};
pub use parser::{
    quads_from_slice, quads_from_slice_with_loader, quads_from_str, quads_from_str_with_loader,
    JsonLdStreamParser, QuadStream,
};
pub use tokenizer::{tokenize_all, JsonEvent, JsonTokenizer, Scalar};
