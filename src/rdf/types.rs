//! RDF type definitions
//!
//! Wrapper types around the oxrdf primitives, extended with the two things
//! JSON-LD needs beyond plain RDF 1.1: embedded triples (RDF-star) in
//! subject/object position and blank nodes in predicate position
//! (generalized RDF).

use oxrdf::{BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode};
use std::fmt;
use thiserror::Error;

use super::vocab::xsd;

/// RDF errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node, validating the IRI
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Create a named node from an IRI known to be valid (vocabulary constants)
    pub(crate) fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(OxNamedNode::new_unchecked(iri))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a blank node from an identifier, validating it
    pub fn new(id: impl Into<String>) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Create a blank node from an identifier known to be valid
    pub(crate) fn new_unchecked(id: impl Into<String>) -> Self {
        Self(OxBlankNode::new_unchecked(id))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf BlankNode
    pub fn inner(&self) -> &OxBlankNode {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (xsd:string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with a language tag, validating the tag.
    ///
    /// The tag keeps the case it was written with.
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        let value = value.into();
        let language = language.into();
        // oxrdf lowercases while validating
        OxLiteral::new_language_tagged_literal(value.as_str(), language.as_str())
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))?;
        Ok(Self(OxLiteral::new_language_tagged_literal_unchecked(value, language)))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype IRI
    pub fn datatype(&self) -> &str {
        self.0.datatype().as_str()
    }

    /// Whether this is a plain xsd:string literal
    pub fn is_plain(&self) -> bool {
        self.language().is_none() && self.datatype() == xsd::STRING
    }

    /// Get the inner oxrdf Literal
    pub fn inner(&self) -> &OxLiteral {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// Any RDF term, including an embedded triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal
    Literal(Literal),
    /// Embedded triple (RDF-star)
    Triple(Box<Triple>),
}

impl Term {
    /// Whether the term may appear in subject position
    pub fn is_resource(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn as_named_node(&self) -> Option<&NamedNode> {
        match self {
            Term::NamedNode(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => n.fmt(f),
            Term::BlankNode(b) => b.fmt(f),
            Term::Literal(l) => l.fmt(f),
            Term::Triple(t) => write!(f, "<< {} {} {} >>", t.subject, t.predicate, t.object),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Triple> for Term {
    fn from(triple: Triple) -> Self {
        Term::Triple(Box::new(triple))
    }
}

/// RDF triple; the predicate is a full term so generalized RDF can be carried
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Term>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Place the triple in a graph
    pub fn in_graph(self, graph_name: GraphName) -> Quad {
        Quad {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            graph_name,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Graph a quad belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GraphName {
    #[default]
    DefaultGraph,
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl GraphName {
    pub fn is_default_graph(&self) -> bool {
        matches!(self, GraphName::DefaultGraph)
    }

    /// Graph named by a term; literals and triples cannot name graphs
    pub fn from_term(term: Term) -> Option<Self> {
        match term {
            Term::NamedNode(n) => Some(GraphName::NamedNode(n)),
            Term::BlankNode(b) => Some(GraphName::BlankNode(b)),
            _ => None,
        }
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphName::DefaultGraph => Ok(()),
            GraphName::NamedNode(n) => n.fmt(f),
            GraphName::BlankNode(b) => b.fmt(f),
        }
    }
}

/// RDF quad (triple + graph)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph_name: GraphName,
}

impl Quad {
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        graph_name: GraphName,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph_name,
        }
    }

    /// The quad without its graph
    pub fn triple(&self) -> Triple {
        Triple {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
        }
    }
}

/// N-Quads (N-Quads-star for embedded triples) line, without the newline
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.graph_name.is_default_graph() {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        } else {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, self.graph_name
            )
        }
    }
}
