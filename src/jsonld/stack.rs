//! Processing stack
//!
//! One [`Frame`] per open JSON object or array. Frames that accept keys keep
//! the [`Target`] of the value following the last key; arrays hand their
//! target to every element.

use std::sync::Arc;

use super::context::{ContainerMapping, Context, TermDefinition};
use super::iri::Keyword;
use super::pending::{GraphRef, NodeKey, Sink, TermRef};
use super::streaming::{CaptureBuilder, HeldEntry, HoldFrame};
use crate::rdf::{BlankNode, Term};

pub(crate) type ListId = u32;

/// What a value at some position means
#[derive(Debug, Clone)]
pub(crate) enum Target {
    /// Node objects without an incoming edge
    Free(Arc<FreeTarget>),
    /// Values of a property
    Property(Arc<PropertyTarget>),
    /// One item of a list
    ListItem(ListId, Arc<PropertyTarget>),
    /// Value of `@list`: an array of items or a single item
    ListBody(ListId, Arc<PropertyTarget>),
    /// Value of `@id` of the object at this stack index
    Id(usize),
    /// Value of `@nest` of the node at this stack index
    Nest(usize),
    /// Value of `@reverse` of the node at this stack index
    Reverse(usize),
    Annotation(Arc<AnnotationTarget>),
    Capture(Purpose),
    /// Value of an unmapped key of the object at this stack index, kept for a later context
    Hold(usize),
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FreeKind {
    /// The root object
    Document,
    /// Elements of a root array
    Root,
    /// Content of `@graph`
    Graph,
    Included,
}

#[derive(Debug)]
pub(crate) struct FreeTarget {
    pub value_ctx: Arc<Context>,
    pub node_ctx: Arc<Context>,
    pub graph: GraphRef,
    pub sink: Sink,
    pub kind: FreeKind,
}

/// Property-valued index entry: `<node> <property> <key>`
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub property: Term,
    pub value: Term,
}

#[derive(Debug, Clone)]
pub(crate) struct PropertyTarget {
    pub subject: TermRef,
    pub predicate: Term,
    pub reverse: bool,
    pub graph: GraphRef,
    pub sink: Sink,
    pub def: Option<Arc<TermDefinition>>,
    /// Context for values (property-scoped context applied)
    pub value_ctx: Arc<Context>,
    /// Context for node objects (non-propagated contexts reverted first)
    pub node_ctx: Arc<Context>,
    pub container: ContainerMapping,
    /// Set by language maps; `Some(None)` is `@none`
    pub language: Option<Option<String>>,
    pub index: Option<IndexEntry>,
    /// `@id` supplied by an id map key
    pub default_id: Option<Term>,
    /// Type supplied by a type map key, with the definition carrying its scoped context
    pub extra_type: Option<(Term, Option<Arc<TermDefinition>>)>,
    /// Wrap each value in a graph; `Some(None)` is a fresh blank graph
    pub graph_wrap: Option<Option<Term>>,
    /// 0 for a direct value, 1 inside a map, 2 inside an array inside a map
    pub depth: u8,
}

impl PropertyTarget {
    pub fn type_mapping(&self) -> Option<&str> {
        self.def.as_ref().and_then(|d| d.type_mapping.as_deref())
    }

    pub fn is_json(&self) -> bool {
        self.type_mapping() == Some("@json")
    }

    /// A direct value of a list-container property
    pub fn wraps_list(&self) -> bool {
        self.container.is_list() && self.depth == 0
    }

    /// A direct value whose container maps keys (language, index, id, type)
    pub fn is_map(&self) -> bool {
        self.container.is_map() && self.depth == 0
    }

    /// A plain `@graph` container wraps values in fresh graphs
    pub fn wraps_graph(&self) -> bool {
        self.graph_wrap.is_some()
            || (self.container.is_graph() && !self.container.is_map() && self.depth == 0)
    }

    pub fn in_embedded(&self) -> bool {
        matches!(self.sink, Sink::Embedded(_))
    }

    /// Copy for a value nested one level deeper in a container map
    pub fn nested(&self) -> PropertyTarget {
        let mut next = self.clone();
        next.depth = self.depth.saturating_add(1);
        next
    }
}

#[derive(Debug)]
pub(crate) struct AnnotationTarget {
    pub triple: TermRef,
    pub graph: GraphRef,
    pub sink: Sink,
    pub value_ctx: Arc<Context>,
    pub node_ctx: Arc<Context>,
}

/// Why a value is being captured whole
#[derive(Debug, Clone)]
pub(crate) enum Purpose {
    /// A keyword entry of the object at this stack index
    Entry { owner: usize, keyword: Keyword },
    /// A value of a `@json` typed property
    Json(Box<Target>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    Undetermined,
    Node,
    Value,
    List,
    Set,
}

/// A JSON object interpreted as a node, value, list or set object
#[derive(Debug)]
pub(crate) struct ObjectFrame {
    pub slot: NodeKey,
    /// `Slot(slot)` until the subject is known
    pub subject: TermRef,
    pub target: Target,
    pub kind: ObjectKind,
    /// Context for value-object keywords
    pub value_ctx: Arc<Context>,
    /// Context `@type` values are expanded with
    pub type_ctx: Arc<Context>,
    /// Context for properties (type-scoped contexts applied)
    pub ctx: Arc<Context>,
    pub graph: GraphRef,
    pub sink: Sink,
    pub pending: Option<Target>,
    /// Keyword bits seen so far
    pub seen: u32,
    pub has_properties: bool,
    /// An entry was dropped for lack of a mapping
    pub unmapped: bool,
    /// `@type` values not yet turned into quads
    pub types: Vec<String>,
    pub type_scoped: bool,
    pub value: Option<serde_json::Value>,
    pub language: Option<serde_json::Value>,
    pub direction: Option<serde_json::Value>,
    pub id_set: bool,
    /// Invalid `@id`: the remaining entries are ignored
    pub dropped: bool,
    /// Root `@graph` went to the default graph
    pub graph_default: bool,
    pub list: Option<ListId>,
    /// Under a list container: wrap in a one-item list unless this is a list object
    pub list_wrap: bool,
    /// Collector of an embedded node
    pub collector: Option<u32>,
    /// Unmapped entries a later `@context` or type-scoped `@type` may still define
    pub held: Vec<HeldEntry>,
}

impl ObjectFrame {
    pub fn has_seen(&self, keyword: Keyword) -> bool {
        self.seen & keyword.bit() != 0
    }

    pub fn mark(&mut self, keyword: Keyword) {
        self.seen |= keyword.bit();
    }

    /// Any entry other than `@context` so far
    pub fn has_entries(&self) -> bool {
        self.has_properties || self.seen & !Keyword::Context.bit() != 0
    }

    pub fn property_target(&self) -> Option<&Arc<PropertyTarget>> {
        match &self.target {
            Target::Property(pt) | Target::ListItem(_, pt) => Some(pt),
            _ => None,
        }
    }

    pub fn is_top_document(&self) -> bool {
        matches!(&self.target, Target::Free(ft) if ft.kind == FreeKind::Document)
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self.target, Target::Annotation(_))
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.sink, Sink::Embedded(_))
    }

    /// Reference to what this object stands for in its parent
    pub fn self_ref(&self) -> TermRef {
        match (&self.subject, self.kind) {
            (TermRef::Slot(_), _) => TermRef::Slot(self.slot),
            (_, ObjectKind::Node) => self.subject.clone(),
            _ => TermRef::Slot(self.slot),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ArrayFrame {
    pub target: Target,
    /// List finished when the array closes
    pub close_list: Option<ListId>,
    /// Outer list receiving this list's head
    pub append_to: Option<ListId>,
}

/// Object of a container map; keys are languages, indexes, ids or types
#[derive(Debug)]
pub(crate) struct MapFrame {
    pub property: Arc<PropertyTarget>,
    pub pending: Option<Target>,
}

/// `@nest` or `@reverse` object of the node at `owner`
#[derive(Debug)]
pub(crate) struct NestedFrame {
    pub owner: usize,
    pub pending: Option<Target>,
}

#[derive(Debug)]
pub(crate) enum Frame {
    Object(ObjectFrame),
    Array(ArrayFrame),
    Map(MapFrame),
    Nest(NestedFrame),
    Reverse(NestedFrame),
    Capture(Purpose, CaptureBuilder),
    Hold(HoldFrame),
    /// Depth inside an ignored value
    Skip(usize),
}

impl Frame {
    /// Target of the value after the last key
    pub fn pending(&self) -> Option<&Target> {
        match self {
            Frame::Object(f) => f.pending.as_ref(),
            Frame::Map(f) => f.pending.as_ref(),
            Frame::Nest(f) | Frame::Reverse(f) => f.pending.as_ref(),
            _ => None,
        }
    }

    pub fn set_pending(&mut self, target: Target) {
        match self {
            Frame::Object(f) => f.pending = Some(target),
            Frame::Map(f) => f.pending = Some(target),
            Frame::Nest(f) | Frame::Reverse(f) => f.pending = Some(target),
            _ => {}
        }
    }
}

/// A list under construction
#[derive(Debug)]
pub(crate) struct ListState {
    /// Settles to the first cell, or `rdf:nil`
    pub slot: NodeKey,
    pub head: Option<BlankNode>,
    pub last: Option<BlankNode>,
    pub graph: GraphRef,
    pub sink: Sink,
}
