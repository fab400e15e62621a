//! Sans-IO expansion engine
//!
//! [`Expander`] consumes tokenizer events and produces quads. It never
//! blocks: when a remote context is needed it records the step it could not
//! finish, reports the URL through [`Expander::blocked_on`] and queues every
//! later event until [`Expander::provide_context`] delivers the document.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::blank::BlankNodeAllocator;
use super::context::Context;
use super::context_processor::ContextProcessor;
use super::error::{fail, Interrupt, JsonLdError, JsonLdErrorCode as Code, JsonLdResult, Step, TextPosition};
use super::iri::{is_absolute_iri, Keyword};
use super::loader::{LoaderError, RemoteDocument};
use super::options::ParserOptions;
use super::pending::{GraphRef, NodeKey, NodeTable, PendingQuad, Sink, TermRef};
use super::stack::{
    ArrayFrame, FreeKind, FreeTarget, Frame, ListId, ListState, ObjectFrame, ObjectKind, Purpose,
    Target,
};
use super::streaming::HeldEntry;
use super::tokenizer::JsonEvent;
use crate::rdf::vocab::rdf;
use crate::rdf::{BlankNode, NamedNode, Quad, Term, Triple};

/// The step to run again once a remote document is available
#[derive(Debug)]
enum Retry {
    Initial,
    Event(JsonEvent),
    Deliver(Purpose, Value),
}

#[derive(Debug)]
struct Blocked {
    url: String,
    retry: Retry,
}

/// Incremental JSON-LD to RDF engine
pub struct Expander {
    pub(super) options: ParserOptions,
    pub(super) processor: ContextProcessor,
    pub(super) root_ctx: Arc<Context>,
    pub(super) default_graph: GraphRef,
    pub(super) stack: Vec<Frame>,
    pub(super) nodes: NodeTable,
    pub(super) lists: FxHashMap<ListId, ListState>,
    next_list: ListId,
    pub(super) collectors: FxHashMap<u32, Vec<Triple>>,
    next_collector: u32,
    pub(super) blank: BlankNodeAllocator,
    output: VecDeque<Quad>,
    blocked: Option<Blocked>,
    /// Events not processed yet; held entries are fed again at the front
    deferred: VecDeque<(JsonEvent, Option<TextPosition>)>,
    position: Option<TextPosition>,
    failed: Option<JsonLdError>,
    finished: bool,
}

pub(super) fn vocab_term(iri: &'static str) -> Term {
    Term::NamedNode(NamedNode::new_unchecked(iri))
}

impl Expander {
    pub fn new(options: ParserOptions) -> JsonLdResult<Self> {
        if let Some(base) = &options.base_iri {
            if !is_absolute_iri(base) {
                return Err(JsonLdError::new(
                    Code::InvalidBaseIri,
                    format!("base IRI '{}' is not absolute", base),
                ));
            }
        }
        let default_graph = match &options.default_graph {
            Some(iri) => {
                let node = NamedNode::new(iri.as_str()).map_err(|e| {
                    JsonLdError::new(Code::InvalidBaseIri, format!("invalid default graph: {}", e))
                })?;
                Some(TermRef::Ready(node.into()))
            }
            None => None,
        };
        let root_ctx = Arc::new(Context::new(options.base_iri.clone(), options.processing_mode));
        let mut expander = Self {
            processor: ContextProcessor::new(&options),
            blank: BlankNodeAllocator::new(options.blank_node_prefix.as_deref()),
            options,
            root_ctx,
            default_graph,
            stack: Vec::new(),
            nodes: NodeTable::new(),
            lists: FxHashMap::default(),
            next_list: 0,
            collectors: FxHashMap::default(),
            next_collector: 0,
            output: VecDeque::new(),
            blocked: None,
            deferred: VecDeque::new(),
            position: None,
            failed: None,
            finished: false,
        };
        match expander.apply_initial_context() {
            Ok(()) => {}
            Err(Interrupt::Suspend(url)) => expander.block(url, Retry::Initial),
            Err(Interrupt::Fail(e)) => return Err(e),
        }
        Ok(expander)
    }

    fn apply_initial_context(&mut self) -> Step<()> {
        let Some(local) = self.options.initial_context.clone() else {
            return Ok(());
        };
        let base = self.options.base_iri.clone();
        self.root_ctx = self
            .processor
            .process(&self.root_ctx, &local, base.as_deref(), false, true)?;
        Ok(())
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn feed(&mut self, event: JsonEvent) -> JsonLdResult<()> {
        self.feed_at(event, None)
    }

    /// Feed an event with its source position, used in error messages
    pub fn feed_at(&mut self, event: JsonEvent, position: Option<TextPosition>) -> JsonLdResult<()> {
        self.check()?;
        self.deferred.push_back((event, position));
        self.pump();
        self.check()
    }

    /// Signal the end of input
    pub fn finish(&mut self) -> JsonLdResult<()> {
        self.check()?;
        self.finished = true;
        self.pump();
        self.check()
    }

    /// URL of the remote document processing waits for
    pub fn blocked_on(&self) -> Option<&str> {
        self.blocked.as_ref().map(|b| b.url.as_str())
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.processor.is_cached(url)
    }

    /// Events queued behind a suspension
    pub fn backlog(&self) -> usize {
        self.deferred.len()
    }

    /// All input processed and nothing left to wait for
    pub fn is_done(&self) -> bool {
        self.failed.is_some() || (self.finished && self.blocked.is_none() && self.deferred.is_empty())
    }

    pub fn error(&self) -> Option<&JsonLdError> {
        self.failed.as_ref()
    }

    /// Quads produced so far
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, Quad> {
        self.output.drain(..)
    }

    /// Hand over a remote document (or the failure to load it).
    ///
    /// Documents nobody waits for yet are cached for later; a failure only
    /// matters for the URL processing is blocked on.
    pub fn provide_context(
        &mut self,
        url: &str,
        result: Result<RemoteDocument, LoaderError>,
    ) -> JsonLdResult<()> {
        self.check()?;
        let waiting = self.blocked_on() == Some(url);
        match result {
            Ok(document) => {
                debug!(url, "remote context received");
                self.processor.insert_document(url, document);
                if waiting {
                    self.resume();
                }
            }
            Err(e) if waiting => {
                self.fail(JsonLdError::new(
                    Code::LoadingRemoteContextFailed,
                    format!("{}: {}", url, e),
                ));
            }
            Err(e) => debug!(url, error = %e, "ignoring failed prefetch"),
        }
        self.check()
    }

    fn check(&self) -> JsonLdResult<()> {
        match &self.failed {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: JsonLdError) {
        if self.failed.is_none() {
            self.failed = Some(error.at(self.position));
        }
    }

    fn block(&mut self, url: String, retry: Retry) {
        trace!(url = url.as_str(), "suspended on remote context");
        self.blocked = Some(Blocked { url, retry });
    }

    fn resume(&mut self) {
        let Some(blocked) = self.blocked.take() else {
            return;
        };
        trace!(url = blocked.url.as_str(), "resuming");
        let result = match blocked.retry {
            Retry::Initial => self.apply_initial_context().map_err(|i| (i, Retry::Initial)),
            Retry::Event(event) => self.step(&event).map_err(|i| (i, Retry::Event(event))),
            Retry::Deliver(purpose, value) => match self.deliver(&purpose, &value) {
                Ok(()) => Ok(()),
                Err(i) => Err((i, Retry::Deliver(purpose, value))),
            },
        };
        match result {
            Ok(()) => self.processor.unpin(),
            Err((Interrupt::Suspend(url), retry)) => self.block(url, retry),
            Err((Interrupt::Fail(e), _)) => self.fail(e),
        }
        self.pump();
    }

    fn pump(&mut self) {
        while self.failed.is_none() && self.blocked.is_none() {
            let Some((event, position)) = self.deferred.pop_front() else {
                break;
            };
            self.position = position;
            match self.step(&event) {
                Ok(()) => {}
                Err(Interrupt::Suspend(url)) => self.block(url, Retry::Event(event)),
                Err(Interrupt::Fail(e)) => self.fail(e),
            }
        }
        if self.failed.is_none()
            && self.blocked.is_none()
            && self.finished
            && self.deferred.is_empty()
            && !self.stack.is_empty()
        {
            self.fail(JsonLdError::new(Code::UnclosedDocument, "input ended inside a value"));
        }
    }

    /// Process one event
    fn step(&mut self, event: &JsonEvent) -> Step<()> {
        match self.stack.last_mut() {
            Some(Frame::Skip(depth)) => {
                match event {
                    JsonEvent::StartObject | JsonEvent::StartArray => *depth += 1,
                    JsonEvent::EndObject | JsonEvent::EndArray => {
                        *depth -= 1;
                        if *depth == 0 {
                            self.stack.pop();
                        }
                    }
                    _ => {}
                }
                return Ok(());
            }
            Some(Frame::Capture(_, builder)) => {
                let Some(value) = builder.push(event.clone()) else {
                    return Ok(());
                };
                let Some(Frame::Capture(purpose, _)) = self.stack.pop() else {
                    return Ok(());
                };
                return self.deliver_captured(purpose, value);
            }
            Some(Frame::Hold(hold)) => {
                match event {
                    JsonEvent::StartObject | JsonEvent::StartArray => hold.depth += 1,
                    JsonEvent::EndObject | JsonEvent::EndArray => hold.depth -= 1,
                    _ => {}
                }
                let (owner, done) = (hold.owner, hold.depth == 0);
                if done {
                    self.stack.pop();
                }
                self.hold_event(owner, event.clone());
                return Ok(());
            }
            _ => {}
        }
        match event {
            JsonEvent::Key(key) => self.on_key(key),
            JsonEvent::EndObject => self.on_end_object(),
            JsonEvent::EndArray => self.on_end_array(),
            JsonEvent::StartObject => {
                let target = self.current_target()?;
                self.push_object(target)
            }
            JsonEvent::StartArray => {
                let target = self.current_target()?;
                self.push_array(target)
            }
            JsonEvent::Value(scalar) => {
                let target = self.current_target()?;
                self.on_scalar(target, scalar.clone())
            }
        }
    }

    /// Target of the value starting now
    fn current_target(&self) -> Step<Target> {
        match self.stack.last() {
            None => Ok(Target::Free(Arc::new(FreeTarget {
                value_ctx: self.root_ctx.clone(),
                node_ctx: self.root_ctx.clone(),
                graph: self.default_graph.clone(),
                sink: Sink::Output,
                kind: FreeKind::Document,
            }))),
            Some(Frame::Array(array)) => Ok(array.target.clone()),
            Some(frame) => match frame.pending() {
                Some(target) => Ok(target.clone()),
                None => fail(Code::SyntaxError, "value without a key"),
            },
        }
    }

    /// A captured value is complete
    pub(super) fn deliver_captured(&mut self, purpose: Purpose, value: Value) -> Step<()> {
        match self.deliver(&purpose, &value) {
            Err(Interrupt::Suspend(url)) => {
                self.block(url, Retry::Deliver(purpose, value));
                Ok(())
            }
            other => other,
        }
    }

    fn deliver(&mut self, purpose: &Purpose, value: &Value) -> Step<()> {
        match purpose {
            Purpose::Entry { owner, keyword } => self.deliver_entry(*owner, *keyword, value),
            Purpose::Json(target) => self.deliver_json((**target).clone(), value),
        }
    }

    fn on_end_object(&mut self) -> Step<()> {
        match self.stack.last() {
            Some(Frame::Object(_)) => self.close_object(),
            Some(Frame::Map(_)) | Some(Frame::Nest(_)) | Some(Frame::Reverse(_)) => {
                self.stack.pop();
                Ok(())
            }
            _ => fail(Code::SyntaxError, "unbalanced '}'"),
        }
    }

    fn on_end_array(&mut self) -> Step<()> {
        let Some(Frame::Array(array)) = self.stack.pop() else {
            return fail(Code::SyntaxError, "unbalanced ']'");
        };
        if let Some(list) = array.close_list {
            let head = self.finish_list(list);
            if let Some(outer) = array.append_to {
                self.list_append(outer, head);
            }
        }
        Ok(())
    }

    fn close_object(&mut self) -> Step<()> {
        let idx = self.stack.len() - 1;
        let held = std::mem::take(&mut self.object_mut(idx)?.held);
        for entry in &held {
            self.drop_key(&entry.key)?;
        }
        let (kind, only_language, graph_default, id_set) = {
            let frame = self.object(idx)?;
            (
                frame.kind,
                frame.seen == Keyword::Language.bit() && !frame.has_properties,
                frame.graph_default,
                frame.id_set,
            )
        };

        // what the object stands for, and whether its slot still needs settling
        let annotation = self.object(idx)?.is_annotation();
        let (term, settle) = match kind {
            _ if annotation => (None, false),
            ObjectKind::Value => (self.value_object_term(idx)?, true),
            ObjectKind::List => match self.object(idx)?.list {
                Some(list) => (Some(self.finish_list(list)), false),
                None => (None, true),
            },
            ObjectKind::Set => (None, true),
            ObjectKind::Undetermined if only_language => (None, true),
            ObjectKind::Undetermined | ObjectKind::Node => {
                self.become_node(idx)?;
                if graph_default && !id_set {
                    (None, true)
                } else if id_set {
                    let frame = self.object(idx)?;
                    (self.nodes.resolved(frame.slot).cloned(), false)
                } else {
                    (Some(self.anonymous_subject(idx)?), true)
                }
            }
        };

        let Some(Frame::Object(frame)) = self.stack.pop() else {
            return Ok(());
        };
        if settle {
            self.settle(frame.slot, term.clone());
        }

        match &frame.target {
            Target::ListItem(list, _) | Target::ListBody(list, _) => {
                if let Some(term) = term {
                    self.list_append(*list, term);
                }
            }
            Target::Id(owner) => {
                let owner = *owner;
                self.close_embedded(owner, &frame)?;
            }
            Target::Property(pt) if frame.list_wrap => {
                if let Some(term) = term {
                    let pt = pt.clone();
                    self.single_item_list(&pt, term);
                }
            }
            _ => {}
        }
        self.nodes.release(frame.slot);
        Ok(())
    }

    /// Subject of a node object without `@id`
    fn anonymous_subject(&mut self, idx: usize) -> Step<Term> {
        let default_id = self
            .object(idx)?
            .property_target()
            .and_then(|pt| pt.default_id.clone());
        Ok(match default_id {
            Some(id) => id,
            None => self.blank.fresh().into(),
        })
    }

    pub(super) fn object(&self, idx: usize) -> Step<&ObjectFrame> {
        match self.stack.get(idx) {
            Some(Frame::Object(frame)) => Ok(frame),
            _ => fail(Code::SyntaxError, "expected an object frame"),
        }
    }

    pub(super) fn object_mut(&mut self, idx: usize) -> Step<&mut ObjectFrame> {
        match self.stack.get_mut(idx) {
            Some(Frame::Object(frame)) => Ok(frame),
            _ => fail(Code::SyntaxError, "expected an object frame"),
        }
    }

    /// Remember the target of the value after the current key
    pub(super) fn set_pending(&mut self, at: usize, target: Target) {
        if let Some(frame) = self.stack.get_mut(at) {
            frame.set_pending(target);
        }
    }

    pub(super) fn emit(&mut self, subject: TermRef, predicate: Term, object: TermRef, graph: GraphRef, sink: Sink) {
        let quad = PendingQuad {
            subject,
            predicate,
            object,
            graph,
            sink,
        };
        if let Some(ready) = self.nodes.register(quad) {
            self.route(ready);
        }
    }

    pub(super) fn settle(&mut self, key: NodeKey, value: Option<Term>) {
        for ready in self.nodes.settle(key, value) {
            self.route(ready);
        }
    }

    fn route(&mut self, (sink, quad): (Sink, Quad)) {
        match sink {
            Sink::Output => {
                trace!(quad = %quad, "emit");
                self.output.push_back(quad);
            }
            Sink::Embedded(id) => self.collectors.entry(id).or_default().push(quad.triple()),
        }
    }

    pub(super) fn open_collector(&mut self) -> u32 {
        let id = self.next_collector;
        self.next_collector += 1;
        self.collectors.insert(id, Vec::new());
        id
    }

    pub(super) fn open_list(&mut self, slot: NodeKey, graph: GraphRef, sink: Sink) -> ListId {
        let id = self.next_list;
        self.next_list += 1;
        self.lists.insert(
            id,
            ListState {
                slot,
                head: None,
                last: None,
                graph,
                sink,
            },
        );
        id
    }

    /// Add an item; the first one settles the list's slot to its first cell
    pub(super) fn list_append(&mut self, list: ListId, item: Term) {
        let cell = self.blank.fresh();
        let Some(state) = self.lists.get_mut(&list) else {
            return;
        };
        let previous = state.last.replace(cell.clone());
        if state.head.is_none() {
            state.head = Some(cell.clone());
        }
        let (slot, graph, sink) = (state.slot, state.graph.clone(), state.sink);
        match previous {
            None => self.settle(slot, Some(cell.clone().into())),
            Some(prev) => self.emit(
                TermRef::Ready(prev.into()),
                vocab_term(rdf::REST),
                TermRef::Ready(cell.clone().into()),
                graph.clone(),
                sink,
            ),
        }
        self.emit(
            TermRef::Ready(cell.into()),
            vocab_term(rdf::FIRST),
            TermRef::Ready(item),
            graph,
            sink,
        );
    }

    /// Terminate a list; returns its head (`rdf:nil` when empty)
    pub(super) fn finish_list(&mut self, list: ListId) -> Term {
        let nil = vocab_term(rdf::NIL);
        let Some(state) = self.lists.remove(&list) else {
            return nil;
        };
        match (state.head, state.last) {
            (Some(head), Some(last)) => {
                self.emit(
                    TermRef::Ready(last.into()),
                    vocab_term(rdf::REST),
                    TermRef::Ready(nil),
                    state.graph,
                    state.sink,
                );
                self.nodes.release(state.slot);
                head.into()
            }
            _ => {
                self.settle(state.slot, Some(nil.clone()));
                self.nodes.release(state.slot);
                nil
            }
        }
    }

    /// Start holding the entry `key` of the object at `owner`
    pub(super) fn hold_entry(&mut self, owner: usize, key: &str) -> Step<()> {
        let position = self.position;
        trace!(key, "holding entry for a later context");
        self.object_mut(owner)?.held.push(HeldEntry::new(key, position));
        self.set_pending(owner, Target::Hold(owner));
        Ok(())
    }

    /// Add an event to the value of the last held entry of `owner`
    pub(super) fn hold_event(&mut self, owner: usize, event: JsonEvent) {
        let position = self.position;
        if let Some(Frame::Object(frame)) = self.stack.get_mut(owner) {
            if let Some(entry) = frame.held.last_mut() {
                entry.push(event, position);
            }
        }
    }

    /// The context of `owner` changed: its held entries are processed next
    pub(super) fn replay_held(&mut self, owner: usize) -> Step<()> {
        let held = std::mem::take(&mut self.object_mut(owner)?.held);
        if held.is_empty() {
            return Ok(());
        }
        debug!(entries = held.len(), "replaying held entries");
        for entry in held.into_iter().rev() {
            for event in entry.into_events().rev() {
                self.deferred.push_front(event);
            }
        }
        Ok(())
    }

    /// A key that maps to nothing
    pub(super) fn drop_key(&self, key: &str) -> Step<()> {
        if self.options.strict_values {
            return fail(Code::InvalidIriMapping, format!("'{}' does not expand to an IRI", key));
        }
        warn!(key, "dropping key without IRI mapping");
        Ok(())
    }

    pub(super) fn fresh_blank(&mut self) -> BlankNode {
        self.blank.fresh()
    }

    /// Subject for an `@id` (or `@vocab`-relative) value; `None` when not an IRI or blank node
    pub(super) fn node_term(&mut self, ctx: &Context, raw: &str, vocab: bool) -> Option<Term> {
        let expanded = ctx.expand_iri(raw, true, vocab)?;
        if let Some(label) = expanded.strip_prefix("_:") {
            return Some(self.blank.labeled(label).into());
        }
        if !is_absolute_iri(&expanded) {
            return None;
        }
        NamedNode::new(expanded).ok().map(Term::from)
    }

    /// Predicate for an expanded property IRI
    pub(super) fn predicate_term(&mut self, iri: &str) -> Option<Term> {
        if let Some(label) = iri.strip_prefix("_:") {
            if self.options.produce_generalized_rdf {
                return Some(self.blank.labeled(label).into());
            }
            return None;
        }
        NamedNode::new(iri).ok().map(Term::from)
    }

    pub(super) fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }

    pub(super) fn push_array_frame(&mut self, frame: ArrayFrame) {
        self.stack.push(Frame::Array(frame));
    }

    pub(super) fn push_object_frame(&mut self, frame: ObjectFrame) {
        self.stack.push(Frame::Object(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonld::tokenizer::tokenize_all;
    use serde_json::json;

    fn run(expander: &mut Expander, text: &str) -> Vec<String> {
        for (event, position) in tokenize_all(text.as_bytes()).unwrap() {
            expander.feed_at(event, Some(position)).unwrap();
        }
        expander.finish().unwrap();
        expander.drain().map(|q| q.to_string()).collect()
    }

    fn options() -> ParserOptions {
        ParserOptions::default().with_blank_node_prefix("b")
    }

    #[test]
    fn test_simple_node() {
        let mut expander = Expander::new(options()).unwrap();
        let quads = run(
            &mut expander,
            r#"{"@id": "http://example.org/a", "http://example.org/p": "v"}"#,
        );
        assert_eq!(quads, vec![r#"<http://example.org/a> <http://example.org/p> "v" ."#]);
        assert!(expander.is_done());
    }

    #[test]
    fn test_suspends_on_remote_context() {
        let mut expander = Expander::new(options().with_streaming_profile(true)).unwrap();
        let text = r#"{"@context": "http://example.org/ctx", "@id": "http://example.org/a", "name": "x"}"#;
        for (event, position) in tokenize_all(text.as_bytes()).unwrap() {
            expander.feed_at(event, Some(position)).unwrap();
        }
        expander.finish().unwrap();
        assert_eq!(expander.blocked_on(), Some("http://example.org/ctx"));
        assert!(expander.backlog() > 0);
        assert_eq!(expander.drain().count(), 0);

        expander
            .provide_context(
                "http://example.org/ctx",
                Ok(RemoteDocument::new(
                    "http://example.org/ctx",
                    json!({"@context": {"name": "http://schema.org/name"}}),
                )),
            )
            .unwrap();
        assert!(expander.is_done());
        let quads: Vec<String> = expander.drain().map(|q| q.to_string()).collect();
        assert_eq!(quads, vec![r#"<http://example.org/a> <http://schema.org/name> "x" ."#]);
    }

    #[test]
    fn test_failed_remote_context() {
        let mut expander = Expander::new(options()).unwrap();
        let text = r#"{"@context": "http://example.org/missing", "name": "x"}"#;
        for (event, position) in tokenize_all(text.as_bytes()).unwrap() {
            expander.feed_at(event, Some(position)).unwrap();
        }
        let err = expander
            .provide_context(
                "http://example.org/missing",
                Err(LoaderError::NotFound("http://example.org/missing".into())),
            )
            .unwrap_err();
        assert_eq!(err.code, Code::LoadingRemoteContextFailed);
    }

    #[test]
    fn test_initial_context_may_block() {
        let opts = options().with_initial_context(json!("http://example.org/init"));
        let mut expander = Expander::new(opts).unwrap();
        assert_eq!(expander.blocked_on(), Some("http://example.org/init"));
        expander
            .provide_context(
                "http://example.org/init",
                Ok(RemoteDocument::new(
                    "http://example.org/init",
                    json!({"@context": {"@vocab": "http://v.example/"}}),
                )),
            )
            .unwrap();
        let quads = run(&mut expander, r#"{"@id": "http://example.org/a", "p": 1}"#);
        assert_eq!(
            quads,
            vec![r#"<http://example.org/a> <http://v.example/p> "1"^^<http://www.w3.org/2001/XMLSchema#integer> ."#]
        );
    }

    #[test]
    fn test_unclosed_document() {
        let mut expander = Expander::new(options().with_streaming_profile(true)).unwrap();
        expander.feed(JsonEvent::StartObject).unwrap();
        let err = expander.finish().unwrap_err();
        assert_eq!(err.code, Code::UnclosedDocument);
    }

    #[test]
    fn test_invalid_base() {
        let err = Expander::new(ParserOptions::default().with_base_iri("relative/base")).err().unwrap();
        assert_eq!(err.code, Code::InvalidBaseIri);
    }
}
