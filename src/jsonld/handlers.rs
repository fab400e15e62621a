//! Entry handlers
//!
//! Every key is classified once into a [`KeyKind`] against the context of the
//! object it belongs to, then dispatched. Handlers record the [`Target`] of
//! the value that follows; the value itself is processed by the container
//! code as its events arrive.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::context::{ContainerMapping, Context, Direction, TermDefinition};
use super::error::{fail, JsonLdErrorCode as Code, Step};
use super::expander::{vocab_term, Expander};
use super::iri::{is_absolute_iri, Keyword};
use super::pending::TermRef;
use super::stack::{
    FreeKind, FreeTarget, Frame, IndexEntry, ObjectFrame, ObjectKind, PropertyTarget, Purpose,
    Target,
};
use super::tokenizer::Scalar;
use super::values::{json_literal, native_literal, string_literal};
use crate::rdf::vocab::rdf;
use crate::rdf::{Literal, NamedNode, Term};

/// What a key means in its object
#[derive(Debug)]
pub(super) enum KeyKind {
    Context,
    Keyword(Keyword),
    Property {
        iri: String,
        def: Option<Arc<TermDefinition>>,
    },
    /// Maps to nothing; the value is skipped or held
    Drop,
}

impl KeyKind {
    pub fn classify(ctx: &Context, key: &str) -> Self {
        if key == "@context" {
            return KeyKind::Context;
        }
        let Some(expanded) = ctx.expand_iri(key, false, true) else {
            return KeyKind::Drop;
        };
        if let Some(keyword) = Keyword::parse(&expanded) {
            return KeyKind::Keyword(keyword);
        }
        if expanded.starts_with('@') || !expanded.contains(':') {
            return KeyKind::Drop;
        }
        KeyKind::Property {
            iri: expanded,
            def: ctx.term(key).cloned(),
        }
    }
}

fn check_kind(frame: &ObjectFrame, keyword: Option<Keyword>) -> Step<()> {
    let value_entry = matches!(
        keyword,
        Some(
            Keyword::Value
                | Keyword::Type
                | Keyword::Language
                | Keyword::Direction
                | Keyword::Index
                | Keyword::Annotation
        )
    );
    match frame.kind {
        ObjectKind::Value if value_entry => Ok(()),
        ObjectKind::Value => fail(Code::InvalidValueObject, "value object with node entries"),
        ObjectKind::List | ObjectKind::Set if keyword == Some(Keyword::Index) => Ok(()),
        ObjectKind::List | ObjectKind::Set => {
            fail(Code::InvalidSetOrListObject, "list or set object with other entries")
        }
        ObjectKind::Node => match keyword {
            Some(Keyword::Value) => fail(Code::InvalidValueObject, "@value in a node object"),
            Some(Keyword::List | Keyword::Set) => {
                fail(Code::InvalidSetOrListObject, "@list or @set in a node object")
            }
            _ => Ok(()),
        },
        ObjectKind::Undetermined => match keyword {
            Some(Keyword::List | Keyword::Set)
                if !frame.types.is_empty()
                    || frame.has_seen(Keyword::Language)
                    || frame.has_seen(Keyword::Direction)
                    || frame.has_seen(Keyword::Annotation) =>
            {
                fail(Code::InvalidSetOrListObject, "list or set object with other entries")
            }
            _ => Ok(()),
        },
    }
}

fn type_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items.iter().map(|v| v.as_str().map(str::to_owned)).collect(),
        _ => None,
    }
}

fn scalar_of(value: Value) -> Option<Scalar> {
    match value {
        Value::Null => Some(Scalar::Null),
        Value::Bool(b) => Some(Scalar::Bool(b)),
        Value::Number(n) => Some(Scalar::Number(n)),
        Value::String(s) => Some(Scalar::String(s)),
        _ => None,
    }
}

impl Expander {
    pub(super) fn on_key(&mut self, key: &str) -> Step<()> {
        let Some(at) = self.stack.len().checked_sub(1) else {
            return fail(Code::SyntaxError, "key outside of an object");
        };
        match &self.stack[at] {
            Frame::Object(_) => self.object_key(at, at, key, false),
            Frame::Nest(nested) => {
                let owner = nested.owner;
                self.object_key(owner, at, key, true)
            }
            Frame::Reverse(nested) => {
                let owner = nested.owner;
                self.reverse_key(owner, at, key)
            }
            Frame::Map(map) => {
                let property = map.property.clone();
                self.map_key(at, &property, key)
            }
            _ => fail(Code::SyntaxError, "key outside of an object"),
        }
    }

    fn skip_value(&mut self, at: usize) {
        self.set_pending(at, Target::Skip);
    }

    fn dropped_key(&mut self, at: usize, key: &str) -> Step<()> {
        self.drop_key(key)?;
        self.skip_value(at);
        Ok(())
    }

    /// A later `@context` or type-scoped `@type` of this object could still define `key`
    fn may_define_later(&self, frame: &ObjectFrame, key: &str) -> bool {
        if self.options.is_strict_streaming() || key.starts_with('@') {
            return false;
        }
        !frame.has_seen(Keyword::Context)
            || (!frame.has_seen(Keyword::Type) && frame.type_ctx.has_scoped_terms())
    }

    /// Key of a node object, or of a `@nest` object when `nested`
    fn object_key(&mut self, owner: usize, at: usize, key: &str, nested: bool) -> Step<()> {
        let (dropped, ctx) = {
            let frame = self.object(owner)?;
            (frame.dropped, frame.ctx.clone())
        };
        if dropped {
            self.skip_value(at);
            return Ok(());
        }
        match KeyKind::classify(&ctx, key) {
            KeyKind::Context if nested => {
                self.skip_value(at);
                Ok(())
            }
            KeyKind::Context => {
                let strict = self.options.is_strict_streaming();
                let frame = self.object_mut(owner)?;
                if frame.has_entries() || frame.unmapped {
                    if strict {
                        return fail(Code::InvalidStreamingKeyOrder, "@context must come first");
                    }
                    warn!("@context after other entries applies to the entries that follow it");
                }
                frame.mark(Keyword::Context);
                self.set_pending(
                    at,
                    Target::Capture(Purpose::Entry {
                        owner,
                        keyword: Keyword::Context,
                    }),
                );
                Ok(())
            }
            KeyKind::Keyword(Keyword::Value) if nested => {
                fail(Code::InvalidNestValue, "@nest objects cannot hold @value")
            }
            KeyKind::Keyword(keyword) => self.keyword_entry(owner, at, keyword),
            KeyKind::Property { iri, def } => self.property_entry(owner, at, &iri, def, false),
            KeyKind::Drop if !nested && self.may_define_later(self.object(owner)?, key) => {
                self.hold_entry(owner, key)
            }
            KeyKind::Drop => {
                self.object_mut(owner)?.unmapped = true;
                self.dropped_key(at, key)
            }
        }
    }

    fn reverse_key(&mut self, owner: usize, at: usize, key: &str) -> Step<()> {
        let ctx = self.object(owner)?.ctx.clone();
        match KeyKind::classify(&ctx, key) {
            KeyKind::Context | KeyKind::Keyword(_) => fail(
                Code::InvalidReversePropertyMap,
                format!("keyword '{}' inside @reverse", key),
            ),
            KeyKind::Property { iri, def } => self.property_entry(owner, at, &iri, def, true),
            KeyKind::Drop => self.dropped_key(at, key),
        }
    }

    fn keyword_entry(&mut self, owner: usize, at: usize, keyword: Keyword) -> Step<()> {
        let strict = self.options.is_strict_streaming();
        {
            let frame = self.object(owner)?;
            if frame.has_seen(keyword) && !matches!(keyword, Keyword::Type | Keyword::Included | Keyword::Nest) {
                return fail(
                    Code::CollidingKeywords,
                    format!("{} appears more than once", keyword.as_str()),
                );
            }
            check_kind(frame, Some(keyword))?;
            if frame.is_annotation()
                && matches!(
                    keyword,
                    Keyword::Id | Keyword::Value | Keyword::List | Keyword::Set | Keyword::Graph
                )
            {
                return fail(
                    Code::InvalidAnnotation,
                    format!("{} inside an annotation", keyword.as_str()),
                );
            }
            if matches!(frame.target, Target::Id(_))
                && matches!(
                    keyword,
                    Keyword::Value | Keyword::List | Keyword::Set | Keyword::Graph | Keyword::Included
                )
            {
                return fail(
                    Code::InvalidEmbeddedNode,
                    format!("{} inside an embedded node", keyword.as_str()),
                );
            }
            if frame.graph_default && keyword == Keyword::Id {
                if strict {
                    return fail(Code::InvalidStreamingKeyOrder, "@id after the default @graph");
                }
                warn!("@id after a top-level @graph; the graph stays the default graph");
            }
        }
        match keyword {
            Keyword::Id => {
                self.become_node(owner)?;
                self.object_mut(owner)?.mark(keyword);
                self.set_pending(at, Target::Id(owner));
            }
            Keyword::Value => {
                let frame = self.object_mut(owner)?;
                if frame.types.len() > 1 {
                    return fail(Code::InvalidTypedValue, "value objects take a single @type");
                }
                frame.kind = ObjectKind::Value;
                frame.mark(keyword);
                self.capture_entry(owner, at, keyword);
            }
            Keyword::Type | Keyword::Language | Keyword::Direction | Keyword::Index => {
                self.object_mut(owner)?.mark(keyword);
                self.capture_entry(owner, at, keyword);
            }
            Keyword::List => self.list_entry(owner, at)?,
            Keyword::Set => self.set_entry(owner, at)?,
            Keyword::Graph => self.graph_entry(owner, at)?,
            Keyword::Included => {
                if self.options.is_1_0() {
                    self.skip_value(at);
                    return Ok(());
                }
                self.become_node(owner)?;
                let frame = self.object_mut(owner)?;
                frame.mark(keyword);
                let target = FreeTarget {
                    value_ctx: frame.ctx.clone(),
                    node_ctx: frame.ctx.for_node_objects(),
                    graph: frame.graph.clone(),
                    sink: frame.sink,
                    kind: FreeKind::Included,
                };
                self.set_pending(at, Target::Free(Arc::new(target)));
            }
            Keyword::Reverse => {
                let frame = self.object(owner)?;
                if frame.is_embedded() && !self.options.rdfstar_reverse_in_embedded {
                    return fail(Code::InvalidEmbeddedNode, "@reverse inside an embedded node");
                }
                self.become_node(owner)?;
                self.object_mut(owner)?.mark(keyword);
                self.set_pending(at, Target::Reverse(owner));
            }
            Keyword::Nest => {
                self.object_mut(owner)?.mark(keyword);
                self.set_pending(at, Target::Nest(owner));
            }
            Keyword::Annotation => self.annotation_entry(owner, at)?,
            other => {
                warn!(keyword = other.as_str(), "ignoring keyword entry");
                self.skip_value(at);
            }
        }
        Ok(())
    }

    fn capture_entry(&mut self, owner: usize, at: usize, keyword: Keyword) {
        self.set_pending(at, Target::Capture(Purpose::Entry { owner, keyword }));
    }

    fn list_entry(&mut self, owner: usize, at: usize) -> Step<()> {
        let (target, slot, graph, sink, list_wrap) = {
            let frame = self.object(owner)?;
            (frame.target.clone(), frame.slot, frame.graph.clone(), frame.sink, frame.list_wrap)
        };
        let pt = match &target {
            Target::Property(pt) | Target::ListItem(_, pt) => pt.clone(),
            _ => {
                // lists without a property have nothing to hang on
                let frame = self.object_mut(owner)?;
                frame.kind = ObjectKind::List;
                frame.mark(Keyword::List);
                self.skip_value(at);
                return Ok(());
            }
        };
        if pt.reverse && !self.options.allow_subject_list {
            return fail(Code::InvalidReversePropertyValue, "@list value of a reverse property");
        }
        let list = self.open_list(slot, graph, sink);
        {
            let frame = self.object_mut(owner)?;
            frame.kind = ObjectKind::List;
            frame.mark(Keyword::List);
            frame.list = Some(list);
            frame.list_wrap = false;
        }
        if list_wrap {
            self.link(&pt, TermRef::Slot(slot));
        }
        self.set_pending(at, Target::ListBody(list, pt));
        Ok(())
    }

    fn set_entry(&mut self, owner: usize, at: usize) -> Step<()> {
        let (target, list_wrap) = {
            let frame = self.object(owner)?;
            (frame.target.clone(), frame.list_wrap)
        };
        if list_wrap {
            // a set directly under a list container is that list
            self.list_entry(owner, at)?;
            self.object_mut(owner)?.mark(Keyword::Set);
            return Ok(());
        }
        {
            let frame = self.object_mut(owner)?;
            frame.kind = ObjectKind::Set;
            frame.mark(Keyword::Set);
        }
        let next = match target {
            Target::ListItem(list, pt) => Target::ListBody(list, pt),
            Target::Property(_) | Target::Free(_) | Target::Annotation(_) => target,
            _ => Target::Skip,
        };
        self.set_pending(at, next);
        Ok(())
    }

    fn graph_entry(&mut self, owner: usize, at: usize) -> Step<()> {
        let default = {
            let frame = self.object(owner)?;
            frame.is_top_document() && !frame.has_entries()
        };
        if !default {
            self.become_node(owner)?;
        }
        let frame = self.object_mut(owner)?;
        frame.mark(Keyword::Graph);
        let graph = if default {
            frame.graph_default = true;
            frame.graph.clone()
        } else {
            Some(frame.self_ref())
        };
        let target = FreeTarget {
            value_ctx: frame.ctx.clone(),
            node_ctx: frame.ctx.for_node_objects(),
            graph,
            sink: frame.sink,
            kind: FreeKind::Graph,
        };
        self.set_pending(at, Target::Free(Arc::new(target)));
        Ok(())
    }

    fn property_entry(
        &mut self,
        owner: usize,
        at: usize,
        iri: &str,
        def: Option<Arc<TermDefinition>>,
        in_reverse: bool,
    ) -> Step<()> {
        let (ctx, kind_ok, after_default_graph, embedded) = {
            let frame = self.object(owner)?;
            (
                frame.ctx.clone(),
                check_kind(frame, None),
                frame.graph_default,
                frame.is_embedded(),
            )
        };
        kind_ok?;
        if after_default_graph {
            if self.options.is_strict_streaming() {
                return fail(Code::InvalidStreamingKeyOrder, "property after the default @graph");
            }
            warn!(property = iri, "property after a top-level @graph; the graph stays the default graph");
        }
        let reverse = def.as_ref().map_or(false, |d| d.reverse) != in_reverse;
        let container = def.as_ref().map(|d| d.container).unwrap_or_default();
        if reverse && container.is_list() && !self.options.allow_subject_list {
            return fail(Code::InvalidReversePropertyValue, "list container on a reverse property");
        }
        if reverse && embedded && !self.options.rdfstar_reverse_in_embedded {
            return fail(Code::InvalidEmbeddedNode, "reverse property inside an embedded node");
        }

        // scoped contexts first: processing may suspend, nothing is mutated yet
        let scoped = def.as_ref().and_then(|d| d.context.as_ref().map(|c| (c, d.base_url.as_deref())));
        let value_ctx = match scoped {
            Some((local, base)) => self.processor.process(&ctx, local, base, true, true)?,
            None => ctx.clone(),
        };
        let node_ctx = match (&ctx.previous, scoped) {
            (None, _) => value_ctx.clone(),
            (Some(_), Some((local, base))) => {
                self.processor.process(&ctx.for_node_objects(), local, base, true, true)?
            }
            (Some(_), None) => ctx.for_node_objects(),
        };

        let Some(predicate) = self.predicate_term(iri) else {
            warn!(property = iri, "dropping property that is not a valid predicate");
            self.skip_value(at);
            return Ok(());
        };
        self.become_node(owner)?;
        let frame = self.object_mut(owner)?;
        frame.has_properties = true;
        let target = PropertyTarget {
            subject: frame.self_ref(),
            predicate,
            reverse,
            graph: frame.graph.clone(),
            sink: frame.sink,
            def,
            value_ctx,
            node_ctx,
            container,
            language: None,
            index: None,
            default_id: None,
            extra_type: None,
            graph_wrap: None,
            depth: 0,
        };
        self.set_pending(at, Target::Property(Arc::new(target)));
        Ok(())
    }

    /// Key of a language, index, id or type map
    fn map_key(&mut self, at: usize, property: &Arc<PropertyTarget>, key: &str) -> Step<()> {
        let ctx = property.value_ctx.clone();
        let none = key == "@none" || ctx.expand_iri(key, false, true).as_deref() == Some("@none");
        let container = property.container;
        let mut next = property.nested();

        if container.has(ContainerMapping::LANGUAGE) {
            let tag = if self.options.normalize_language_tags {
                key.to_ascii_lowercase()
            } else {
                key.to_owned()
            };
            next.language = Some(if none { None } else { Some(tag) });
        } else if container.has(ContainerMapping::INDEX) {
            if container.is_graph() {
                next.graph_wrap = Some(None);
            }
            let index_property = property.def.as_ref().and_then(|d| d.index.clone());
            if let (Some(index_property), false) = (index_property, none) {
                next.index = self.index_entry(&ctx, &index_property, key)?;
            }
        } else if container.has(ContainerMapping::ID) {
            let id = if none { None } else { self.node_term(&ctx, key, false) };
            if container.is_graph() {
                next.graph_wrap = Some(id);
            } else {
                next.default_id = id;
            }
        } else if container.has(ContainerMapping::TYPE) && !none {
            next.extra_type = self
                .node_term(&ctx, key, true)
                .map(|ty| (ty, ctx.term(key).cloned()));
        }
        self.set_pending(at, Target::Property(Arc::new(next)));
        Ok(())
    }

    /// `<node> <index property> <key>` for a property-valued index
    fn index_entry(&mut self, ctx: &Context, index_property: &str, key: &str) -> Step<Option<IndexEntry>> {
        let Some(iri) = ctx.expand_iri(index_property, false, true) else {
            return Ok(None);
        };
        if !is_absolute_iri(&iri) {
            return fail(Code::InvalidTermDefinition, format!("@index '{}' is not an IRI", index_property));
        }
        let Some(property) = self.predicate_term(&iri) else {
            return Ok(None);
        };
        let mapping = ctx.term(index_property).and_then(|d| d.type_mapping.clone());
        let value = match mapping.as_deref() {
            Some("@id") => self.node_term(ctx, key, false),
            Some("@vocab") => self.node_term(ctx, key, true),
            _ => Some(Literal::new_simple_literal(key).into()),
        };
        Ok(value.map(|value| IndexEntry { property, value }))
    }

    /// A keyword entry whose value was captured whole
    pub(super) fn deliver_entry(&mut self, owner: usize, keyword: Keyword, value: &Value) -> Step<()> {
        match keyword {
            Keyword::Context => {
                let ctx = self.object(owner)?.ctx.clone();
                let base = self.options.base_iri.clone();
                let next = self.processor.process(&ctx, value, base.as_deref(), false, true)?;
                let frame = self.object_mut(owner)?;
                frame.ctx = next.clone();
                frame.value_ctx = next.clone();
                frame.type_ctx = next;
                self.replay_held(owner)
            }
            Keyword::Type => self.deliver_type(owner, value),
            Keyword::Value => {
                self.object_mut(owner)?.value = Some(value.clone());
                Ok(())
            }
            Keyword::Language => {
                self.object_mut(owner)?.language = Some(value.clone());
                Ok(())
            }
            Keyword::Direction => {
                self.object_mut(owner)?.direction = Some(value.clone());
                Ok(())
            }
            Keyword::Index => {
                if !value.is_string() {
                    return fail(Code::InvalidIndexValue, "@index must be a string");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn deliver_type(&mut self, owner: usize, value: &Value) -> Step<()> {
        let (kind, has_properties, unmapped, type_ctx, mut ctx) = {
            let frame = self.object(owner)?;
            (
                frame.kind,
                frame.has_properties,
                frame.unmapped,
                frame.type_ctx.clone(),
                frame.ctx.clone(),
            )
        };
        let Some(types) = type_strings(value) else {
            return match kind {
                ObjectKind::Value => fail(Code::InvalidTypedValue, "@type of a value object must be a string"),
                _ => fail(Code::InvalidTypeValue, "@type must be a string or an array of strings"),
            };
        };
        if kind == ObjectKind::Value && (types.len() != 1 || !value.is_string()) {
            return fail(Code::InvalidTypedValue, "@type of a value object must be a string");
        }

        let mut sorted = types.clone();
        sorted.sort();
        sorted.dedup();
        let mut scoped = false;
        for ty in &sorted {
            let Some(def) = type_ctx.term(ty) else { continue };
            if let Some(local) = &def.context {
                ctx = self.processor.process(&ctx, local, def.base_url.as_deref(), false, false)?;
                scoped = true;
            }
        }
        let late = (has_properties && (scoped || !self.options.streaming_profile_allow_out_of_order_plain_type))
            || (unmapped && scoped);
        if late {
            if self.options.is_strict_streaming() {
                return fail(Code::InvalidStreamingKeyOrder, "@type after properties");
            }
            if scoped {
                warn!("type-scoped context after properties applies to the entries that follow it");
            }
        }

        let frame = self.object_mut(owner)?;
        if scoped {
            frame.ctx = ctx;
            frame.type_scoped = true;
        }
        if frame.kind != ObjectKind::Node {
            frame.types.extend(types);
        } else {
            for ty in &types {
                self.emit_type(owner, ty)?;
            }
        }
        if scoped {
            self.replay_held(owner)?;
        }
        Ok(())
    }

    fn emit_type(&mut self, owner: usize, raw: &str) -> Step<()> {
        let (type_ctx, subject, graph, sink) = {
            let frame = self.object(owner)?;
            (frame.type_ctx.clone(), frame.self_ref(), frame.graph.clone(), frame.sink)
        };
        match self.node_term(&type_ctx, raw, true) {
            Some(ty) => self.emit(subject, vocab_term(rdf::TYPE), TermRef::Ready(ty), graph, sink),
            None if self.options.strict_values => {
                return fail(Code::InvalidTypeValue, format!("'{}' is not a type IRI", raw))
            }
            None => warn!(value = raw, "dropping invalid @type"),
        }
        Ok(())
    }

    /// Commit an undetermined object to being a node; flushes captured types
    pub(super) fn become_node(&mut self, idx: usize) -> Step<()> {
        let frame = self.object_mut(idx)?;
        if frame.kind == ObjectKind::Node {
            return Ok(());
        }
        frame.kind = ObjectKind::Node;
        let types = std::mem::take(&mut frame.types);
        for ty in &types {
            self.emit_type(idx, ty)?;
        }
        Ok(())
    }

    /// `@id` value
    pub(super) fn set_id(&mut self, owner: usize, scalar: Scalar) -> Step<()> {
        let Scalar::String(raw) = scalar else {
            return fail(Code::InvalidIdValue, "@id must be a string");
        };
        let ctx = self.object(owner)?.ctx.clone();
        let term = self.node_term(&ctx, &raw, false);
        if term.is_none() {
            if self.options.strict_values {
                return fail(Code::InvalidIdValue, format!("'{}' is not an IRI or blank node", raw));
            }
            warn!(id = raw.as_str(), "dropping node with invalid @id");
        }
        self.resolve_subject(owner, term)
    }

    /// Settle the subject of the object at `owner`; `None` drops it
    pub(super) fn resolve_subject(&mut self, owner: usize, term: Option<Term>) -> Step<()> {
        let frame = self.object_mut(owner)?;
        frame.id_set = true;
        match &term {
            Some(term) => frame.subject = TermRef::Ready(term.clone()),
            None => frame.dropped = true,
        }
        let slot = frame.slot;
        self.settle(slot, term);
        Ok(())
    }

    /// What a closing value object stands for
    pub(super) fn value_object_term(&mut self, idx: usize) -> Step<Option<Term>> {
        let (value, types, type_ctx, language, direction, graph, sink) = {
            let frame = self.object(idx)?;
            match &frame.target {
                Target::Property(pt) if pt.reverse => {
                    return fail(Code::InvalidReversePropertyValue, "value object under a reverse property")
                }
                Target::Property(pt) if pt.index.is_some() => {
                    return fail(Code::InvalidValueObject, "value object in a property-valued index")
                }
                Target::Free(ft) if ft.kind == FreeKind::Included => {
                    return fail(Code::InvalidIncludedValue, "value object in @included")
                }
                _ => {}
            }
            (
                frame.value.clone().unwrap_or(Value::Null),
                frame.types.clone(),
                frame.type_ctx.clone(),
                frame.language.clone(),
                frame.direction.clone(),
                frame.graph.clone(),
                frame.sink,
            )
        };

        let mut json = false;
        let datatype = match types.first() {
            None => None,
            Some(raw) => match type_ctx.expand_iri(raw, true, true) {
                Some(iri) if iri == "@json" => {
                    if self.options.is_1_0() {
                        return fail(Code::InvalidTypedValue, "@json requires json-ld-1.1");
                    }
                    json = true;
                    None
                }
                Some(iri) if is_absolute_iri(&iri) => match NamedNode::new(iri) {
                    Ok(node) => Some(node),
                    Err(e) => return fail(Code::InvalidTypedValue, e.to_string()),
                },
                _ => return fail(Code::InvalidTypedValue, format!("'{}' is not an absolute IRI", raw)),
            },
        };
        let language = match language {
            None | Some(Value::Null) => None,
            Some(Value::String(tag)) if self.options.normalize_language_tags => Some(tag.to_ascii_lowercase()),
            Some(Value::String(tag)) => Some(tag),
            Some(_) => return fail(Code::InvalidLanguageTaggedString, "@language must be a string"),
        };
        let direction = match direction {
            None | Some(Value::Null) => None,
            Some(Value::String(dir)) => match Direction::parse(&dir) {
                Some(dir) => Some(dir),
                None => return fail(Code::InvalidBaseDirection, format!("invalid @direction '{}'", dir)),
            },
            Some(_) => return fail(Code::InvalidBaseDirection, "@direction must be a string"),
        };
        if (json || datatype.is_some()) && (language.is_some() || direction.is_some()) {
            return fail(Code::InvalidValueObject, "typed value with a language or direction");
        }
        if json {
            return Ok(Some(json_literal(&value).into()));
        }
        let Some(scalar) = scalar_of(value) else {
            return fail(Code::InvalidValueObjectValue, "@value must be a scalar");
        };
        if (language.is_some() || direction.is_some()) && !matches!(scalar, Scalar::String(_) | Scalar::Null) {
            return fail(Code::InvalidLanguageTaggedValue, "language-tagged value must be a string");
        }
        Ok(match (datatype, scalar) {
            (datatype @ Some(_), scalar) => native_literal(&scalar, datatype).map(Term::from),
            (None, Scalar::String(s)) => {
                match string_literal(&s, language.as_deref(), direction, self.options.rdf_direction) {
                    Ok(value) => Some(self.materialize(value, graph, sink)),
                    Err(e) if self.options.strict_values => {
                        return fail(Code::InvalidLanguageTaggedString, e.to_string())
                    }
                    Err(e) => {
                        warn!(error = %e, "dropping value with invalid language tag");
                        None
                    }
                }
            }
            (None, scalar) => native_literal(&scalar, None).map(Term::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonld::options::ProcessingMode;

    fn ctx_with(term: &str, iri: &str) -> Context {
        let mut ctx = Context::new(None, ProcessingMode::JsonLd11);
        ctx.vocab = Some("http://vocab.example/".to_owned());
        ctx.terms.insert(
            term.to_owned(),
            Arc::new(TermDefinition {
                iri: Some(iri.to_owned()),
                ..Default::default()
            }),
        );
        ctx
    }

    #[test]
    fn test_classify_keys() {
        let ctx = ctx_with("id", "@id");
        assert!(matches!(KeyKind::classify(&ctx, "@context"), KeyKind::Context));
        assert!(matches!(KeyKind::classify(&ctx, "id"), KeyKind::Keyword(Keyword::Id)));
        assert!(matches!(KeyKind::classify(&ctx, "@type"), KeyKind::Keyword(Keyword::Type)));
        assert!(matches!(KeyKind::classify(&ctx, "@unknown"), KeyKind::Drop));
        match KeyKind::classify(&ctx, "name") {
            KeyKind::Property { iri, def } => {
                assert_eq!(iri, "http://vocab.example/name");
                assert!(def.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_without_vocab() {
        let ctx = Context::new(None, ProcessingMode::JsonLd11);
        assert!(matches!(KeyKind::classify(&ctx, "name"), KeyKind::Drop));
        assert!(matches!(
            KeyKind::classify(&ctx, "http://example.org/p"),
            KeyKind::Property { .. }
        ));
        assert!(matches!(KeyKind::classify(&ctx, "_:p"), KeyKind::Property { .. }));
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(type_strings(&serde_json::json!("a")), Some(vec!["a".to_owned()]));
        assert_eq!(
            type_strings(&serde_json::json!(["a", "b"])),
            Some(vec!["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(type_strings(&serde_json::json!(["a", 1])), None);
        assert_eq!(type_strings(&serde_json::json!({"a": 1})), None);
    }
}
