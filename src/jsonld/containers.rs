//! Values: objects and arrays opening under a target, scalars, and the
//! container rules (lists, sets, maps, graph containers) applied to them.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::context::{ContainerMapping, Context};
use super::error::{fail, JsonLdErrorCode as Code, Step};
use super::expander::{vocab_term, Expander};
use super::pending::{GraphRef, Sink, TermRef};
use super::stack::{
    ArrayFrame, FreeKind, FreeTarget, Frame, MapFrame, NestedFrame, ObjectFrame, ObjectKind,
    PropertyTarget, Purpose, Target,
};
use super::streaming::{CaptureBuilder, HoldFrame};
use super::tokenizer::{JsonEvent, Scalar};
use super::values::{json_literal, native_literal, string_literal, ValueTerm};
use crate::rdf::vocab::rdf;
use crate::rdf::{Literal, NamedNode, Term};

impl Expander {
    pub(super) fn new_object(
        &mut self,
        target: Target,
        ctx: Arc<Context>,
        value_ctx: Arc<Context>,
        graph: GraphRef,
        sink: Sink,
    ) -> ObjectFrame {
        let slot = self.nodes.open_slot();
        ObjectFrame {
            slot,
            subject: TermRef::Slot(slot),
            target,
            kind: ObjectKind::Undetermined,
            type_ctx: value_ctx.clone(),
            value_ctx,
            ctx,
            graph,
            sink,
            pending: None,
            seen: 0,
            has_properties: false,
            unmapped: false,
            types: Vec::new(),
            type_scoped: false,
            value: None,
            language: None,
            direction: None,
            id_set: false,
            dropped: false,
            graph_default: false,
            list: None,
            list_wrap: false,
            collector: None,
            held: Vec::new(),
        }
    }

    fn start_capture(&mut self, purpose: Purpose, event: JsonEvent) {
        let mut builder = CaptureBuilder::new();
        builder.push(event);
        self.push(Frame::Capture(purpose, builder));
    }

    fn start_hold(&mut self, owner: usize, event: JsonEvent) {
        self.hold_event(owner, event);
        self.push(Frame::Hold(HoldFrame { owner, depth: 1 }));
    }

    pub(super) fn push_object(&mut self, target: Target) -> Step<()> {
        match target {
            Target::Skip => self.push(Frame::Skip(1)),
            Target::Capture(purpose) => self.start_capture(purpose, JsonEvent::StartObject),
            Target::Hold(owner) => self.start_hold(owner, JsonEvent::StartObject),
            Target::Id(owner) => return self.open_embedded(owner),
            Target::Nest(owner) => self.push(Frame::Nest(NestedFrame { owner, pending: None })),
            Target::Reverse(owner) => {
                self.push(Frame::Reverse(NestedFrame { owner, pending: None }))
            }
            Target::Annotation(annotation) => self.open_annotation(annotation),
            Target::Free(free) => {
                let frame = self.new_object(
                    Target::Free(free.clone()),
                    free.node_ctx.clone(),
                    free.value_ctx.clone(),
                    free.graph.clone(),
                    free.sink,
                );
                self.push_object_frame(frame);
            }
            Target::ListItem(list, pt) | Target::ListBody(list, pt) => {
                if pt.is_json() {
                    let target = Target::ListItem(list, pt);
                    self.start_capture(Purpose::Json(Box::new(target)), JsonEvent::StartObject);
                    return Ok(());
                }
                let frame = self.new_object(
                    Target::ListItem(list, pt.clone()),
                    pt.node_ctx.clone(),
                    pt.value_ctx.clone(),
                    pt.graph.clone(),
                    pt.sink,
                );
                self.push_object_frame(frame);
            }
            Target::Property(pt) => return self.open_property_object(pt),
        }
        Ok(())
    }

    fn open_property_object(&mut self, pt: Arc<PropertyTarget>) -> Step<()> {
        if pt.is_json() {
            let target = Target::Property(pt);
            self.start_capture(Purpose::Json(Box::new(target)), JsonEvent::StartObject);
            return Ok(());
        }
        if pt.language.is_some() {
            return fail(Code::InvalidLanguageMapValue, "language map values must be strings");
        }
        if pt.is_map() {
            self.push(Frame::Map(MapFrame { property: pt, pending: None }));
            return Ok(());
        }

        let mut ctx = pt.node_ctx.clone();
        if let Some((_, Some(def))) = &pt.extra_type {
            if let Some(local) = &def.context {
                ctx = self.processor.process(&ctx, local, def.base_url.as_deref(), false, false)?;
            }
        }

        if pt.wraps_graph() {
            let name = self.graph_name(&pt);
            self.link(&pt, TermRef::Ready(name.clone()));
            let free = Arc::new(FreeTarget {
                value_ctx: pt.value_ctx.clone(),
                node_ctx: ctx.clone(),
                graph: Some(TermRef::Ready(name)),
                sink: pt.sink,
                kind: FreeKind::Graph,
            });
            let frame = self.new_object(
                Target::Free(free.clone()),
                ctx,
                pt.value_ctx.clone(),
                free.graph.clone(),
                pt.sink,
            );
            self.push_object_frame(frame);
            return Ok(());
        }

        let mut frame = self.new_object(
            Target::Property(pt.clone()),
            ctx,
            pt.value_ctx.clone(),
            pt.graph.clone(),
            pt.sink,
        );
        let node = TermRef::Slot(frame.slot);
        if pt.wraps_list() {
            frame.list_wrap = true;
        } else {
            self.link(&pt, node.clone());
        }
        if let Some(entry) = &pt.index {
            self.emit(
                node.clone(),
                entry.property.clone(),
                TermRef::Ready(entry.value.clone()),
                pt.graph.clone(),
                pt.sink,
            );
        }
        if let Some((ty, _)) = &pt.extra_type {
            self.emit(
                node,
                vocab_term(rdf::TYPE),
                TermRef::Ready(ty.clone()),
                pt.graph.clone(),
                pt.sink,
            );
        }
        self.push_object_frame(frame);
        Ok(())
    }

    pub(super) fn push_array(&mut self, target: Target) -> Step<()> {
        let frame = match target {
            Target::Skip => {
                self.push(Frame::Skip(1));
                return Ok(());
            }
            Target::Capture(purpose) => {
                self.start_capture(purpose, JsonEvent::StartArray);
                return Ok(());
            }
            Target::Hold(owner) => {
                self.start_hold(owner, JsonEvent::StartArray);
                return Ok(());
            }
            Target::Id(_) => return fail(Code::InvalidIdValue, "@id must be a string"),
            Target::Reverse(_) => return fail(Code::InvalidReverseValue, "@reverse must be an object"),
            Target::Free(free) if free.kind == FreeKind::Document => {
                let root = FreeTarget {
                    value_ctx: free.value_ctx.clone(),
                    node_ctx: free.node_ctx.clone(),
                    graph: free.graph.clone(),
                    sink: free.sink,
                    kind: FreeKind::Root,
                };
                plain(Target::Free(Arc::new(root)))
            }
            Target::Free(_) | Target::Nest(_) | Target::Annotation(_) => plain(target),
            Target::ListItem(outer, pt) => {
                if pt.is_json() {
                    let target = Target::ListItem(outer, pt);
                    self.start_capture(Purpose::Json(Box::new(target)), JsonEvent::StartArray);
                    return Ok(());
                }
                // an array inside a list is a list of its own
                let slot = self.nodes.open_slot();
                let inner = self.open_list(slot, pt.graph.clone(), pt.sink);
                ArrayFrame {
                    target: Target::ListItem(inner, pt),
                    close_list: Some(inner),
                    append_to: Some(outer),
                }
            }
            Target::ListBody(list, pt) => plain(Target::ListItem(list, pt)),
            Target::Property(pt) => {
                if pt.is_json() {
                    let target = Target::Property(pt);
                    self.start_capture(Purpose::Json(Box::new(target)), JsonEvent::StartArray);
                    return Ok(());
                }
                if pt.depth >= 2 {
                    warn!("ignoring array nested too deep inside a container map");
                    self.push(Frame::Skip(1));
                    return Ok(());
                }
                if pt.wraps_list() {
                    let slot = self.nodes.open_slot();
                    self.link(&pt, TermRef::Slot(slot));
                    let list = self.open_list(slot, pt.graph.clone(), pt.sink);
                    ArrayFrame {
                        target: Target::ListItem(list, pt),
                        close_list: Some(list),
                        append_to: None,
                    }
                } else if pt.depth > 0 || pt.is_map() {
                    plain(Target::Property(Arc::new(pt.nested())))
                } else {
                    plain(Target::Property(pt))
                }
            }
        };
        self.push_array_frame(frame);
        Ok(())
    }

    pub(super) fn on_scalar(&mut self, target: Target, scalar: Scalar) -> Step<()> {
        match target {
            Target::Skip => Ok(()),
            Target::Capture(purpose) => self.deliver_captured(purpose, Value::from(scalar)),
            Target::Hold(owner) => {
                self.hold_event(owner, JsonEvent::Value(scalar));
                Ok(())
            }
            Target::Id(owner) => self.set_id(owner, scalar),
            Target::Nest(_) => fail(Code::InvalidNestValue, "@nest values must be objects"),
            Target::Reverse(_) => fail(Code::InvalidReverseValue, "@reverse must be an object"),
            Target::Annotation(_) => fail(Code::InvalidAnnotation, "@annotation values must be objects"),
            Target::Free(free) => {
                if free.kind == FreeKind::Included && scalar != Scalar::Null {
                    return fail(Code::InvalidIncludedValue, "@included values must be node objects");
                }
                Ok(())
            }
            Target::ListItem(list, pt) | Target::ListBody(list, pt) => {
                if pt.is_json() {
                    self.list_append(list, json_literal(&Value::from(scalar)).into());
                    return Ok(());
                }
                if let Some(term) = self.scalar_term(&pt, scalar)? {
                    self.list_append(list, term);
                }
                Ok(())
            }
            Target::Property(pt) => {
                if pt.is_json() {
                    return self.place(&pt, json_literal(&Value::from(scalar)).into());
                }
                match self.scalar_term(&pt, scalar)? {
                    Some(term) => self.place(&pt, term),
                    None => Ok(()),
                }
            }
        }
    }

    /// A complete `@json` value
    pub(super) fn deliver_json(&mut self, target: Target, value: &Value) -> Step<()> {
        let term: Term = json_literal(value).into();
        match target {
            Target::Property(pt) => self.place(&pt, term),
            Target::ListItem(list, _) | Target::ListBody(list, _) => {
                self.list_append(list, term);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Attach a finished value to a property
    fn place(&mut self, pt: &PropertyTarget, term: Term) -> Step<()> {
        if pt.reverse && term.is_literal() {
            return fail(Code::InvalidReversePropertyValue, "literal value of a reverse property");
        }
        if pt.index.is_some() && term.is_literal() {
            return fail(Code::InvalidValueObject, "literal in a property-valued index");
        }
        if pt.wraps_graph() {
            // a scalar alone in a graph: the graph stays empty
            let name = self.graph_name(pt);
            self.link(pt, TermRef::Ready(name));
            return Ok(());
        }
        if pt.wraps_list() {
            self.single_item_list(pt, term);
            return Ok(());
        }
        let node = TermRef::Ready(term);
        if let Some(entry) = &pt.index {
            self.emit(
                node.clone(),
                entry.property.clone(),
                TermRef::Ready(entry.value.clone()),
                pt.graph.clone(),
                pt.sink,
            );
        }
        if let Some((ty, _)) = &pt.extra_type {
            self.emit(
                node.clone(),
                vocab_term(rdf::TYPE),
                TermRef::Ready(ty.clone()),
                pt.graph.clone(),
                pt.sink,
            );
        }
        self.link(pt, node);
        Ok(())
    }

    fn graph_name(&mut self, pt: &PropertyTarget) -> Term {
        match &pt.graph_wrap {
            Some(Some(name)) => name.clone(),
            _ => self.fresh_blank().into(),
        }
    }

    /// `subject predicate object`, or reversed for reverse properties
    pub(super) fn link(&mut self, pt: &PropertyTarget, object: TermRef) {
        let (subject, object) = if pt.reverse {
            (object, pt.subject.clone())
        } else {
            (pt.subject.clone(), object)
        };
        self.emit(subject, pt.predicate.clone(), object, pt.graph.clone(), pt.sink);
    }

    /// A lone value under a list container
    pub(super) fn single_item_list(&mut self, pt: &PropertyTarget, item: Term) {
        let cell = self.fresh_blank();
        let cell_ref = TermRef::Ready(cell.into());
        self.link(pt, cell_ref.clone());
        self.emit(
            cell_ref.clone(),
            vocab_term(rdf::FIRST),
            TermRef::Ready(item),
            pt.graph.clone(),
            pt.sink,
        );
        self.emit(
            cell_ref,
            vocab_term(rdf::REST),
            TermRef::Ready(vocab_term(rdf::NIL)),
            pt.graph.clone(),
            pt.sink,
        );
    }

    /// Term for a scalar under a property, after type coercion
    fn scalar_term(&mut self, pt: &PropertyTarget, scalar: Scalar) -> Step<Option<Term>> {
        if scalar == Scalar::Null {
            return Ok(None);
        }
        let ctx = pt.value_ctx.clone();
        let type_map_key = pt.container.has(ContainerMapping::TYPE) && pt.depth > 0;
        let mapping = pt.type_mapping().map(str::to_owned);
        let term = match (mapping.as_deref(), scalar) {
            (Some("@id"), Scalar::String(s)) => self.node_reference(&ctx, &s, false),
            (Some("@vocab"), Scalar::String(s)) => self.node_reference(&ctx, &s, true),
            (_, Scalar::String(s)) if type_map_key => self.node_reference(&ctx, &s, false),
            (Some(datatype), scalar) if !datatype.starts_with('@') => {
                let datatype = match NamedNode::new(datatype) {
                    Ok(node) => node,
                    Err(e) => return fail(Code::InvalidTypedValue, e.to_string()),
                };
                native_literal(&scalar, Some(datatype)).map(Term::from)
            }
            (_, Scalar::String(s)) => self.language_string(pt, &ctx, &s)?,
            (_, scalar) => native_literal(&scalar, None).map(Term::from),
        };
        Ok(term)
    }

    fn node_reference(&mut self, ctx: &Context, raw: &str, vocab: bool) -> Option<Term> {
        let term = self.node_term(ctx, raw, vocab);
        if term.is_none() {
            warn!(value = raw, "dropping value that is not an IRI");
        }
        term
    }

    /// String literal carrying the language and direction in scope
    fn language_string(&mut self, pt: &PropertyTarget, ctx: &Context, value: &str) -> Step<Option<Term>> {
        let language = match &pt.language {
            Some(language) => language.clone(),
            None => match pt.def.as_ref().and_then(|d| d.language.clone()) {
                Some(language) => language,
                None => ctx.language.clone(),
            },
        };
        let language = match language {
            Some(tag) if self.options.normalize_language_tags => Some(tag.to_ascii_lowercase()),
            other => other,
        };
        let direction = match pt.def.as_ref().and_then(|d| d.direction) {
            Some(direction) => direction,
            None => ctx.direction,
        };
        match string_literal(value, language.as_deref(), direction, self.options.rdf_direction) {
            Ok(value) => Ok(Some(self.materialize(value, pt.graph.clone(), pt.sink))),
            Err(e) if self.options.strict_values => fail(Code::InvalidLanguageTaggedString, e.to_string()),
            Err(e) => {
                warn!(error = %e, "dropping string with invalid language tag");
                Ok(None)
            }
        }
    }

    /// Turn a compound literal into its blank node and triples
    pub(super) fn materialize(&mut self, value: ValueTerm, graph: GraphRef, sink: Sink) -> Term {
        match value {
            ValueTerm::Term(term) => term,
            ValueTerm::Compound {
                value,
                language,
                direction,
            } => {
                let node = self.fresh_blank();
                let subject = TermRef::Ready(node.clone().into());
                self.emit(
                    subject.clone(),
                    vocab_term(rdf::VALUE),
                    TermRef::Ready(value.into()),
                    graph.clone(),
                    sink,
                );
                if let Some(language) = language {
                    self.emit(
                        subject.clone(),
                        vocab_term(rdf::LANGUAGE),
                        TermRef::Ready(Literal::new_simple_literal(language).into()),
                        graph.clone(),
                        sink,
                    );
                }
                self.emit(
                    subject,
                    vocab_term(rdf::DIRECTION),
                    TermRef::Ready(Literal::new_simple_literal(direction.as_str()).into()),
                    graph,
                    sink,
                );
                node.into()
            }
        }
    }
}

fn plain(target: Target) -> ArrayFrame {
    ArrayFrame {
        target,
        close_list: None,
        append_to: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonld::options::ParserOptions;
    use crate::jsonld::tokenizer::tokenize_all;

    const FIRST: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#first>";
    const REST: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#rest>";
    const NIL: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>";
    const TYPE: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>";

    fn expand(text: &str) -> Result<Vec<String>, Code> {
        let mut expander = Expander::new(ParserOptions::default().with_blank_node_prefix("b")).unwrap();
        for (event, position) in tokenize_all(text.as_bytes()).unwrap() {
            expander.feed_at(event, Some(position)).map_err(|e| e.code)?;
        }
        expander.finish().map_err(|e| e.code)?;
        Ok(expander.drain().map(|q| q.to_string()).collect())
    }

    #[test]
    fn test_single_value_under_list_container() {
        let quads = expand(
            r#"{"@context": {"items": {"@id": "http://ex/items", "@container": "@list"}},
                "@id": "http://ex/a", "items": "x"}"#,
        )
        .unwrap();
        assert_eq!(
            quads,
            vec![
                "<http://ex/a> <http://ex/items> _:b0 .".to_string(),
                format!(r#"_:b0 {} "x" ."#, FIRST),
                format!("_:b0 {} {} .", REST, NIL),
            ]
        );
    }

    #[test]
    fn test_scalar_alone_in_graph_container() {
        let quads = expand(
            r#"{"@context": {"g": {"@id": "http://ex/g", "@container": "@graph"}},
                "@id": "http://ex/a", "g": "x"}"#,
        )
        .unwrap();
        assert_eq!(quads, vec!["<http://ex/a> <http://ex/g> _:b0 ."]);
    }

    #[test]
    fn test_type_map_string_is_a_node_reference() {
        let quads = expand(
            r#"{"@context": {"@vocab": "http://ex/", "things": {"@container": "@type"}},
                "@id": "http://ex/a", "things": {"Gadget": "http://ex/g"}}"#,
        )
        .unwrap();
        assert_eq!(
            quads,
            vec![
                format!("<http://ex/g> {} <http://ex/Gadget> .", TYPE),
                "<http://ex/a> <http://ex/things> <http://ex/g> .".to_string(),
            ]
        );
    }

    #[test]
    fn test_literals_rejected_where_nodes_are_required() {
        assert_eq!(
            expand(r#"{"@id": "http://ex/a", "@reverse": {"http://ex/p": "x"}}"#).unwrap_err(),
            Code::InvalidReversePropertyValue
        );
        assert_eq!(
            expand(
                r#"{"@context": {"@vocab": "http://ex/", "byCat": {"@container": "@index", "@index": "category"}},
                    "@id": "http://ex/a", "byCat": {"news": "x"}}"#
            )
            .unwrap_err(),
            Code::InvalidValueObject
        );
    }

    #[test]
    fn test_array_nested_too_deep_in_a_map_is_skipped() {
        let quads = expand(
            r#"{"@context": {"label": {"@id": "http://ex/label", "@container": "@language"}},
                "@id": "http://ex/a", "label": {"en": [["x"]], "de": "y"}}"#,
        )
        .unwrap();
        assert_eq!(quads, vec![r#"<http://ex/a> <http://ex/label> "y"@de ."#]);
    }
}
