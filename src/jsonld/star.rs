//! RDF-star: embedded nodes (`@id` holding a node object) and `@annotation`

use std::sync::Arc;
use tracing::warn;

use super::error::{fail, JsonLdErrorCode as Code, Step};
use super::expander::Expander;
use super::iri::Keyword;
use super::pending::{Sink, TermRef, TripleRef};
use super::stack::{AnnotationTarget, ObjectFrame, ObjectKind, Target};
use crate::rdf::Term;

impl Expander {
    /// Object value of `@id`: its triples are collected instead of emitted
    pub(super) fn open_embedded(&mut self, owner: usize) -> Step<()> {
        if !self.options.rdfstar {
            return fail(Code::InvalidIdValue, "@id must be a string");
        }
        let (ctx, value_ctx) = {
            let frame = self.object(owner)?;
            (frame.ctx.clone(), frame.value_ctx.clone())
        };
        let collector = self.open_collector();
        let mut frame = self.new_object(
            Target::Id(owner),
            ctx,
            value_ctx,
            None,
            Sink::Embedded(collector),
        );
        frame.collector = Some(collector);
        self.push_object_frame(frame);
        Ok(())
    }

    /// The embedded node is complete: its single triple becomes the owner's subject
    pub(super) fn close_embedded(&mut self, owner: usize, embedded: &ObjectFrame) -> Step<()> {
        let Some(collector) = embedded.collector else {
            return Ok(());
        };
        let triples = self.collectors.remove(&collector).unwrap_or_default();
        let mut triples = triples.into_iter();
        let (Some(triple), None) = (triples.next(), triples.next()) else {
            return fail(
                Code::InvalidEmbeddedNode,
                "an embedded node must describe exactly one triple",
            );
        };
        self.resolve_subject(owner, Some(Term::Triple(Box::new(triple))))
    }

    /// `@annotation` entry of a property value
    pub(super) fn annotation_entry(&mut self, owner: usize, at: usize) -> Step<()> {
        if !self.options.rdfstar {
            warn!("ignoring @annotation with RDF-star disabled");
            self.set_pending(at, Target::Skip);
            return Ok(());
        }
        let frame = self.object(owner)?;
        let pt = match &frame.target {
            Target::Property(pt) if !pt.wraps_list() => pt.clone(),
            Target::ListItem(..) => {
                return fail(Code::InvalidAnnotation, "@annotation on a list item")
            }
            _ => {
                return fail(
                    Code::InvalidAnnotation,
                    "@annotation must be on a property value",
                )
            }
        };
        if pt.in_embedded() || frame.is_embedded() {
            return fail(Code::InvalidEmbeddedNode, "@annotation inside an embedded node");
        }
        let own = TermRef::Slot(frame.slot);
        let (subject, object) = if pt.reverse {
            (own, pt.subject.clone())
        } else {
            (pt.subject.clone(), own)
        };
        let annotation = AnnotationTarget {
            triple: TermRef::Triple(Box::new(TripleRef {
                subject,
                predicate: pt.predicate.clone(),
                object,
            })),
            graph: pt.graph.clone(),
            sink: pt.sink,
            value_ctx: pt.value_ctx.clone(),
            node_ctx: pt.node_ctx.clone(),
        };
        self.object_mut(owner)?.mark(Keyword::Annotation);
        self.set_pending(at, Target::Annotation(Arc::new(annotation)));
        Ok(())
    }

    /// An annotation object: a node whose subject is the annotated triple
    pub(super) fn open_annotation(&mut self, annotation: Arc<AnnotationTarget>) {
        let mut frame = self.new_object(
            Target::Annotation(annotation.clone()),
            annotation.node_ctx.clone(),
            annotation.value_ctx.clone(),
            annotation.graph.clone(),
            annotation.sink,
        );
        frame.subject = annotation.triple.clone();
        frame.kind = ObjectKind::Node;
        self.push_object_frame(frame);
    }
}
