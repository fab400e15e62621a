//! Quads waiting for subjects that are not known yet
//!
//! Every JSON object owns a slot. Quads mentioning a slot that is still open
//! are parked here under a sequence number and released, in sequence order,
//! as soon as all the slots they mention are settled. A slot settled to
//! nothing (invalid `@id`, `null` value) takes its quads with it.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::rdf::{GraphName, Quad, Term, Triple};

pub(crate) type NodeKey = u64;

/// Where a finished quad goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sink {
    Output,
    /// Triples of an embedded node, collected rather than asserted
    Embedded(u32),
}

/// A term, or a reference to the term an open object will settle to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TermRef {
    Ready(Term),
    Slot(NodeKey),
    /// Annotated triple whose parts may still be open
    Triple(Box<TripleRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TripleRef {
    pub subject: TermRef,
    pub predicate: Term,
    pub object: TermRef,
}

impl TermRef {
    fn collect_slots(&self, out: &mut Vec<NodeKey>) {
        match self {
            TermRef::Ready(_) => {}
            TermRef::Slot(k) => out.push(*k),
            TermRef::Triple(t) => {
                t.subject.collect_slots(out);
                t.object.collect_slots(out);
            }
        }
    }

    /// Replace `key`; `false` when the reference collapses to nothing
    fn substitute(&mut self, key: NodeKey, value: Option<&Term>) -> bool {
        match self {
            TermRef::Ready(_) => true,
            TermRef::Slot(k) if *k == key => match value {
                Some(term) => {
                    *self = TermRef::Ready(term.clone());
                    true
                }
                None => false,
            },
            TermRef::Slot(_) => true,
            TermRef::Triple(t) => {
                let ok = t.subject.substitute(key, value) && t.object.substitute(key, value);
                if ok {
                    if let (TermRef::Ready(s), TermRef::Ready(o)) = (&t.subject, &t.object) {
                        let triple = Triple::new(s.clone(), t.predicate.clone(), o.clone());
                        *self = TermRef::Ready(Term::Triple(Box::new(triple)));
                    }
                }
                ok
            }
        }
    }
}

/// Graph of a quad; `None` is the default graph
pub(crate) type GraphRef = Option<TermRef>;

/// A quad with possibly open parts
#[derive(Debug, Clone)]
pub(crate) struct PendingQuad {
    pub subject: TermRef,
    pub predicate: Term,
    pub object: TermRef,
    pub graph: GraphRef,
    pub sink: Sink,
}

impl PendingQuad {
    fn open_slots(&self) -> Vec<NodeKey> {
        let mut slots = Vec::new();
        self.subject.collect_slots(&mut slots);
        self.object.collect_slots(&mut slots);
        if let Some(g) = &self.graph {
            g.collect_slots(&mut slots);
        }
        slots
    }

    fn substitute(&mut self, key: NodeKey, value: Option<&Term>) -> bool {
        let graph_ok = match &mut self.graph {
            Some(g) => g.substitute(key, value),
            None => true,
        };
        graph_ok && self.subject.substitute(key, value) && self.object.substitute(key, value)
    }

    /// Assemble the final quad; `None` when a part is not a legal RDF position
    fn into_ready(self) -> Option<(Sink, Quad)> {
        let TermRef::Ready(subject) = self.subject else { return None };
        let TermRef::Ready(object) = self.object else { return None };
        let graph_name = match self.graph {
            None => GraphName::DefaultGraph,
            Some(TermRef::Ready(g)) => GraphName::from_term(g)?,
            Some(_) => return None,
        };
        if subject.is_literal() || self.predicate.is_literal() {
            return None;
        }
        Some((self.sink, Quad::new(subject, self.predicate, object, graph_name)))
    }
}

/// Slot bookkeeping for one parse
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    next_key: NodeKey,
    next_seq: u64,
    /// Settled slots still owned by an open object
    settled: FxHashMap<NodeKey, Option<Term>>,
    pending: BTreeMap<u64, PendingQuad>,
    waiting: FxHashMap<NodeKey, Vec<u64>>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_slot(&mut self) -> NodeKey {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    /// Number of parked quads
    #[cfg(test)]
    pub fn backlog(&self) -> usize {
        self.pending.len()
    }

    /// Register a quad; returns it when it can be emitted right away
    pub fn register(&mut self, mut quad: PendingQuad) -> Option<(Sink, Quad)> {
        // fold in slots that settled before this quad was built
        for key in quad.open_slots() {
            if let Some(value) = self.settled.get(&key) {
                if !quad.substitute(key, value.as_ref()) {
                    return None;
                }
            }
        }
        let open = quad.open_slots();
        if open.is_empty() {
            return quad.into_ready();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        for key in open {
            let list = self.waiting.entry(key).or_default();
            if list.last() != Some(&seq) {
                list.push(seq);
            }
        }
        self.pending.insert(seq, quad);
        None
    }

    /// Settle `key`; quads that became complete are returned in registration order
    pub fn settle(&mut self, key: NodeKey, value: Option<Term>) -> Vec<(Sink, Quad)> {
        let mut ready = Vec::new();
        if let Some(seqs) = self.waiting.remove(&key) {
            for seq in seqs {
                let Some(quad) = self.pending.get_mut(&seq) else { continue };
                if !quad.substitute(key, value.as_ref()) {
                    self.pending.remove(&seq);
                    continue;
                }
                if quad.open_slots().is_empty() {
                    if let Some(quad) = self.pending.remove(&seq) {
                        ready.push((seq, quad));
                    }
                }
            }
        }
        self.settled.insert(key, value);
        ready.sort_by_key(|(seq, _)| *seq);
        ready
            .into_iter()
            .filter_map(|(_, quad)| quad.into_ready())
            .collect()
    }

    pub fn resolved(&self, key: NodeKey) -> Option<&Term> {
        self.settled.get(&key).and_then(|v| v.as_ref())
    }

    /// Forget a settled slot once its owner is gone
    pub fn release(&mut self, key: NodeKey) {
        self.settled.remove(&key);
    }
}
