//! Blank node allocation

use rustc_hash::FxHashMap;

use crate::rdf::BlankNode;

/// Hands out blank nodes for one parse.
///
/// Every label in the output is generated here: explicit `_:x` labels are
/// mapped to fresh identifiers on first use, so they cannot clash with
/// generated ones, and the per-parse prefix keeps two parses apart.
#[derive(Debug)]
pub(crate) struct BlankNodeAllocator {
    prefix: String,
    counter: u64,
    labels: FxHashMap<String, BlankNode>,
}

impl BlankNodeAllocator {
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = match prefix {
            Some(p) => sanitize(p),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                format!("b{}_", &id[..12])
            }
        };
        Self {
            prefix,
            counter: 0,
            labels: FxHashMap::default(),
        }
    }

    pub fn fresh(&mut self) -> BlankNode {
        let node = BlankNode::new_unchecked(format!("{}{}", self.prefix, self.counter));
        self.counter += 1;
        node
    }

    /// The node standing for an explicit label (without the `_:`)
    pub fn labeled(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.labels.get(label) {
            return node.clone();
        }
        let node = self.fresh();
        self.labels.insert(label.to_owned(), node.clone());
        node
    }
}

/// Keep a user prefix within the N-Triples blank node label grammar
fn sanitize(prefix: &str) -> String {
    let mut out: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        out.insert(0, 'b');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let mut alloc = BlankNodeAllocator::new(Some("t"));
        let a = alloc.labeled("a");
        let fresh = alloc.fresh();
        assert_eq!(alloc.labeled("a"), a);
        assert_ne!(a, fresh);
        assert_eq!(a.as_str(), "t0");
        assert_eq!(fresh.as_str(), "t1");
    }

    #[test]
    fn test_parses_do_not_collide() {
        let mut first = BlankNodeAllocator::new(None);
        let mut second = BlankNodeAllocator::new(None);
        assert_ne!(first.fresh(), second.fresh());
    }

    #[test]
    fn test_prefix_sanitized() {
        let mut alloc = BlankNodeAllocator::new(Some("-x y"));
        assert_eq!(alloc.fresh().as_str(), "b-xy0");
        assert!(BlankNode::new(alloc.fresh().as_str()).is_ok());
    }
}
