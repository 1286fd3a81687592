//! `NodeId` — stable identity for every AST node (expression, pattern, type
//! expression, declaration).
//!
//! Assigned by the external parser (see spec §6's parser contract). The core
//! never invents or mutates an existing id; lowering passes that synthesize
//! new nodes (tuple-parameter destructuring, §4.3) allocate ids strictly
//! greater than any pre-existing id via [`NodeIdAllocator`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Hands out ids for nodes synthesized during lowering, strictly above the
/// maximum id the parser produced.
#[derive(Debug, Clone)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    /// `max_existing` is the highest `NodeId` the parser assigned; synthesized
    /// ids start one above it.
    #[must_use]
    pub fn starting_after(max_existing: NodeId) -> Self {
        NodeIdAllocator { next: max_existing.0 + 1 }
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_ids_are_strictly_greater() {
        let mut alloc = NodeIdAllocator::starting_after(NodeId(41));
        assert_eq!(alloc.fresh(), NodeId(42));
        assert_eq!(alloc.fresh(), NodeId(43));
    }
}
