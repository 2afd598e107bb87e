//! tree.rs
//! Backward traversal trees. A tree rooted at a node records exactly one way
//! of producing that node from the graph root.

use crate::graph::{EdgeId, NodeId};
use smallvec::SmallVec;
use std::rc::Rc;

/// One way of producing `node`.
///
/// A parameter node has exactly one child (the alternative chosen). A merge
/// node has one child per incoming edge. The root has none. Subtrees are
/// shared between trees through `Rc`, so the memo never deep-copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTree {
    pub node: NodeId,
    pub children: SmallVec<[(Rc<PathTree>, EdgeId); 2]>,
    pub is_merge: bool,
}

impl PathTree {
    pub fn leaf(node: NodeId) -> Self {
        Self { node, children: SmallVec::new(), is_merge: false }
    }

    /// A parameter node reached from `child` over `edge`.
    pub fn single(node: NodeId, child: Rc<PathTree>, edge: EdgeId) -> Self {
        let mut children = SmallVec::new();
        children.push((child, edge));
        Self { node, children, is_merge: false }
    }

    /// A merge node joining one subtree per incoming edge.
    pub fn joined(node: NodeId, legs: impl IntoIterator<Item = (Rc<PathTree>, EdgeId)>) -> Self {
        Self { node, children: legs.into_iter().collect(), is_merge: true }
    }

    /// Number of nodes in the tree, counting shared subtrees once per use.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|(c, _)| c.size()).sum::<usize>()
    }
}
