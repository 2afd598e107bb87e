//! Defines the `Node` and `Edge` types of the parameter dependency graph.

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, stable identifier for a node within the graph.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation.
pub type NodeId = NodeIndex;

/// Identifier of an edge; doubles as its insertion order.
pub type EdgeId = EdgeIndex;

/// Name of the pseudo-method used for plain data flow.
pub const DATA_FLOW: &str = "data_flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A named quantity, measured or calculated. Incoming edges are alternatives.
    Parameter,
    /// "All of these inputs together feed one method." Incoming edges are all required.
    Merge,
}

/// A graph node, value-equal and hashable by `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    name: String,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into() }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Parameter, name)
    }

    pub fn merge(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Merge, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_merge(&self) -> bool {
        self.kind == NodeKind::Merge
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Parameter => f.write_str(&self.name),
            NodeKind::Merge => write!(f, "<{}>", self.name),
        }
    }
}

/// A directed edge described by endpoint names.
///
/// `method = None` is pure data flow; `Some(name)` is one alternative
/// calculation method producing `target` from `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub method: Option<String>,
}

impl Edge {
    pub fn data_flow(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into(), method: None }
    }

    pub fn method(source: impl Into<String>, target: impl Into<String>, method: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into(), method: Some(method.into()) }
    }

    /// The method name, or `data_flow` for plain data flow.
    pub fn label(&self) -> &str {
        self.method.as_deref().unwrap_or(DATA_FLOW)
    }
}
