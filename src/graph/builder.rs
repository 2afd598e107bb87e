//! Incremental, name-keyed graph construction.

use super::dag::ParameterGraph;
use super::node::{Edge, Node, NodeKind};
use crate::error::EngineError;
use std::collections::HashMap;

/// Handle to a node declared on a [`GraphBuilder`].
///
/// Declaring the same name twice yields the same handle, so handle equality
/// is name identity within one builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// Collects nodes and edges, validating everything at [`GraphBuilder::build`].
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    root: String,
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeHandle>,
    edges: Vec<Edge>,
    conflicts: Vec<String>,
}

impl GraphBuilder {
    pub fn new(root: &str) -> Self {
        let mut b = Self {
            root: root.to_string(),
            nodes: Vec::new(),
            by_name: HashMap::new(),
            edges: Vec::new(),
            conflicts: Vec::new(),
        };
        b.declare(NodeKind::Parameter, root);
        b
    }

    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    pub fn param(&mut self, name: &str) -> NodeHandle {
        self.declare(NodeKind::Parameter, name)
    }

    pub fn merge(&mut self, name: &str) -> NodeHandle {
        self.declare(NodeKind::Merge, name)
    }

    fn declare(&mut self, kind: NodeKind, name: &str) -> NodeHandle {
        if let Some(&handle) = self.by_name.get(name) {
            let existing = self.nodes[handle.0].kind();
            if existing != kind {
                self.conflicts.push(format!("node '{name}' declared as both {existing:?} and {kind:?}"));
            }
            return handle;
        }
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(Node::new(kind, name));
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    pub fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle.0]
    }

    /// Plain data flow from `from` to `to`.
    pub fn flow(&mut self, from: NodeHandle, to: NodeHandle) -> &mut Self {
        let edge = Edge::data_flow(self.nodes[from.0].name(), self.nodes[to.0].name());
        self.push_edge(edge)
    }

    /// One alternative calculation method producing `to` from `from`.
    pub fn method(&mut self, from: NodeHandle, to: NodeHandle, method: &str) -> &mut Self {
        let edge = Edge::method(self.nodes[from.0].name(), self.nodes[to.0].name(), method);
        self.push_edge(edge)
    }

    fn push_edge(&mut self, edge: Edge) -> &mut Self {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        self
    }

    pub fn build(self) -> Result<ParameterGraph, EngineError> {
        if let Some(conflict) = self.conflicts.into_iter().next() {
            return Err(EngineError::GraphConsistency(conflict));
        }
        ParameterGraph::from_parts(&self.root, self.nodes, self.edges)
    }
}
