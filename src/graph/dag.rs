//! dag.rs
//! Wraps a petgraph `DiGraph` with name lookup, idempotent insertion and
//! construction-time consistency and acyclicity checks.

use super::node::{Edge, EdgeId, Node, NodeId};
use crate::analysis::topology;
use crate::error::EngineError;
use petgraph::algo::has_path_connecting;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// The parameter dependency graph.
///
/// Edges point from input to output (`measured_density -> density`). The
/// graph is always acyclic: construction and `add_edge` reject cycles, and
/// the topological order is kept current.
#[derive(Debug, Clone)]
pub struct ParameterGraph {
    graph: DiGraph<Node, Option<String>>,
    by_name: HashMap<String, NodeId>,
    root: NodeId,
    order: Vec<NodeId>,
    // Position of each node in `order`, indexed by node index.
    rank: Vec<usize>,
}

impl ParameterGraph {
    /// A graph holding only its root parameter.
    pub fn new(root: &str) -> Result<Self, EngineError> {
        let mut g = Self {
            graph: DiGraph::new(),
            by_name: HashMap::new(),
            root: NodeId::new(0),
            order: Vec::new(),
            rank: Vec::new(),
        };
        g.root = g.add_node(Node::parameter(root))?;
        Ok(g)
    }

    /// Builds a graph from a node set and an edge set.
    ///
    /// Every edge endpoint must be in `nodes` (or be the root), otherwise the
    /// graph is rejected with `GraphConsistency`. A cycle is rejected with
    /// `CycleDetected`.
    pub fn from_parts(root: &str, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, EngineError> {
        let mut g = Self::new(root)?;
        for node in nodes {
            g.insert_node(node)?;
        }
        for edge in edges {
            let (source, target) = g.endpoints(&edge)?;
            if !g.has_edge(source, target, edge.method.as_deref()) {
                g.graph.add_edge(source, target, edge.method);
            }
        }
        let order = topology::sort(&g)?;
        g.set_order(order);
        Ok(g)
    }

    /// Adds a node, or returns the existing node of the same name.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, EngineError> {
        let known = self.by_name.contains_key(node.name());
        let id = self.insert_node(node)?;
        if !known {
            // An isolated node is valid anywhere in a topological order.
            self.rank.push(self.order.len());
            self.order.push(id);
        }
        Ok(id)
    }

    /// Adds an edge between two existing nodes. Adding the same
    /// `(source, target, method)` twice is a no-op.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, EngineError> {
        let (source, target) = self.endpoints(&edge)?;
        if let Some(existing) = self
            .graph
            .edges_connecting(source, target)
            .find(|e| e.weight().as_deref() == edge.method.as_deref())
        {
            return Ok(existing.id());
        }
        if source == target || has_path_connecting(&self.graph, target, source, None) {
            return Err(EngineError::CycleDetected(edge.source));
        }
        let id = self.graph.add_edge(source, target, edge.method);
        let order = topology::sort(self)?;
        self.set_order(order);
        Ok(id)
    }

    fn insert_node(&mut self, node: Node) -> Result<NodeId, EngineError> {
        if node.name().is_empty() {
            return Err(EngineError::GraphConsistency("node names must be non-empty".into()));
        }
        if let Some(&id) = self.by_name.get(node.name()) {
            let existing = &self.graph[id];
            if existing.kind() != node.kind() {
                return Err(EngineError::GraphConsistency(format!(
                    "node '{}' already exists as {:?}, cannot redeclare as {:?}",
                    node.name(),
                    existing.kind(),
                    node.kind()
                )));
            }
            return Ok(id);
        }
        let name = node.name().to_string();
        let id = self.graph.add_node(node);
        self.by_name.insert(name, id);
        Ok(id)
    }

    fn set_order(&mut self, order: Vec<NodeId>) {
        self.rank = vec![0; self.graph.node_count()];
        for (pos, id) in order.iter().enumerate() {
            self.rank[id.index()] = pos;
        }
        self.order = order;
    }

    fn endpoints(&self, edge: &Edge) -> Result<(NodeId, NodeId), EngineError> {
        let lookup = |name: &str| {
            self.node_id(name).ok_or_else(|| {
                EngineError::GraphConsistency(format!(
                    "edge '{}' -> '{}' references unknown node '{}'",
                    edge.source, edge.target, name
                ))
            })
        };
        Ok((lookup(&edge.source)?, lookup(&edge.target)?))
    }

    fn has_edge(&self, source: NodeId, target: NodeId, method: Option<&str>) -> bool {
        self.graph
            .edges_connecting(source, target)
            .any(|e| e.weight().as_deref() == method)
    }

    // --- Accessors ---

    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.node_id(name).map(|id| &self.graph[id])
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.graph[id]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.graph[self.root]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Incoming edges of `id` as `(edge, source)`, in insertion order.
    pub fn incoming(&self, id: NodeId) -> Vec<(EdgeId, NodeId)> {
        self.adjacent(id, Direction::Incoming)
    }

    /// Outgoing edges of `id` as `(edge, target)`, in insertion order.
    pub fn outgoing(&self, id: NodeId) -> Vec<(EdgeId, NodeId)> {
        self.adjacent(id, Direction::Outgoing)
    }

    fn adjacent(&self, id: NodeId, dir: Direction) -> Vec<(EdgeId, NodeId)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(id, dir)
            .map(|e| match dir {
                Direction::Incoming => (e.id(), e.source()),
                Direction::Outgoing => (e.id(), e.target()),
            })
            .collect();
        // petgraph walks adjacency newest-first.
        edges.sort_by_key(|(e, _)| *e);
        edges
    }

    /// The method carried by an edge, `None` for data flow.
    pub fn edge_method(&self, id: EdgeId) -> Option<&str> {
        self.graph[id].as_deref()
    }

    /// All edges by endpoint names, in insertion order.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|e| Edge {
                source: self.graph[e.source()].name().to_string(),
                target: self.graph[e.target()].name().to_string(),
                method: e.weight().clone(),
            })
            .collect()
    }

    /// Distinct method names on edges into parameter `name`.
    pub fn methods_into(&self, name: &str) -> Vec<String> {
        let Some(id) = self.node_id(name) else { return Vec::new() };
        let mut methods: Vec<String> = Vec::new();
        for (edge, _) in self.incoming(id) {
            let label = self.edge_method(edge).unwrap_or(super::node::DATA_FLOW).to_string();
            if !methods.contains(&label) {
                methods.push(label);
            }
        }
        methods
    }

    /// Nodes with every input before its consumers.
    pub fn topological_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Position of `id` in [`Self::topological_order`].
    pub fn topological_rank(&self, id: NodeId) -> Option<usize> {
        self.rank.get(id.index()).copied()
    }
}
