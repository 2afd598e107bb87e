//! Defines the core data structures for the parameter dependency graph.
pub mod builder;
pub mod dag;
pub mod definitions;
pub mod node;

// Re-export key types for convenient access
pub use builder::{GraphBuilder, NodeHandle};
pub use dag::ParameterGraph;
pub use node::{Edge, EdgeId, Node, NodeId, NodeKind, DATA_FLOW};
