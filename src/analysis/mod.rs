//! Static analysis of the parameter graph.
pub mod topology;
