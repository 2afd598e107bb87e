//! Text rendering for pathways and execution results.
pub mod report;

pub use report::{format_pathway, format_summary};
