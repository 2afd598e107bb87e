//! Pathway execution: the per-slab cache, the single-pathway executor and
//! the engine that runs every pathway to a target.
pub mod cache;
pub mod engine;
pub mod executor;
pub mod trace;

pub use cache::{CacheStats, ComputationCache, Outcome};
pub use engine::SlabEngine;
pub use executor::PathwayExecutor;
pub use trace::{ComputationTrace, ExecutionResults, PathwayResult};
