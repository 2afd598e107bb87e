//! Mechanical parameters of layered snow slabs.
//!
//! A hand-authored graph links measured layer properties to calculated ones
//! through alternative empirical methods. [`pathways::PathwayEnumerator`]
//! lists every distinct way to reach a target parameter;
//! [`compute::SlabEngine`] runs them against a [`slab::Slab`], sharing a
//! per-slab cache and never mutating the caller's data.
//!
//! ```no_run
//! use slab_mechparams_core::prelude::*;
//!
//! let graph = authored_graph();
//! let registry = MethodRegistry::with_defaults();
//! let slab = Slab::new(
//!     vec![Layer::new().with_thickness(20.0).with_hand_hardness("4F").with_grain_form("RG")],
//!     38.0,
//! );
//! let mut engine = SlabEngine::new(&graph, &registry);
//! let results = engine.execute_all(&slab, names::D11)?;
//! println!("{}", format_summary(&results));
//! # Ok::<(), EngineError>(())
//! ```

pub mod analysis;
pub mod batch;
pub mod compute;
pub mod config;
pub mod display;
pub mod error;
pub mod graph;
pub mod methods;
pub mod pathways;
pub mod slab;
pub mod store;
pub mod value;

pub mod prelude {
    pub use crate::batch::execute_many;
    pub use crate::compute::{ExecutionResults, PathwayResult, SlabEngine};
    pub use crate::config::EngineConfig;
    pub use crate::display::{format_pathway, format_summary};
    pub use crate::error::{ComputationError, EngineError};
    pub use crate::graph::definitions::{self as names, authored_graph};
    pub use crate::graph::ParameterGraph;
    pub use crate::pathways::{Parameterization, PathwayEnumerator};
    pub use crate::slab::{Layer, Slab, SnowPit};
    pub use crate::store::MethodRegistry;
    pub use crate::value::UValue;
}
