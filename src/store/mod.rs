//! The method registry: which formulas compute which parameter, and how
//! their inputs are resolved from a layer.
pub mod registry;
pub mod types;

pub use registry::MethodRegistry;
pub use types::{CachePolicy, Formula, InputValue, LayerFn, MethodInputs, MethodSpec, Scope, SlabFn};
