//! batch.rs
//! Runs one target across many slabs in parallel.
//!
//! Each slab gets its own engine and so its own cache. Only the graph and
//! the registry are shared, both read-only.

use crate::compute::{ExecutionResults, SlabEngine};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::graph::ParameterGraph;
use crate::slab::Slab;
use crate::store::MethodRegistry;
use rayon::prelude::*;
use tracing::debug;

/// Results are returned in the order of `slabs`.
pub fn execute_many(
    graph: &ParameterGraph,
    registry: &MethodRegistry,
    config: &EngineConfig,
    slabs: &[Slab],
    target: &str,
) -> Result<Vec<ExecutionResults>, EngineError> {
    config.validate(graph)?;
    // Applied once here so each engine borrows instead of cloning.
    let registry = config.apply(registry);
    debug!(slabs = slabs.len(), parameter = target, "batch execution");
    slabs
        .par_iter()
        .map(|slab| SlabEngine::with_config(graph, &registry, config.clone())?.execute_all(slab, target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::definitions::{self as names, authored_graph};
    use crate::slab::Layer;

    fn slab(density: f64) -> Slab {
        Slab::new(
            vec![Layer::new().with_thickness(20.0).with_grain_form("RG").with_measured_density(density)],
            30.0,
        )
    }

    #[test]
    fn test_matches_sequential_runs() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let slabs: Vec<Slab> = [180.0, 240.0, 320.0].into_iter().map(slab).collect();

        let batch = execute_many(&g, &r, &EngineConfig::default(), &slabs, names::ELASTIC_MODULUS).unwrap();
        assert_eq!(batch.len(), 3);
        for (slab, parallel) in slabs.iter().zip(&batch) {
            let sequential = SlabEngine::new(&g, &r).execute_all(slab, names::ELASTIC_MODULUS).unwrap();
            assert_eq!(parallel.successful, sequential.successful);
            for (key, result) in &sequential.pathways {
                assert_eq!(parallel.pathways[key].target_values(), result.target_values());
            }
        }
    }

    #[test]
    fn test_shear_correction_applies_to_batch() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let config = EngineConfig { default_shear_correction: 1.0, ..EngineConfig::default() };
        let slabs = vec![slab(250.0)];

        let batch = execute_many(&g, &r, &config, &slabs, names::A55).unwrap();
        let expected = SlabEngine::new(&g, &config.registry()).execute_all(&slabs[0], names::A55).unwrap();
        let plain = SlabEngine::new(&g, &r).execute_all(&slabs[0], names::A55).unwrap();
        for (key, result) in &expected.pathways {
            assert_eq!(batch[0].pathways[key].target_values(), result.target_values());
            if result.success {
                assert_ne!(plain.pathways[key].target_values(), result.target_values());
            }
        }
        assert!(expected.successful > 0);
    }

    #[test]
    fn test_unknown_target_fails_batch() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let err = execute_many(&g, &r, &EngineConfig::default(), &[slab(200.0)], "nope").unwrap_err();
        assert_eq!(err, EngineError::UnknownParameter("nope".into()));
    }
}
