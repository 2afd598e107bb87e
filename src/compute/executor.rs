//! executor.rs
//! Runs one pathway against one slab.
//!
//! The caller's slab is never written. Each layer that a layer-scope method
//! touches is copied once; every other layer is shared by `Arc`.
//!
//! A parameter the pathway failed to compute on a layer stays absent for
//! the rest of that pathway, even where the layer carries a measured
//! fallback for it.

use super::cache::{ComputationCache, Outcome};
use super::trace::{ComputationTrace, PathwayResult};
use crate::analysis::topology;
use crate::error::ComputationError;
use crate::graph::ParameterGraph;
use crate::pathways::Parameterization;
use crate::slab::{Layer, Slab};
use crate::store::{CachePolicy, MethodRegistry, MethodSpec, Scope};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct PathwayExecutor<'a> {
    graph: &'a ParameterGraph,
    registry: &'a MethodRegistry,
    use_cache: bool,
}

impl<'a> PathwayExecutor<'a> {
    pub fn new(graph: &'a ParameterGraph, registry: &'a MethodRegistry) -> Self {
        Self { graph, registry, use_cache: true }
    }

    /// With `false`, root-safe methods are recomputed like everything else.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn execute(&self, pathway: &Parameterization, slab: &Slab, cache: &mut ComputationCache) -> PathwayResult {
        let target = pathway.target.name();
        let methods = pathway.method_map();
        let (layer_steps, slab_steps) = self.plan(&methods);
        let mut traces = Vec::new();

        let mut layers = Vec::with_capacity(slab.layers.len());
        let mut failed: Vec<Vec<&str>> = vec![Vec::new(); slab.layers.len()];
        for (index, original) in slab.layers.iter().enumerate() {
            if layer_steps.is_empty() {
                layers.push(Arc::clone(original));
                continue;
            }
            let mut working = Layer::clone(original);
            for spec in &layer_steps {
                let (outcome, cached) = match failed_upstream(spec, &failed[index]) {
                    Some(err) => (Err(err), false),
                    None => self.resolve_layer(spec, index, &working, cache),
                };
                working.set_calculated(&spec.parameter, outcome.as_ref().ok().copied());
                match outcome {
                    Ok(_) => cache.record_provenance(index, &spec.parameter, &spec.method),
                    Err(_) => failed[index].push(spec.parameter.as_str()),
                }
                traces.push(ComputationTrace {
                    parameter: spec.parameter.clone(),
                    method: spec.method.clone(),
                    layer: Some(index),
                    outcome,
                    cached,
                });
            }
            layers.push(Arc::new(working));
        }

        let mut rebuilt = slab.clone();
        rebuilt.layers = layers;

        for spec in &slab_steps {
            let (outcome, cached) = match self.unmet_prerequisite(spec, &rebuilt, &failed) {
                Some(err) => (Err(err), false),
                None => self.resolve_slab(spec, &rebuilt, cache),
            };
            rebuilt.set_calculated(&spec.parameter, outcome.as_ref().ok().copied());
            traces.push(ComputationTrace {
                parameter: spec.parameter.clone(),
                method: spec.method.clone(),
                layer: None,
                outcome,
                cached,
            });
        }

        let success = traces.iter().any(|t| t.parameter == target && t.succeeded());
        PathwayResult {
            description: describe(self.graph, self.registry, &methods),
            target: target.to_string(),
            methods,
            slab: rebuilt,
            traces,
            success,
        }
    }

    /// Registered methods of the mapping in topological order, split by
    /// scope. Pure data-flow parameters have no method and are skipped.
    fn plan(&self, methods: &BTreeMap<String, String>) -> (Vec<&'a MethodSpec>, Vec<&'a MethodSpec>) {
        let mut layer_steps = Vec::new();
        let mut slab_steps = Vec::new();
        for parameter in topology::order_names(self.graph, methods.keys().map(String::as_str)) {
            let Some(spec) = self.registry.lookup(parameter, &methods[parameter]) else {
                continue;
            };
            match spec.scope() {
                Scope::Layer => layer_steps.push(spec),
                Scope::Slab => slab_steps.push(spec),
            }
        }
        (layer_steps, slab_steps)
    }

    fn cacheable(&self, spec: &MethodSpec) -> bool {
        self.use_cache && spec.cache_policy == CachePolicy::RootSafe
    }

    fn resolve_layer(&self, spec: &MethodSpec, index: usize, layer: &Layer, cache: &mut ComputationCache) -> (Outcome, bool) {
        let cacheable = self.cacheable(spec);
        if cacheable {
            if let Some(hit) = cache.get_layer(index, &spec.parameter, &spec.method) {
                debug!(layer = index, parameter = %spec.parameter, method = %spec.method, "cache hit");
                return (hit, true);
            }
        }
        let outcome = self.registry.execute_spec(spec, layer);
        debug!(layer = index, parameter = %spec.parameter, method = %spec.method, ok = outcome.is_ok(), "computed");
        if cacheable {
            cache.insert_layer(index, &spec.parameter, &spec.method, outcome.clone());
        }
        (outcome, false)
    }

    fn resolve_slab(&self, spec: &MethodSpec, slab: &Slab, cache: &mut ComputationCache) -> (Outcome, bool) {
        let cacheable = self.cacheable(spec);
        if cacheable {
            if let Some(hit) = cache.get_slab(&spec.parameter, &spec.method) {
                debug!(parameter = %spec.parameter, method = %spec.method, "cache hit");
                return (hit, true);
            }
        }
        let outcome = self.registry.execute_slab_spec(spec, slab);
        debug!(parameter = %spec.parameter, method = %spec.method, ok = outcome.is_ok(), "computed");
        if cacheable {
            cache.insert_slab(&spec.parameter, &spec.method, outcome.clone());
        }
        (outcome, false)
    }

    /// The first layer lacking a required input of a slab-scope method.
    fn unmet_prerequisite(&self, spec: &MethodSpec, slab: &Slab, failed: &[Vec<&str>]) -> Option<ComputationError> {
        if slab.layers.is_empty() {
            return Some(ComputationError::PrerequisiteNotMet {
                parameter: spec.parameter.clone(),
                reason: "slab has no layers".into(),
            });
        }
        for (index, layer) in slab.layers.iter().enumerate() {
            let absent = |n: &&String| {
                failed[index].contains(&n.as_str()) || self.registry.resolve_input(spec, n, layer).is_none()
            };
            if let Some(name) = spec.required.iter().find(absent) {
                return Some(ComputationError::PrerequisiteNotMet {
                    parameter: spec.parameter.clone(),
                    reason: format!("layer {index} has no {name}"),
                });
            }
        }
        None
    }
}

/// Required inputs of `spec` that this pathway already failed to compute.
fn failed_upstream(spec: &MethodSpec, failed: &[&str]) -> Option<ComputationError> {
    let missing: Vec<String> = spec.required.iter().filter(|n| failed.contains(&n.as_str())).cloned().collect();
    (!missing.is_empty()).then_some(ComputationError::MissingInputs { missing })
}

/// Human-readable name of a method mapping: the registered choices in
/// topological order, e.g. `density:geldsetzer -> elastic_modulus:kochle`.
pub fn describe(graph: &ParameterGraph, registry: &MethodRegistry, methods: &BTreeMap<String, String>) -> String {
    let ordered = topology::order_names(graph, methods.keys().map(String::as_str));
    let mut parts: Vec<String> = ordered
        .iter()
        .filter(|p| registry.lookup(p, &methods[**p]).is_some())
        .map(|p| format!("{p}:{}", methods[*p]))
        .collect();
    if parts.is_empty() {
        parts = ordered.iter().map(|p| format!("{p}:{}", methods[*p])).collect();
    }
    parts.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::definitions::{self as names, authored_graph};
    use crate::pathways::PathwayEnumerator;
    use crate::value::UValue;

    pub(crate) fn sample_slab() -> Slab {
        Slab::new(
            vec![
                Layer::new()
                    .with_thickness(20.0)
                    .with_hand_hardness("4F")
                    .with_grain_form("RG")
                    .with_grain_size(1.0)
                    .with_measured_density(250.0),
                Layer::new()
                    .with_thickness(30.0)
                    .with_hand_hardness("1F")
                    .with_grain_form("FC")
                    .with_grain_size(1.5)
                    .with_measured_density(300.0),
            ],
            38.0,
        )
    }

    fn pathway(graph: &ParameterGraph, target: &str, choices: &[(&str, &str)]) -> Parameterization {
        PathwayEnumerator::new(graph)
            .find_parameterizations(target)
            .unwrap()
            .into_iter()
            .find(|p| {
                let map = p.method_map();
                choices.iter().all(|(param, method)| map.get(*param).map(String::as_str) == Some(*method))
            })
            .unwrap()
    }

    #[test]
    fn test_layer_pathway_writes_copies_only() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let slab = sample_slab();
        let before = slab.clone();
        let p = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "geldsetzer"), (names::ELASTIC_MODULUS, "kochle")]);

        let mut cache = ComputationCache::new();
        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut cache);

        assert!(result.success);
        assert_eq!(slab, before);
        assert!(slab.layers[0].elastic_modulus.is_none());
        let top = &result.slab.layers[0];
        assert_eq!(top.density_calculated.unwrap().nominal, 175.0);
        assert!(top.elastic_modulus.unwrap().nominal > 0.0);
        assert!(!Arc::ptr_eq(&slab.layers[0], &result.slab.layers[0]));
        assert_eq!(cache.provenance(1, names::DENSITY), Some("geldsetzer"));
        // density then elastic modulus, per layer
        assert_eq!(result.traces.len(), 4);
        assert_eq!(result.traces[0].parameter, names::DENSITY);
        assert_eq!(result.traces[1].parameter, names::ELASTIC_MODULUS);
        assert_eq!(result.description, "density:geldsetzer -> elastic_modulus:kochle");
    }

    #[test]
    fn test_untouched_layers_are_shared() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let slab = sample_slab();
        let p = pathway(&g, names::GRAIN_FORM, &[]);
        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut ComputationCache::new());

        assert!(result.traces.is_empty());
        assert!(!result.success);
        for (a, b) in slab.layers.iter().zip(&result.slab.layers) {
            assert!(Arc::ptr_eq(a, b));
        }
        assert_eq!(result.description, "grain_form:data_flow");
    }

    #[test]
    fn test_failure_clears_prepopulated_field() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let mut layer = Layer::new().with_thickness(10.0).with_grain_form("PP").with_measured_density(200.0);
        layer.elastic_modulus = Some(UValue::exact(99.0));
        let slab = Slab::new(vec![layer], 30.0);
        // Köchle is not fitted for precipitation particles.
        let p = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "data_flow"), (names::ELASTIC_MODULUS, "kochle")]);

        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut ComputationCache::new());
        assert!(!result.success);
        assert!(result.slab.layers[0].elastic_modulus.is_none());
        assert_eq!(slab.layers[0].elastic_modulus, Some(UValue::exact(99.0)));
        assert!(matches!(result.traces[1].outcome, Err(ComputationError::MissingInputs { .. })));
    }

    #[test]
    fn test_failed_density_blocks_measured_fallback() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        // Geldsetzer has no fit for surface hoar, but a measured density exists.
        let slab = Slab::new(
            vec![Layer::new().with_thickness(10.0).with_hand_hardness("4F").with_grain_form("SH").with_measured_density(250.0)],
            30.0,
        );
        let p = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "geldsetzer"), (names::ELASTIC_MODULUS, "wautier")]);

        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut ComputationCache::new());
        assert!(!result.success);
        assert!(result.traces[0].outcome.is_err());
        assert_eq!(result.traces[1].parameter, names::ELASTIC_MODULUS);
        assert_eq!(
            result.traces[1].outcome,
            Err(ComputationError::MissingInputs { missing: vec![names::DENSITY.to_string()] })
        );
        assert!(result.slab.layers[0].elastic_modulus.is_none());

        // The measured value still feeds a pathway that chose it.
        let measured = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "data_flow"), (names::ELASTIC_MODULUS, "wautier")]);
        assert!(PathwayExecutor::new(&g, &r).execute(&measured, &slab, &mut ComputationCache::new()).success);
    }

    #[test]
    fn test_slab_prerequisite_names_offending_layer() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let mut slab = sample_slab();
        Arc::make_mut(&mut slab.layers[1]).thickness = None;
        let p = pathway(&g, names::D11, &[(names::DENSITY, "data_flow"), (names::POISSONS_RATIO, "kochle")]);

        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut ComputationCache::new());
        assert!(!result.success);
        let last = result.traces.last().unwrap();
        assert_eq!(last.parameter, names::D11);
        assert_eq!(last.layer, None);
        assert_eq!(
            last.outcome,
            Err(ComputationError::PrerequisiteNotMet {
                parameter: names::D11.into(),
                reason: "layer 1 has no layer_thickness".into(),
            })
        );
    }

    #[test]
    fn test_root_safe_density_hits_cache() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let slab = sample_slab();
        let executor = PathwayExecutor::new(&g, &r);
        let mut cache = ComputationCache::new();
        let a = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "geldsetzer"), (names::ELASTIC_MODULUS, "bergfeld")]);
        let b = pathway(&g, names::ELASTIC_MODULUS, &[(names::DENSITY, "geldsetzer"), (names::ELASTIC_MODULUS, "wautier")]);

        let first = executor.execute(&a, &slab, &mut cache);
        let second = executor.execute(&b, &slab, &mut cache);
        assert!(first.traces.iter().all(|t| !t.cached));
        let density_hits: Vec<_> = second.traces.iter().filter(|t| t.parameter == names::DENSITY).collect();
        assert_eq!(density_hits.len(), 2);
        assert!(density_hits.iter().all(|t| t.cached));
        // Downstream of density is always recomputed.
        assert!(second.traces.iter().filter(|t| t.parameter == names::ELASTIC_MODULUS).all(|t| !t.cached));
        assert_eq!(cache.stats().hits, 2);

        let uncached = PathwayExecutor::new(&g, &r).with_cache(false);
        let mut fresh = ComputationCache::new();
        uncached.execute(&a, &slab, &mut fresh);
        assert_eq!(fresh.stats().hits + fresh.stats().misses, 0);
    }

    #[test]
    fn test_full_plate_pathway() {
        let g = authored_graph();
        let r = MethodRegistry::with_defaults();
        let slab = sample_slab();
        let p = pathway(&g, names::D11, &[(names::DENSITY, "data_flow"), (names::ELASTIC_MODULUS, "wautier"), (names::POISSONS_RATIO, "kochle")]);
        let result = PathwayExecutor::new(&g, &r).execute(&p, &slab, &mut ComputationCache::new());

        assert!(result.success, "{:#?}", result.traces);
        let d11 = result.slab.d11.unwrap();
        assert!(d11.nominal > 0.0);
        assert_eq!(result.target_values(), vec![d11]);
        assert!(slab.d11.is_none());
    }
}
