//! engine.rs
//! Runs every pathway to a target against one slab, sharing one cache.

use super::cache::{CacheStats, ComputationCache};
use super::executor::{self, PathwayExecutor};
use super::trace::{ExecutionResults, PathwayResult};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::graph::{ParameterGraph, DATA_FLOW};
use crate::pathways::{Parameterization, PathwayEnumerator};
use crate::slab::Slab;
use crate::store::MethodRegistry;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Orchestrates enumeration and execution for one slab at a time.
///
/// The cache belongs to the slab the engine was last run against. Call
/// [`SlabEngine::reset_cache`] before handing the engine a different slab;
/// the engine never clears it on its own.
///
/// An engine built [`with_config`](SlabEngine::with_config) runs against the
/// registry with the configuration's defaults applied, cloning it only when
/// they differ.
pub struct SlabEngine<'a> {
    graph: &'a ParameterGraph,
    registry: Cow<'a, MethodRegistry>,
    config: EngineConfig,
    cache: ComputationCache,
}

impl<'a> SlabEngine<'a> {
    pub fn new(graph: &'a ParameterGraph, registry: &'a MethodRegistry) -> Self {
        Self { graph, registry: Cow::Borrowed(registry), config: EngineConfig::default(), cache: ComputationCache::new() }
    }

    pub fn with_config(
        graph: &'a ParameterGraph,
        registry: &'a MethodRegistry,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate(graph)?;
        let registry = config.apply(registry);
        Ok(Self { graph, registry, config, cache: ComputationCache::new() })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Every distinct pathway to `target` that passes the method filter.
    pub fn list_available_pathways(&self, target: &str) -> Result<Vec<Parameterization>, EngineError> {
        let mut found = PathwayEnumerator::new(self.graph).find_parameterizations(target)?;
        found.retain(|p| self.config.allows(&p.method_map()));
        Ok(found)
    }

    /// Executes every available pathway to `target` against `slab`.
    pub fn execute_all(&mut self, slab: &Slab, target: &str) -> Result<ExecutionResults, EngineError> {
        let pathways = self.list_available_pathways(target)?;
        let executor = PathwayExecutor::new(self.graph, &self.registry).with_cache(self.config.cache_enabled);

        let runs = pathways
            .iter()
            .map(|pathway| (executor.execute(pathway, slab, &mut self.cache), pathway.fingerprint()))
            .collect();
        let results = keyed_by_description(runs);

        let successful = results.values().filter(|r| r.success).count();
        let cache = self.cache.stats();
        info!(
            parameter = target,
            total = results.len(),
            successful,
            failed = results.len() - successful,
            hit_rate = cache.hit_rate,
            "executed all pathways"
        );
        Ok(ExecutionResults {
            target: target.to_string(),
            total: results.len(),
            successful,
            failed: results.len() - successful,
            pathways: results,
            cache,
        })
    }

    /// Executes the one pathway to `target` whose method choices equal
    /// `methods`. Pure data-flow choices may be omitted.
    pub fn execute_single(
        &mut self,
        slab: &Slab,
        target: &str,
        methods: &BTreeMap<String, String>,
    ) -> Result<PathwayResult, EngineError> {
        for (parameter, method) in methods {
            if self.graph.get_node(parameter).is_none() {
                return Err(EngineError::UnknownParameter(parameter.clone()));
            }
            if !self.graph.methods_into(parameter).contains(method) {
                return Err(EngineError::UnknownMethod { parameter: parameter.clone(), method: method.clone() });
            }
        }

        let wanted = without_data_flow(methods);
        let pathway = self
            .list_available_pathways(target)?
            .into_iter()
            .find(|p| without_data_flow(&p.method_map()) == wanted)
            .ok_or_else(|| EngineError::PathwayNotFound { target: target.to_string() })?;

        let executor = PathwayExecutor::new(self.graph, &self.registry).with_cache(self.config.cache_enabled);
        Ok(executor.execute(&pathway, slab, &mut self.cache))
    }

    /// The human-readable name `execute_all` keys a pathway by.
    pub fn describe(&self, pathway: &Parameterization) -> String {
        executor::describe(self.graph, &self.registry, &pathway.method_map())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &ComputationCache {
        &self.cache
    }

    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }
}

/// Keys results by description. Every result sharing a description with
/// another gets its fingerprint appended, so no key is ambiguous.
fn keyed_by_description(runs: Vec<(PathwayResult, String)>) -> BTreeMap<String, PathwayResult> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (result, _) in &runs {
        *seen.entry(result.description.clone()).or_default() += 1;
    }
    runs.into_iter()
        .map(|(mut result, fingerprint)| {
            if seen[&result.description] > 1 {
                result.description = format!("{} [{}]", result.description, fingerprint);
            }
            (result.description.clone(), result)
        })
        .collect()
}

fn without_data_flow(methods: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
    methods
        .iter()
        .filter(|(_, m)| m.as_str() != DATA_FLOW)
        .map(|(p, m)| (p.as_str(), m.as_str()))
        .collect()
}
