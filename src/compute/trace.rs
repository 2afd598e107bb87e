//! trace.rs
//! Records of what a pathway run attempted and what it produced.

use super::cache::{CacheStats, Outcome};
use crate::slab::Slab;
use crate::value::UValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// One attempted computation. `layer` is `None` for slab-scope parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationTrace {
    pub parameter: String,
    pub method: String,
    pub layer: Option<usize>,
    pub outcome: Outcome,
    pub cached: bool,
}

impl ComputationTrace {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// The outcome of running one pathway against one slab.
///
/// `slab` is the rebuilt slab; layers the pathway never touched are shared
/// with the caller's slab, which itself is left unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct PathwayResult {
    pub description: String,
    pub target: String,
    pub methods: BTreeMap<String, String>,
    pub slab: Slab,
    pub traces: Vec<ComputationTrace>,
    pub success: bool,
}

impl PathwayResult {
    /// Successful outputs for the target, in trace order.
    pub fn target_values(&self) -> Vec<UValue> {
        self.traces
            .iter()
            .filter(|t| t.parameter == self.target)
            .filter_map(|t| t.outcome.as_ref().ok().copied())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComputationTrace> + '_ {
        self.traces.iter().filter(|t| !t.succeeded())
    }
}

/// Every pathway run for one target, keyed by pathway description.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResults {
    pub target: String,
    pub pathways: BTreeMap<String, PathwayResult>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub cache: CacheStats,
}

impl ExecutionResults {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn successful_pathways(&self) -> impl Iterator<Item = (&String, &PathwayResult)> + '_ {
        self.pathways.iter().filter(|(_, r)| r.success)
    }
}
