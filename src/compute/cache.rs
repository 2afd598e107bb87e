//! cache.rs
//! Per-slab memo of computation outcomes, shared across every pathway run
//! against the same slab.

use crate::error::ComputationError;
use crate::value::UValue;
use serde::Serialize;
use std::collections::HashMap;

pub type Outcome = Result<UValue, ComputationError>;

type LayerKey = (usize, String, String);
type SlabKey = (String, String);

/// Layer-scope and slab-scope outcomes keyed by method, plus the method that
/// last produced each `(layer, parameter)`.
///
/// Only root-safe methods are ever stored. The cache is bound to one slab
/// and is only emptied by [`ComputationCache::clear`].
#[derive(Debug, Clone, Default)]
pub struct ComputationCache {
    layer: HashMap<LayerKey, Outcome>,
    slab: HashMap<SlabKey, Outcome>,
    provenance: HashMap<(usize, String), String>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub layer_entries: usize,
    pub slab_entries: usize,
}

impl ComputationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a layer-scope outcome, counting the hit or miss.
    pub fn get_layer(&mut self, layer: usize, parameter: &str, method: &str) -> Option<Outcome> {
        let found = self.layer.get(&(layer, parameter.to_string(), method.to_string())).cloned();
        self.count(found.is_some());
        found
    }

    pub fn insert_layer(&mut self, layer: usize, parameter: &str, method: &str, outcome: Outcome) {
        self.layer.insert((layer, parameter.to_string(), method.to_string()), outcome);
    }

    pub fn get_slab(&mut self, parameter: &str, method: &str) -> Option<Outcome> {
        let found = self.slab.get(&(parameter.to_string(), method.to_string())).cloned();
        self.count(found.is_some());
        found
    }

    pub fn insert_slab(&mut self, parameter: &str, method: &str, outcome: Outcome) {
        self.slab.insert((parameter.to_string(), method.to_string()), outcome);
    }

    pub fn record_provenance(&mut self, layer: usize, parameter: &str, method: &str) {
        self.provenance.insert((layer, parameter.to_string()), method.to_string());
    }

    /// The method that last produced `parameter` on `layer`.
    pub fn provenance(&self, layer: usize, parameter: &str) -> Option<&str> {
        self.provenance.get(&(layer, parameter.to_string())).map(String::as_str)
    }

    fn count(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 { 0.0 } else { self.hits as f64 / lookups as f64 },
            layer_entries: self.layer.len(),
            slab_entries: self.slab.len(),
        }
    }
}
