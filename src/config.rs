//! config.rs
//! Engine configuration, loadable from JSON.

use crate::error::EngineError;
use crate::graph::ParameterGraph;
use crate::methods::plate::{SHEAR_CORRECTION, SHEAR_CORRECTION_INPUT};
use crate::store::{InputValue, MethodRegistry};
use crate::value::UValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `false` recomputes root-safe parameters on every pathway.
    pub cache_enabled: bool,
    /// Allowed methods per parameter. Parameters not listed are unrestricted.
    pub method_filter: BTreeMap<String, Vec<String>>,
    /// Default for the optional shear correction of A55. Applied to the
    /// registry an engine is built with.
    pub default_shear_correction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            method_filter: BTreeMap::new(),
            default_shear_correction: SHEAR_CORRECTION,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Restricts `parameter` to `methods`.
    pub fn restrict(mut self, parameter: &str, methods: &[&str]) -> Self {
        self.method_filter
            .insert(parameter.to_string(), methods.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Whether every choice in a method mapping passes the filter.
    pub fn allows(&self, methods: &BTreeMap<String, String>) -> bool {
        methods.iter().all(|(parameter, method)| match self.method_filter.get(parameter) {
            Some(allowed) => allowed.contains(method),
            None => true,
        })
    }

    /// Rejects filter entries naming a parameter or method the graph lacks.
    pub fn validate(&self, graph: &ParameterGraph) -> Result<(), EngineError> {
        if !(self.default_shear_correction > 0.0 && self.default_shear_correction <= 1.0) {
            return Err(EngineError::Config(format!(
                "default_shear_correction must be in (0, 1], got {}",
                self.default_shear_correction
            )));
        }
        for (parameter, methods) in &self.method_filter {
            if graph.get_node(parameter).is_none() {
                return Err(EngineError::UnknownParameter(parameter.clone()));
            }
            let known = graph.methods_into(parameter);
            if let Some(method) = methods.iter().find(|m| !known.contains(m)) {
                return Err(EngineError::UnknownMethod { parameter: parameter.clone(), method: method.clone() });
            }
        }
        Ok(())
    }

    /// The built-in registry with this configuration's defaults applied.
    pub fn registry(&self) -> MethodRegistry {
        MethodRegistry::with_shear_correction(self.default_shear_correction)
    }

    /// `registry` with this configuration's defaults applied. Borrowed when
    /// the registry already agrees with them.
    pub fn apply<'r>(&self, registry: &'r MethodRegistry) -> Cow<'r, MethodRegistry> {
        let correction = InputValue::Number(UValue::exact(self.default_shear_correction));
        if registry.optional_defaults(SHEAR_CORRECTION_INPUT).all(|v| *v == correction) {
            return Cow::Borrowed(registry);
        }
        let mut owned = registry.clone();
        owned.set_optional_default(SHEAR_CORRECTION_INPUT, correction);
        Cow::Owned(owned)
    }
}
