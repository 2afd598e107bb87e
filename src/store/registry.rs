use super::types::*;
use crate::error::{ComputationError, EngineError};
use crate::graph::definitions as names;
use crate::slab::{codes, Layer, Slab};
use crate::value::UValue;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Append-only table of calculation methods keyed by `(parameter, method)`.
///
/// Registration order is kept per parameter. The registry never mutates the
/// layers or slabs it reads inputs from.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    specs: HashMap<String, Vec<MethodSpec>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: MethodSpec) -> Result<(), EngineError> {
        let entry = self.specs.entry(spec.parameter.clone()).or_default();
        if entry.iter().any(|s| s.method == spec.method) {
            return Err(EngineError::DuplicateMethod { parameter: spec.parameter, method: spec.method });
        }
        entry.push(spec);
        Ok(())
    }

    pub fn lookup(&self, parameter: &str, method: &str) -> Option<&MethodSpec> {
        self.specs.get(parameter)?.iter().find(|s| s.method == method)
    }

    /// Registered methods for `parameter`, in registration order.
    pub fn methods_for(&self, parameter: &str) -> &[MethodSpec] {
        self.specs.get(parameter).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any method computes `parameter`.
    pub fn has_parameter(&self, parameter: &str) -> bool {
        self.specs.contains_key(parameter)
    }

    pub fn len(&self) -> usize {
        self.specs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Defaults of optional input `name`, one per method declaring it.
    pub fn optional_defaults<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s InputValue> + 's {
        self.specs
            .values()
            .flatten()
            .flat_map(|spec| spec.optional.iter())
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Replaces the default of optional input `name` on every method that
    /// declares it. Returns how many methods changed.
    pub fn set_optional_default(&mut self, name: &str, value: InputValue) -> usize {
        let mut changed = 0;
        for (n, v) in self.specs.values_mut().flatten().flat_map(|spec| spec.optional.iter_mut()) {
            if n == name && *v != value {
                *v = value.clone();
                changed += 1;
            }
        }
        changed
    }

    // --- Input resolution ---

    /// Resolves one named input for `spec` from a layer.
    ///
    /// - `density` prefers a calculated value over the measured one.
    /// - `grain_form` picks the code variant the method is valid for.
    /// - `hand_hardness` is converted to its numeric index.
    pub fn resolve_input(&self, spec: &MethodSpec, name: &str, layer: &Layer) -> Option<InputValue> {
        match name {
            names::DENSITY => layer.best_density().map(InputValue::Number),
            names::GRAIN_FORM => {
                let code = layer.grain_form.as_deref()?;
                codes::resolve_grain_code(code, spec.valid_grain_forms.as_deref())
                    .map(|c| InputValue::Code(c.to_string()))
            }
            names::HAND_HARDNESS => layer
                .hand_hardness
                .as_deref()
                .and_then(codes::hand_hardness_index)
                .map(|h| InputValue::Number(UValue::exact(h))),
            other => layer.numeric(other).map(InputValue::Number),
        }
    }

    /// Gathers required and optional inputs of `spec` from one layer.
    ///
    /// Missing required inputs are reported by name.
    pub fn gather_inputs(&self, spec: &MethodSpec, layer: &Layer) -> Result<MethodInputs, Vec<String>> {
        let mut inputs = MethodInputs::new();
        let mut missing = Vec::new();
        for name in &spec.required {
            match self.resolve_input(spec, name, layer) {
                Some(value) => inputs.insert(name.clone(), value),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }
        for (name, default) in &spec.optional {
            let value = self.resolve_input(spec, name, layer).unwrap_or_else(|| default.clone());
            inputs.insert(name.clone(), value);
        }
        Ok(inputs)
    }

    // --- Execution ---

    /// Runs a layer-scope method on `layer`.
    pub fn execute(&self, parameter: &str, method: &str, layer: &Layer) -> Result<UValue, ComputationError> {
        let spec = self.require(parameter, method)?;
        self.execute_spec(spec, layer)
    }

    pub fn execute_spec(&self, spec: &MethodSpec, layer: &Layer) -> Result<UValue, ComputationError> {
        let Formula::Layer(f) = spec.formula else {
            return Err(ComputationError::WrongScope {
                parameter: spec.parameter.clone(),
                method: spec.method.clone(),
            });
        };
        let inputs = self
            .gather_inputs(spec, layer)
            .map_err(|missing| ComputationError::MissingInputs { missing })?;
        Self::invoke(spec, || f(&inputs))
    }

    /// Runs a slab-scope method on every layer of `slab`.
    pub fn execute_slab(&self, parameter: &str, method: &str, slab: &Slab) -> Result<UValue, ComputationError> {
        let spec = self.require(parameter, method)?;
        self.execute_slab_spec(spec, slab)
    }

    pub fn execute_slab_spec(&self, spec: &MethodSpec, slab: &Slab) -> Result<UValue, ComputationError> {
        let f = match spec.formula {
            Formula::Slab(f) => f,
            Formula::Layer(_) => {
                return Err(ComputationError::WrongScope {
                    parameter: spec.parameter.clone(),
                    method: spec.method.clone(),
                })
            }
        };
        let mut per_layer = Vec::with_capacity(slab.layers.len());
        let mut missing = Vec::new();
        for (i, layer) in slab.layers.iter().enumerate() {
            match self.gather_inputs(spec, layer) {
                Ok(inputs) => per_layer.push(inputs),
                Err(absent) => missing.extend(absent.into_iter().map(|n| format!("layer {i}: {n}"))),
            }
        }
        if !missing.is_empty() {
            return Err(ComputationError::MissingInputs { missing });
        }
        Self::invoke(spec, || f(&per_layer))
    }

    fn require(&self, parameter: &str, method: &str) -> Result<&MethodSpec, ComputationError> {
        self.lookup(parameter, method).ok_or_else(|| ComputationError::UnregisteredMethod {
            parameter: parameter.to_string(),
            method: method.to_string(),
        })
    }

    /// Calls a formula, turning a panic into `ExecutionFault` and a NaN
    /// result into `UndefinedResult`.
    fn invoke(spec: &MethodSpec, call: impl FnOnce() -> UValue) -> Result<UValue, ComputationError> {
        let value = catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
            let message = panic_message(payload);
            warn!(parameter = %spec.parameter, method = %spec.method, %message, "formula faulted");
            ComputationError::ExecutionFault { method: spec.method.clone(), message }
        })?;
        if value.is_undefined() {
            return Err(ComputationError::UndefinedResult {
                parameter: spec.parameter.clone(),
                method: spec.method.clone(),
            });
        }
        Ok(value)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "formula panicked".to_string()
    }
}
