use crate::value::UValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A formula evaluated on one layer's gathered inputs.
pub type LayerFn = fn(&MethodInputs) -> UValue;

/// A formula evaluated on the gathered inputs of every layer, top to bottom.
pub type SlabFn = fn(&[MethodInputs]) -> UValue;

#[derive(Clone, Copy)]
pub enum Formula {
    Layer(LayerFn),
    Slab(SlabFn),
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Layer(_) => f.write_str("Formula::Layer"),
            Formula::Slab(_) => f.write_str("Formula::Slab"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Layer,
    Slab,
}

/// Whether a method's output may be memoized by `(layer, parameter, method)`.
///
/// Only values with no upstream method ambiguity are `RootSafe`. A value
/// computed from another calculated parameter depends on whichever upstream
/// method the current pathway chose, which the key does not encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePolicy {
    RootSafe,
    AlwaysRecompute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    Number(UValue),
    Code(String),
}

/// Named inputs handed to a formula.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodInputs {
    values: BTreeMap<String, InputValue>,
}

impl MethodInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: InputValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with_number(mut self, name: &str, value: UValue) -> Self {
        self.insert(name, InputValue::Number(value));
        self
    }

    pub fn with_code(mut self, name: &str, code: &str) -> Self {
        self.insert(name, InputValue::Code(code.to_string()));
        self
    }

    pub fn number(&self, name: &str) -> Option<UValue> {
        match self.values.get(name)? {
            InputValue::Number(v) => Some(*v),
            InputValue::Code(_) => None,
        }
    }

    pub fn code(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            InputValue::Code(c) => Some(c.as_str()),
            InputValue::Number(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One registered calculation method.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub parameter: String,
    pub method: String,
    pub required: Vec<String>,
    pub optional: Vec<(String, InputValue)>,
    pub formula: Formula,
    pub cache_policy: CachePolicy,
    /// Grain codes the method was fitted for; `None` accepts any code.
    pub valid_grain_forms: Option<Vec<String>>,
}

impl MethodSpec {
    fn new(parameter: &str, method: &str, required: &[&str], formula: Formula) -> Self {
        Self {
            parameter: parameter.to_string(),
            method: method.to_string(),
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: Vec::new(),
            formula,
            cache_policy: CachePolicy::AlwaysRecompute,
            valid_grain_forms: None,
        }
    }

    pub fn layer(parameter: &str, method: &str, required: &[&str], f: LayerFn) -> Self {
        Self::new(parameter, method, required, Formula::Layer(f))
    }

    pub fn slab(parameter: &str, method: &str, required: &[&str], f: SlabFn) -> Self {
        Self::new(parameter, method, required, Formula::Slab(f))
    }

    pub fn with_optional(mut self, name: &str, default: InputValue) -> Self {
        self.optional.push((name.to_string(), default));
        self
    }

    /// Opts this method into the keyed cache. Only for outputs with no
    /// calculated inputs.
    pub fn root_safe(mut self) -> Self {
        self.cache_policy = CachePolicy::RootSafe;
        self
    }

    pub fn valid_for(mut self, codes: &[&str]) -> Self {
        self.valid_grain_forms = Some(codes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn scope(&self) -> Scope {
        match self.formula {
            Formula::Layer(_) => Scope::Layer,
            Formula::Slab(_) => Scope::Slab,
        }
    }
}
