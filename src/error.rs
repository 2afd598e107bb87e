//! Defines the error types for the crate.
//!
//! Two families exist and are never mixed:
//! - [`EngineError`] is caller misuse, returned as `Err` at the API boundary.
//! - [`ComputationError`] is an expected computation failure. It is recorded
//!   in a [`crate::compute::ComputationTrace`] and never raised.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejections surfaced to the caller of the graph, registry or engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("Unknown method '{method}' for parameter '{parameter}'")]
    UnknownMethod { parameter: String, method: String },
    #[error("Unknown weak layer definition '{0}'")]
    UnknownWeakLayerDefinition(String),
    #[error("No pathway to '{target}' uses the requested methods")]
    PathwayNotFound { target: String },
    #[error("Graph consistency error: {0}")]
    GraphConsistency(String),
    #[error("Cycle detected involving node '{0}'")]
    CycleDetected(String),
    #[error("Method '{method}' is already registered for parameter '{parameter}'")]
    DuplicateMethod { parameter: String, method: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The specific reason a single computation did not produce a value.
///
/// The variant is part of the contract: callers distinguish a missing
/// prerequisite from a faulting formula by matching on it, not by parsing
/// the message.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComputationError {
    #[error("Missing required inputs: {}", missing.join(", "))]
    MissingInputs { missing: Vec<String> },
    #[error("Method '{method}' returned an undefined result for '{parameter}'")]
    UndefinedResult { parameter: String, method: String },
    #[error("Method '{method}' faulted: {message}")]
    ExecutionFault { method: String, message: String },
    #[error("Prerequisite not met for '{parameter}': {reason}")]
    PrerequisiteNotMet { parameter: String, reason: String },
    #[error("No method '{method}' registered for parameter '{parameter}'")]
    UnregisteredMethod { parameter: String, method: String },
    #[error("Method '{method}' for '{parameter}' does not operate on a single layer")]
    WrongScope { parameter: String, method: String },
}
