//! Error types for declarest-core

use thiserror::Error;

/// Static interface misconfiguration, raised while building or verifying a
/// descriptor and never at call time
///
/// A `DefinitionError` aborts client construction; there is no recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("ambiguous HTTP verb definition on {interface}::{method}")]
    AmbiguousVerb { interface: String, method: String },

    #[error("path variables and path parameters don't match on {interface}::{method}")]
    PathVariableMismatch { interface: String, method: String },

    #[error("path parameter names don't match template variables on {interface}::{method}")]
    PathParamMismatch { interface: String, method: String },

    #[error("unresolved template variable '{name}' in '{template}'")]
    UnresolvedVariable { name: String, template: String },
}

/// Errors that can occur while turning one invocation into a call plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid header value for '{0}'")]
    InvalidHeaderValue(String),

    #[error("argument is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
