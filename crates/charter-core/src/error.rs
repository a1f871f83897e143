//! Error types for the planning pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the external text-completion collaborator.
///
/// These never escape the parser, synthesizer or SOW generator; they are
/// recovered locally into fallback values. They only surface through step
/// handlers, where they end up in an execution's `errors`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// No completion backend is configured or reachable
    #[error("Completion backend unavailable: {0}")]
    Unavailable(String),
    /// The request itself failed (network, HTTP status, timeout)
    #[error("Completion request failed: {0}")]
    Request(String),
    /// The backend answered with something that could not be interpreted
    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),
    /// The backend answered with no text at all
    #[error("Completion response was empty")]
    EmptyResponse,
}

/// Comprehensive error type for all planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Step prerequisites form a cycle and could never be satisfied
    #[error("Plan {plan_id} has cyclic step dependencies: {}", steps.join(" -> "))]
    CyclicDependency { plan_id: String, steps: Vec<String> },
    /// Completion collaborator failures
    #[error(transparent)]
    Completion(#[from] CompletionError),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a not-found error for a plan id.
    pub fn plan_not_found(id: impl Into<String>) -> Self {
        Self::PlanNotFound { id: id.into() }
    }

    /// Whether this error reports an unknown id rather than an environmental
    /// failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlannerError::PlanNotFound { .. })
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
