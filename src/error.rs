//! Error types for Stevedore
//!
//! Every error aborts the current invocation. Nothing is retried internally.

use thiserror::Error;

use crate::domain::ports::RuntimeError;

/// Result type alias for reconcile operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Main error type for reconcile operations
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A service name was requested that the graph does not declare
    #[error("unknown service '{name}'")]
    UnknownService { name: String },

    /// The dependency graph contains a cycle
    #[error("dependency cycle detected: {}", trace.join(" -> "))]
    Cycle { trace: Vec<String> },

    /// A runtime call failed or timed out while applying changes
    #[error("failed to converge service '{service}': {source}")]
    Convergence {
        service: String,
        #[source]
        source: RuntimeError,
    },

    /// A read-only runtime query failed (snapshot, inspect)
    #[error("failed to query runtime state for project '{project}': {source}")]
    Query {
        project: String,
        #[source]
        source: RuntimeError,
    },

    /// Malformed or contradictory options, or an unusable runtime client
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ReconcileError {
    pub fn unknown_service(name: impl Into<String>) -> Self {
        Self::UnknownService { name: name.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn convergence(service: impl Into<String>, source: RuntimeError) -> Self {
        Self::Convergence {
            service: service.into(),
            source,
        }
    }

    pub fn query(project: impl Into<String>, source: RuntimeError) -> Self {
        Self::Query {
            project: project.into(),
            source,
        }
    }

    /// Stable machine-readable code for JSON output
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::UnknownService { .. } => "unknown_service",
            ReconcileError::Cycle { .. } => "dependency_cycle",
            ReconcileError::Convergence { .. } => "convergence_failed",
            ReconcileError::Query { .. } => "query_failed",
            ReconcileError::Configuration { .. } => "configuration",
        }
    }
}
