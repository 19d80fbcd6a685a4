//! Error types for the simulation engine

use thiserror::Error;

/// Top-level error type for simulation operations
///
/// Component models themselves are total functions and never produce errors;
/// everything that can go wrong is either a structural problem with the
/// submitted graph or a failure at the external executor boundary. The test
/// runner converts every variant into a failing test result, so none of these
/// escape to the caller of `run_all`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Executor error: {0}")]
    Executor(#[from] ExecError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Structural problems with the submitted system graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("No entry component: graph has no client or app server to originate traffic")]
    NoEntryComponent,

    #[error("Component not found with id: {id}")]
    ComponentNotFound { id: String },

    #[error("Connection references unknown component: {id}")]
    DanglingConnection { id: String },
}

/// Failures at the external code-executor boundary
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Executor returned non-zero exit: {0}")]
    NonZeroExit(String),

    #[error("Executor output missing result marker; raw output: {raw}")]
    MissingMarker { raw: String },

    #[error("Executor result payload is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Executor transport failed: {0}")]
    Transport(String),
}
