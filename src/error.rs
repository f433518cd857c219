//! Error types for the Stampede load generator.

use thiserror::Error;

/// Errors raised while loading the specification and building value pools.
/// All of these are fatal at startup: no traffic is generated against a
/// registry that failed to build.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Value source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse '{value}' as {expected} for entity '{entity}': {reason}")]
    Parse {
        entity: String,
        value: String,
        expected: &'static str,
        reason: String,
    },
}

/// Errors raised while serving a single trigger. These abort the trigger's
/// assembly-and-dispatch cycle and are reported to the caller; they never
/// take down the serving loop.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Pool for entity '{entity}' holds {available} values but {requested} rows were requested")]
    InsufficientPool {
        entity: String,
        available: usize,
        requested: usize,
    },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Specification error: {0}")]
    Spec(#[from] SpecError),
}
