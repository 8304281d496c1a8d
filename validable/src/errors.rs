//! Error types for the validable crate.
//!
//! Step failures never show up here: they travel on a pipeline's failure
//! channel as recorded values. `ValidableError` covers engine-generated raw
//! errors and misuse of the public API.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidableError {
    /// A step tried to record itself under a name already in the lineage.
    #[error("Variable '{0}' already exists")]
    NameCollision(String),

    /// A step panicked instead of returning a result.
    #[error("step '{step}' panicked: {message}")]
    StepPanicked { step: String, message: String },

    /// The operation is reserved but has no defined semantics.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// A background tap was requested outside a tokio runtime.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),
}

pub type ValidableResult<T> = Result<T, ValidableError>;
