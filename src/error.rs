//! Error taxonomy for the swarm core.
//!
//! `InsufficientEnergy` and `UnknownActionType` are recoverable — the driver
//! converts them into a no-op tick for the offending agent. `InvalidConfig`
//! and `InsufficientAgents` are construction-time and fatal to the call that
//! raised them. `Canceled` is a terminal `Outcome`, not a propagated error.

use pyo3::exceptions::PyValueError;
use pyo3::PyErr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("insufficient energy: required {required}, available {available}")]
    InsufficientEnergy { required: f64, available: f64 },

    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    #[error("insufficient agents: need at least {needed}, got {got}")]
    InsufficientAgents { needed: usize, got: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("canceled")]
    Canceled,
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<CoreError> for PyErr {
    fn from(err: CoreError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}
