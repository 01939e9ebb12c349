//! Fluid property errors.

use nf_core::NfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors raised when building or querying a fluid model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// State vector has the wrong number of components for the dimension.
    #[error("State length {len} does not match {n_var} variables")]
    StateLength { len: usize, n_var: usize },
}

impl From<FluidError> for NfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::InvalidArg { what } => NfError::InvalidArg { what },
            other => NfError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
