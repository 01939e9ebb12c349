//! Error types for the viscous closure.

use nf_core::error::NfError;
use nf_fluids::FluidError;
use nf_mesh::MeshError;
use thiserror::Error;

/// Errors raised while configuring or running the viscous closure.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for NfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Configuration { what: _ } => NfError::InvalidArg {
                what: "configuration",
            },
            SolverError::ProblemSetup { what: _ } => NfError::InvalidArg {
                what: "problem setup",
            },
            SolverError::InvalidState { what: _ } => NfError::InvalidArg { what: "state" },
            SolverError::Mesh(_) => NfError::InvalidArg { what: "mesh" },
            SolverError::Fluid(_) => NfError::InvalidArg { what: "fluid" },
        }
    }
}
