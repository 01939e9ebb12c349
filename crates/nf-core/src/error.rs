use thiserror::Error;

/// Errors shared by the navflow crates once they cross a crate boundary.
#[derive(Error, Debug)]
pub enum NfError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

pub type NfResult<T> = Result<T, NfError>;
