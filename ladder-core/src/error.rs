//! Error taxonomy for ladder operations.
//!
//! Every error is a caller contract violation, returned synchronously at the
//! offending call. Nothing here is transient, so nothing is retried.

use thiserror::Error;

/// Errors from agent construction and ladder operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LadderError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl LadderError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LadderError>;
