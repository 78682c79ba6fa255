//! Error type shared by the codec and the resolution helpers.

use thiserror::Error;

/// Errors raised when an argument falls outside the HEALPix domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The argument is not a valid depth, pixel index, nside or uniq value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
