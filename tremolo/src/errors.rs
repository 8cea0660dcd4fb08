//! Definition of errors.

/// A specialized Result type for Tremolo.
pub type Result<T, E = TremoloError> = std::result::Result<T, E>;

/// The error type for Tremolo.
#[derive(Debug, thiserror::Error)]
pub enum TremoloError {
    /// The error variant for [`InvalidArgumentError`].
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    /// The error variant for [`InvalidFormatError`].
    #[error(transparent)]
    InvalidFormat(#[from] InvalidFormatError),

    /// The error variant for [`InvalidStateError`].
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    /// The error variant for [`ParseIntError`](std::num::ParseIntError).
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// The error variant for [`ParseFloatError`](std::num::ParseFloatError).
    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// The error variant for [`std::io::Error`].
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TremoloError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }
}

/// Error used when the argument is invalid.
#[derive(Debug, thiserror::Error)]
#[error("InvalidArgumentError: {arg}: {msg}")]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the input format is invalid.
#[derive(Debug, thiserror::Error)]
#[error("InvalidFormatError: {arg}: {msg}")]
pub struct InvalidFormatError {
    /// Name of the format.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the state is invalid.
#[derive(Debug, thiserror::Error)]
#[error("InvalidStateError: {msg}: {cause}")]
pub struct InvalidStateError {
    /// Error message.
    pub(crate) msg: String,

    /// Underlying cause of the error.
    pub(crate) cause: String,
}
