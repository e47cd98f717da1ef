use thiserror::Error as ThisError;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while creating or resolving an address.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Malformed address text: unterminated literal, unexpected token, premature end.
    #[error("syntax error: {message} (remaining: `{remaining}`)")]
    Syntax { message: String, remaining: String },

    /// A well-formed address that does not locate anything in the document.
    #[error("cannot resolve address: {0}")]
    Resolution(String),

    /// Recognised construct outside the supported grammar.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Inconsistent tree or selection state handed in by the caller.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Categorises [`Error`] values for callers that only branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Resolution,
    UnsupportedOperation,
    Internal,
    InvalidArgument,
}

impl Error {
    pub fn syntax(message: impl Into<String>, remaining: impl Into<String>) -> Self {
        Self::Syntax { message: message.into(), remaining: remaining.into() }
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Unsupported(_) => ErrorKind::UnsupportedOperation,
            Self::Internal(_) => ErrorKind::Internal,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// The character stream ran out of text before the requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("end of character stream")]
pub struct EndOfStream;
