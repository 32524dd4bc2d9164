use thiserror::Error;

/// Errors raised while filling an [`HttpMessage`](super::HttpMessage) or converting it into
/// `http` types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("http method is not set")]
    MethodUnset,

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http version: {major}.{minor}")]
    InvalidVersion { major: u8, minor: u8 },

    #[error("invalid http uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },
}

impl MessageError {
    pub fn invalid_version(major: u8, minor: u8) -> Self {
        Self::InvalidVersion { major, minor }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}
