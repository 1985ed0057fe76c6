use thiserror::Error;

/// Errors returned by a hosting API.
///
/// The engine never propagates these past the granularity they occurred at;
/// it renders them with `Display` into the owning repository's error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostingError {
    /// The service answered with a non-success status.
    #[error("{status}: {}", .message.as_deref().unwrap_or_default())]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// A success response whose body could not be understood.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl HostingError {
    /// Create an HTTP status error.
    #[inline]
    pub fn http(status: u16, message: Option<String>) -> Self {
        Self::Http { status, message }
    }

    /// Create a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// The upstream status code, when the service answered at all.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for hosting API operations.
pub type Result<T> = std::result::Result<T, HostingError>;
