//! Error types for Azure DevOps API operations.

use thiserror::Error;

use crate::http::HttpError;
use crate::platform::HostingError;

/// Errors that can occur when talking to the Azure DevOps REST API.
#[derive(Debug, Error)]
pub enum DevOpsError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A success response could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Invalid client configuration (e.g. an unparseable host).
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<DevOpsError> for HostingError {
    fn from(err: DevOpsError) -> Self {
        match err {
            DevOpsError::Http(e) => HostingError::Transport(e.to_string()),
            DevOpsError::Json(e) => HostingError::Decode(e.to_string()),
            DevOpsError::Api { status, message } => HostingError::Http { status, message },
            DevOpsError::Config(msg) => HostingError::Transport(msg),
        }
    }
}
