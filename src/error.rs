use std::fmt;

use thiserror::Error;

use crate::upload::UploadProgress;

/// Errors returned by the Appwrite client.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status of 400 or above.
    #[error(transparent)]
    Api(#[from] AppwriteError),

    /// The call was malformed by the caller (missing path parameter,
    /// invalid chunk size, file in a JSON body, ...).
    #[error("invalid request: {0}")]
    Programming(String),

    /// A chunked upload failed part-way through.
    #[error("upload failed after {} of {} bytes: {source}", .progress.size_uploaded, .progress.size_total)]
    Upload {
        progress: UploadProgress,
        #[source]
        source: Box<Error>,
    },

    /// A GraphQL response carried errors instead of data.
    #[error("GraphQL errors: {0:?}")]
    Graphql(Vec<graphql_client::Error>),

    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The structured API error, looking through upload wrappers.
    pub fn as_api(&self) -> Option<&AppwriteError> {
        match self {
            Error::Api(e) => Some(e),
            Error::Upload { source, .. } => source.as_api(),
            _ => None,
        }
    }

    /// Progress reached before a chunked upload failed.
    pub fn upload_progress(&self) -> Option<&UploadProgress> {
        match self {
            Error::Upload { progress, .. } => Some(progress),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// An error response decoded from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppwriteError {
    /// HTTP status of the response.
    pub status: u16,
    /// `code` from the error body, or the status when the body has none.
    pub code: u16,
    pub error_type: String,
    pub message: String,
    /// Raw response body, kept for debugging.
    pub response: String,
}

impl fmt::Display for AppwriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_type.is_empty() {
            write!(f, "HTTP {}: {}", self.status, self.message)
        } else {
            write!(f, "HTTP {} ({}): {}", self.status, self.error_type, self.message)
        }
    }
}

impl std::error::Error for AppwriteError {}

/// Failure of the underlying HTTP exchange (DNS, connect, TLS, timeout).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let message = e.to_string();
        Self::with_source(message, e)
    }
}
