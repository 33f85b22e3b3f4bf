use summarizer_core::DocumentError;
use thiserror::Error;

/// Every failure the client surfaces to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No hosts loaded")]
    NothingLoaded,

    #[error("Please select at least one host to analyze")]
    EmptySelection,

    #[error("Host index {index} is out of range ({len} hosts loaded)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Please upload a JSON file (got {content_type})")]
    NotJson { content_type: String },

    #[error("No hosts found in file")]
    NoHostsInFile,

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Unexpected data format: {0}")]
    Shape(String),

    #[error("Invalid service URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cannot reach the analysis service at {url}; is the backend running? ({reason})")]
    Unreachable { url: String, reason: String },

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Malformed response from the analysis service: {0}")]
    MalformedResponse(String),

    #[error("Failed to load sample data: HTTP {status}")]
    SampleStatus { status: u16 },
}

/// How an error came about, which decides how the user recovers from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected locally; nothing was sent over the network.
    Validation,
    /// The request never reached the service.
    Connectivity,
    /// The service answered with an error or an unusable body.
    Service,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unreachable { .. } => ErrorKind::Connectivity,
            ClientError::Service { .. }
            | ClientError::MalformedResponse(_)
            | ClientError::SampleStatus { .. } => ErrorKind::Service,
            _ => ErrorKind::Validation,
        }
    }
}

impl From<DocumentError> for ClientError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Malformed(inner) => ClientError::InvalidJson(inner.to_string()),
            other => ClientError::Shape(other.to_string()),
        }
    }
}
