use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },
    #[error("Plex token is not a valid header value")]
    InvalidToken,
    #[error("Plex library '{library}' not found (available: {})", available.join(", "))]
    LibraryNotFound { library: String, available: Vec<String> },
    #[error("unexpected response shape from {0}")]
    UnexpectedResponse(String),
    #[error("invalid availability index {path}: {reason}")]
    InvalidIndex { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
