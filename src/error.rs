//! Error types for storage and the assistant collaborator.

/// Errors from the key-value persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from a completion provider.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("malformed stream event: {0}")]
    Decode(#[from] serde_json::Error),
}
