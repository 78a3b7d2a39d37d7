// src/error.rs

use thiserror::Error;

/// Failure at the persistence boundary. The core attempts exactly one batch
/// handoff per due flush; retry/requeue policy lives with the collaborator.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("persistence backend rejected batch: {0}")]
    Backend(String),

    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
