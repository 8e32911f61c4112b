use thiserror::Error;

/// A wire payload could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}
