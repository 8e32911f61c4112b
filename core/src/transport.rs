use async_trait::async_trait;
use viewsync_proto::GroupId;

/// Server-to-group emission seam. The transport behind it is an external
/// collaborator: a persistent, authenticated duplex connection whose
/// handshake, authentication and room membership are the connector's
/// business, not the engine's.
#[async_trait]
pub trait GroupSender: Send + Sync {
    /// Deliver a named JSON event to every current member of `group`.
    async fn emit(&self, group: &GroupId, event_name: &str, payload: serde_json::Value) -> Result<(), SendError>;

    fn cloned(&self) -> Box<dyn GroupSender>;
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Send timeout")]
    Timeout,
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}
