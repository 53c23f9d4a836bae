/// Errors that can occur in realtime channel operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The channel has not joined its room yet.
    #[error("channel not joined")]
    NotJoined,

    /// The channel (or its peer) has been torn down.
    #[error("channel closed")]
    Closed,

    /// The transport-level join handshake failed.
    #[error("join failed: {0}")]
    Join(String),

    /// A data send was refused by the underlying transport.
    #[error("send failed: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
