/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credentials object does not match the provider's expected shape.
    #[error("invalid credentials: expected {expected} credentials")]
    InvalidCredentials { expected: &'static str },

    /// The connect handshake failed before the session became usable.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// An established connection dropped out from under the session.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The messaging channel is not usable for this operation.
    #[error("channel not ready (state: {state}, identity: {identity:?})")]
    ChannelNotReady {
        state: String,
        identity: Option<String>,
    },

    /// Codec or splitter error, surfaced synchronously from the send call.
    #[error("frame error: {0}")]
    Frame(#[from] avlink_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] avlink_transport::TransportError),

    /// The requested capability or provider is not implemented.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// No session is active, or the requested provider kind has no
    /// registered factory.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(&'static str),

    /// Anything the taxonomy above does not cover.
    #[error("unknown session error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
