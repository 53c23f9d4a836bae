/// Errors that can occur while encoding, decoding, or splitting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame carries a protocol version this build does not speak.
    #[error("unsupported protocol version {found} (supported: {supported})", supported = crate::codec::PROTOCOL_VERSION)]
    UnsupportedVersion { found: u8 },

    /// The bytes do not parse as a frame at all.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Chunk header fields are inconsistent (`idx`/`fin` must travel together,
    /// and only chat frames may be chunked).
    #[error("invalid chunk header: {reason}")]
    InvalidChunkHeader { reason: &'static str },

    /// The splitter was handed empty text.
    #[error("empty message content")]
    EmptyContent,

    /// A single character cannot be encoded under the frame byte ceiling.
    #[error("chunk cannot fit under {limit} byte frame ceiling")]
    ChunkTooLarge { limit: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
