use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Protocol version this build speaks. Decode rejects everything else;
/// this is the single compatibility gate for protocol evolution.
pub const PROTOCOL_VERSION: u8 = 2;

/// Hard ceiling on one encoded frame, in bytes. Not wire-negotiated.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 950;

/// Command name: update avatar parameters.
pub const CMD_SET_PARAMS: &str = "set-params";
/// Command name: interrupt the avatar's current utterance.
pub const CMD_INTERRUPT: &str = "interrupt";
/// Acknowledgment code for a successfully applied command.
pub const ACK_SUCCESS: i64 = 1000;

/// One wire unit exchanged over the transport's data channel.
///
/// Wire shape (JSON over bytes):
/// ```text
/// { "v": 2, "type": "command"|"chat"|"event", "mid": "<string>",
///   "idx"?: <int>, "fin"?: <bool>, "pld": { ... } }
/// ```
///
/// `idx`/`fin` are both present or both absent: a frame is either a whole
/// message or a deliberate chunk of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "v")]
    pub version: u8,
    #[serde(rename = "mid")]
    pub message_id: String,
    #[serde(rename = "idx", default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    #[serde(rename = "fin", default, skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    #[serde(flatten)]
    pub body: FrameBody,
}

/// Type-discriminated frame payload (`type` + `pld` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "pld", rename_all = "lowercase")]
pub enum FrameBody {
    Command(CommandPayload),
    Chat(ChatPayload),
    Event(EventPayload),
}

/// Command invocation or acknowledgment. Acks carry `code` (1000 = success).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl CommandPayload {
    /// Outbound `set-params` command.
    pub fn set_params(data: serde_json::Value) -> Self {
        Self {
            cmd: CMD_SET_PARAMS.to_string(),
            data: Some(data),
            code: None,
            msg: None,
        }
    }

    /// Outbound `interrupt` command.
    pub fn interrupt() -> Self {
        Self {
            cmd: CMD_INTERRUPT.to_string(),
            data: None,
            code: None,
            msg: None,
        }
    }

    /// Acknowledgment for a previously issued command.
    pub fn ack(cmd: &str, code: i64, msg: Option<&str>) -> Self {
        Self {
            cmd: cmd.to_string(),
            data: None,
            code: Some(code),
            msg: msg.map(str::to_string),
        }
    }

    /// Whether this payload is an acknowledgment rather than an invocation.
    pub fn is_ack(&self) -> bool {
        self.code.is_some()
    }
}

/// Chat utterance text with an optional origin marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChatSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    Bot,
    User,
}

/// Event notification with an opaque data object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Frame {
    /// A whole (unchunked) chat frame.
    pub fn chat(message_id: &str, text: &str, from: Option<ChatSource>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_id: message_id.to_string(),
            chunk_index: None,
            is_final: None,
            body: FrameBody::Chat(ChatPayload {
                text: text.to_string(),
                from,
            }),
        }
    }

    /// One chunk of a larger chat message.
    pub fn chat_chunk(message_id: &str, index: u32, is_final: bool, text: &str) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_id: message_id.to_string(),
            chunk_index: Some(index),
            is_final: Some(is_final),
            body: FrameBody::Chat(ChatPayload {
                text: text.to_string(),
                from: None,
            }),
        }
    }

    /// A single-frame command message.
    pub fn command(message_id: &str, payload: CommandPayload) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_id: message_id.to_string(),
            chunk_index: None,
            is_final: None,
            body: FrameBody::Command(payload),
        }
    }

    /// A single-frame event message.
    pub fn event(message_id: &str, payload: EventPayload) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_id: message_id.to_string(),
            chunk_index: None,
            is_final: None,
            body: FrameBody::Event(payload),
        }
    }

    /// Whether this frame is a chunk of a larger message.
    pub fn is_chunk(&self) -> bool {
        self.chunk_index.is_some()
    }
}

/// Encode a frame to its wire bytes. Never fails for frames built through
/// the constructors above.
pub fn encode(frame: &Frame) -> Result<Bytes> {
    let bytes = serde_json::to_vec(frame)?;
    Ok(Bytes::from(bytes))
}

/// Decode wire bytes into a frame.
///
/// Rejects unsupported versions and inconsistent chunk headers with typed
/// errors so the caller can fall back to treating the bytes as opaque text.
pub fn decode(bytes: &[u8]) -> Result<Frame> {
    let frame: Frame = serde_json::from_slice(bytes)?;

    if frame.version != PROTOCOL_VERSION {
        return Err(FrameError::UnsupportedVersion {
            found: frame.version,
        });
    }

    if frame.chunk_index.is_some() != frame.is_final.is_some() {
        return Err(FrameError::InvalidChunkHeader {
            reason: "idx and fin must both be present or both absent",
        });
    }

    if frame.is_chunk() && !matches!(frame.body, FrameBody::Chat(_)) {
        return Err(FrameError::InvalidChunkHeader {
            reason: "only chat frames may be chunked",
        });
    }

    Ok(frame)
}
