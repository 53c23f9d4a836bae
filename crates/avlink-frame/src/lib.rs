//! Versioned JSON wire frames for avatar messaging.
//!
//! This is the pure protocol layer of avlink. Every logical message is a
//! versioned JSON frame; oversized chat text is split into size-bounded
//! chunks, reassembled out of order on the far side, and paced against a
//! bytes/second budget:
//!
//! - [`codec`] — frame encode/decode with a single version gate
//! - [`splitter`] — character-safe chunking under a byte ceiling
//! - [`reassembler`] — out-of-order chunk reassembly with bounded buffers
//! - [`pacing`] — fixed-delay send pacing
//!
//! No I/O and no transport state live here.

pub mod codec;
pub mod error;
pub mod pacing;
pub mod reassembler;
pub mod splitter;

pub use codec::{
    decode, encode, ChatPayload, ChatSource, CommandPayload, EventPayload, Frame, FrameBody,
    ACK_SUCCESS, CMD_INTERRUPT, CMD_SET_PARAMS, DEFAULT_MAX_FRAME_BYTES, PROTOCOL_VERSION,
};
pub use error::{FrameError, Result};
pub use pacing::{ChunkPacer, DEFAULT_BYTES_PER_SECOND};
pub use reassembler::{ChunkUpdate, Reassembler, DEFAULT_MAX_BUFFER_AGE};
pub use splitter::{split_chat, SplitConfig};
