//! Chunked avatar messaging over pluggable realtime transports.
//!
//! avlink speaks a small versioned JSON protocol for driving realtime avatar
//! endpoints: chat text is split into size-bounded chunks, paced against a
//! send budget, and reassembled out of order on the far side; control
//! commands are readiness-guarded and acknowledged.
//!
//! # Crate Structure
//!
//! - [`frame`] — Wire frames: codec, splitter, reassembler, pacing
//! - [`transport`] — The realtime channel abstraction and the loopback
//!   reference transport
//! - [`session`] — Provider sessions and the coordinator that switches
//!   between them

/// Re-export frame types.
pub mod frame {
    pub use avlink_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use avlink_transport::*;
}

/// Re-export session types.
pub mod session {
    pub use avlink_session::*;
}
