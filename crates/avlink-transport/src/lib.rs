//! Realtime transport abstraction for avatar sessions.
//!
//! The [`RealtimeChannel`] trait is the seam between avlink and whatever
//! vendor SDK carries the actual media and data traffic. Everything above
//! this crate sees only normalized [`ChannelSignal`]s and opaque
//! [`TrackHandle`]s; nothing vendor-specific crosses the boundary.
//!
//! [`LoopbackChannel`] is the in-process reference implementation used by
//! tests and the demo CLI.

pub mod error;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use loopback::LoopbackChannel;
pub use traits::{ChannelSignal, Delivery, RealtimeChannel, TrackHandle, TrackKind};
