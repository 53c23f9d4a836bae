use crate::error::Result;

/// Media kind of a published track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Opaque handle to a capture-device track. Device management lives outside
/// this crate; sessions only pass handles through to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHandle {
    pub id: String,
    pub kind: TrackKind,
}

impl TrackHandle {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Delivery hint for data sends, honored where the transport distinguishes
/// reliable from best-effort delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Reliable,
    BestEffort,
}

/// A signal raised by the underlying transport, already stripped of any
/// vendor-specific types. Sessions normalize these into their own state and
/// event vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSignal {
    /// The join handshake completed and a local identity was assigned.
    Joined { identity: String },
    /// The channel left its room (locally or remotely initiated).
    Left,
    /// The data messaging lane became usable. May arrive well after
    /// `Joined` on transports that negotiate it separately.
    MessagingReady,
    /// Inbound data-channel bytes.
    Data { bytes: Vec<u8>, delivery: Delivery },
    /// A remote participant joined.
    PeerJoined {
        identity: String,
        name: Option<String>,
    },
    /// A remote participant left.
    PeerLeft { identity: String },
    /// Transport-native quality score, 0 (lost) to 5 (excellent).
    Quality { score: u8 },
    /// Remote connection statistics.
    Stats { rtt_ms: u32, packet_loss_pct: f32 },
    /// An asynchronous transport error.
    Error(String),
}

/// One concrete realtime connection: join/leave lifecycle, media track
/// publication, a size-limited data lane, and a non-blocking signal queue.
///
/// Implementations wrap a vendor SDK (or the in-process [`LoopbackChannel`]
/// used in tests) and must never surface vendor types through this trait.
///
/// [`LoopbackChannel`]: crate::loopback::LoopbackChannel
pub trait RealtimeChannel: Send {
    /// Join a room. Blocks until the transport handshake resolves.
    fn join(&mut self, room: &str, token: &str) -> Result<()>;

    /// Leave the room. Safe to call when not joined.
    fn leave(&mut self) -> Result<()>;

    /// The identity the transport assigned to this endpoint, once known.
    /// On most transports this resolves asynchronously after `join`.
    fn local_identity(&self) -> Option<String>;

    /// Whether the data messaging lane is currently usable.
    fn messaging_open(&self) -> bool;

    /// Send one data-channel packet.
    fn send_data(&mut self, payload: &[u8], delivery: Delivery) -> Result<()>;

    /// Publish a capture track.
    fn publish_track(&mut self, track: &TrackHandle) -> Result<()>;

    /// Unpublish whatever track of `kind` is currently published.
    fn unpublish_track(&mut self, kind: TrackKind) -> Result<()>;

    /// Pop the next pending signal, if any. Never blocks.
    fn try_signal(&mut self) -> Option<ChannelSignal>;
}
