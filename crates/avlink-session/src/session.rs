use avlink_frame::CommandPayload;
use avlink_transport::{TrackHandle, TrackKind};

use crate::credentials::Credentials;
use crate::error::Result;
use crate::retry::ReadyOutcome;
use crate::state::SessionState;

/// The transport/provider flavor backing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Selective-forwarding-unit rooms with separately negotiated messaging.
    Sfu,
    /// Relay endpoints where join and messaging resolve together.
    Relay,
    /// Reserved; constructing it is allowed, using it is not.
    Broadcast,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Sfu => "sfu",
            ProviderKind::Relay => "relay",
            ProviderKind::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

/// Outcome of a command send: ran, or the channel never became ready.
pub type CommandDispatch = ReadyOutcome<()>;

/// One provider-backed avatar session: connection lifecycle, media
/// publication, chunked chat, readiness-guarded commands, and a `pump`
/// that drains transport signals into normalized events.
///
/// Implementations take `&mut self` for every lifecycle operation, so
/// connect/disconnect interleavings are serialized by construction.
pub trait AvatarSession: Send {
    /// Which provider this session speaks to.
    fn provider(&self) -> ProviderKind;

    /// Validate credentials and join the provider's room. Idempotent while
    /// connected is left to the transport; callers go through the
    /// coordinator, which never double-connects.
    fn connect(&mut self, credentials: &Credentials) -> Result<()>;

    /// Tear down the connection. Never fails: transport errors during
    /// teardown are logged and swallowed. Safe to call repeatedly.
    fn disconnect(&mut self);

    /// Publish a capture track to the room.
    fn publish(&mut self, track: &TrackHandle) -> Result<()>;

    /// Unpublish the currently published track of `kind`.
    fn unpublish(&mut self, kind: TrackKind) -> Result<()>;

    /// Send chat text, chunked and paced. Returns the message id.
    fn send_chat(&mut self, text: &str) -> Result<String>;

    /// Send a control command once the channel is ready.
    fn send_command(&mut self, payload: CommandPayload) -> Result<CommandDispatch>;

    /// Whether the messaging channel is ready for sends right now.
    fn channel_ready(&self) -> bool;

    /// Snapshot of the normalized session state.
    fn state(&self) -> SessionState;

    /// Drain pending transport signals, updating state and emitting events.
    /// Returns the number of signals processed.
    fn pump(&mut self) -> usize;
}
