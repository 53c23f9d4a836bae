use avlink_frame::CommandPayload;
use avlink_transport::{TrackHandle, TrackKind};

use crate::credentials::Credentials;
use crate::error::{Result, SessionError};
use crate::session::{AvatarSession, CommandDispatch, ProviderKind};
use crate::state::SessionState;

/// Reserved provider slot. Constructing one succeeds so registries can list
/// it; every operation fails fast with a clear error instead of panicking.
#[derive(Debug, Default)]
pub struct BroadcastSession;

impl BroadcastSession {
    pub fn new() -> Self {
        Self
    }
}

const UNIMPLEMENTED: SessionError = SessionError::Unimplemented("broadcast provider");

impl AvatarSession for BroadcastSession {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Broadcast
    }

    fn connect(&mut self, _credentials: &Credentials) -> Result<()> {
        Err(UNIMPLEMENTED)
    }

    fn disconnect(&mut self) {}

    fn publish(&mut self, _track: &TrackHandle) -> Result<()> {
        Err(UNIMPLEMENTED)
    }

    fn unpublish(&mut self, _kind: TrackKind) -> Result<()> {
        Err(UNIMPLEMENTED)
    }

    fn send_chat(&mut self, _text: &str) -> Result<String> {
        Err(UNIMPLEMENTED)
    }

    fn send_command(&mut self, _payload: CommandPayload) -> Result<CommandDispatch> {
        Err(UNIMPLEMENTED)
    }

    fn channel_ready(&self) -> bool {
        false
    }

    fn state(&self) -> SessionState {
        SessionState::default()
    }

    fn pump(&mut self) -> usize {
        0
    }
}
