use std::sync::Arc;

use avlink_frame::CommandPayload;
use avlink_transport::{RealtimeChannel, TrackHandle, TrackKind};
use tracing::info;

use crate::credentials::Credentials;
use crate::error::Result;
use crate::events::EventBus;
use crate::providers::ChannelDriver;
use crate::session::{AvatarSession, CommandDispatch, ProviderKind};
use crate::state::SessionState;

/// Session against a relay-style provider. Credentials carry an endpoint and
/// a token, and the messaging lane comes up with the join itself, so
/// `connected` is set as soon as the handshake resolves.
pub struct RelaySession {
    driver: ChannelDriver,
}

impl RelaySession {
    pub fn new(channel: Box<dyn RealtimeChannel>, bus: Arc<EventBus>) -> Self {
        Self {
            driver: ChannelDriver::new(channel, bus, true),
        }
    }
}

impl AvatarSession for RelaySession {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Relay
    }

    fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        let (endpoint, token) = credentials.expect_relay()?;
        info!(endpoint, "connecting relay session");
        self.driver.join(endpoint, token)
    }

    fn disconnect(&mut self) {
        self.driver.disconnect();
    }

    fn publish(&mut self, track: &TrackHandle) -> Result<()> {
        self.driver.publish(track)
    }

    fn unpublish(&mut self, kind: TrackKind) -> Result<()> {
        self.driver.unpublish(kind)
    }

    fn send_chat(&mut self, text: &str) -> Result<String> {
        self.driver.send_chat(text)
    }

    fn send_command(&mut self, payload: CommandPayload) -> Result<CommandDispatch> {
        self.driver.send_command(payload)
    }

    fn channel_ready(&self) -> bool {
        self.driver.channel_ready()
    }

    fn state(&self) -> SessionState {
        self.driver.state()
    }

    fn pump(&mut self) -> usize {
        self.driver.pump()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use avlink_transport::LoopbackChannel;

    use super::*;
    use crate::error::SessionError;
    use crate::events::SessionEvent;

    fn session() -> (RelaySession, Arc<Mutex<Vec<SessionEvent>>>) {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let (channel, _peer) = LoopbackChannel::pair();
        (RelaySession::new(Box::new(channel), bus), seen)
    }

    #[test]
    fn connect_resolves_joined_and_connected_together() {
        let (mut session, seen) = session();
        session
            .connect(&Credentials::Relay {
                endpoint: "wss://relay.example".to_string(),
                token: "tok".to_string(),
            })
            .unwrap();

        let state = session.state();
        assert!(state.is_joined);
        assert!(state.connected);
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, SessionEvent::StateChanged(s) if s.connected)));
    }

    #[test]
    fn sfu_credentials_are_rejected() {
        let (mut session, _seen) = session();
        let err = session
            .connect(&Credentials::Sfu {
                app_id: "app".to_string(),
                room: "room".to_string(),
                token: "tok".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidCredentials { expected: "relay" }
        ));
    }

    #[test]
    fn chat_round_trip_after_connect() {
        let bus = Arc::new(EventBus::new());
        let (left, mut right) = LoopbackChannel::pair();
        right.join("wss://relay.example", "tok").unwrap();
        let mut session = RelaySession::new(Box::new(left), bus);
        session
            .connect(&Credentials::Relay {
                endpoint: "wss://relay.example".to_string(),
                token: "tok".to_string(),
            })
            .unwrap();

        let message_id = session.send_chat("hello avatar").unwrap();
        assert!(!message_id.is_empty());
    }
}
