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

/// Session against an SFU-style provider. Credentials carry an app id, a
/// room, and a token; the messaging lane is negotiated separately from the
/// join, so `connected` lags `is_joined` until the transport raises
/// readiness.
pub struct SfuSession {
    driver: ChannelDriver,
}

impl SfuSession {
    pub fn new(channel: Box<dyn RealtimeChannel>, bus: Arc<EventBus>) -> Self {
        Self {
            driver: ChannelDriver::new(channel, bus, false),
        }
    }
}

impl AvatarSession for SfuSession {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Sfu
    }

    fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        let (app_id, room, token) = credentials.expect_sfu()?;
        info!(app_id, room, "connecting sfu session");
        self.driver.join(room, token)
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
