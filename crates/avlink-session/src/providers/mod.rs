//! Concrete provider sessions.
//!
//! [`SfuSession`] and [`RelaySession`] differ in credential shape and in how
//! join and messaging readiness resolve; everything after join is the shared
//! [`ChannelDriver`]. [`BroadcastSession`] is a reserved slot that fails fast.

mod broadcast;
mod relay;
mod sfu;

use std::sync::Arc;

use avlink_frame::CommandPayload;
use avlink_transport::{ChannelSignal, RealtimeChannel, TrackHandle, TrackKind};
use tracing::{debug, error, warn};

pub use broadcast::BroadcastSession;
pub use relay::RelaySession;
pub use sfu::SfuSession;

use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::messaging::Messaging;
use crate::session::CommandDispatch;
use crate::state::{NetworkQuality, Participant, RemoteStats, SessionState};

/// Provider-independent half of a session: owns the channel, the messaging
/// engine, and the normalized state, and drains transport signals into
/// events. Providers wrap one of these and contribute only their credential
/// validation and join semantics.
pub(crate) struct ChannelDriver {
    channel: Box<dyn RealtimeChannel>,
    messaging: Messaging,
    state: SessionState,
    bus: Arc<EventBus>,
    /// Whether a successful join implies the messaging lane is open, or
    /// whether readiness arrives later as its own signal.
    join_opens_messaging: bool,
}

impl ChannelDriver {
    pub(crate) fn new(
        channel: Box<dyn RealtimeChannel>,
        bus: Arc<EventBus>,
        join_opens_messaging: bool,
    ) -> Self {
        Self {
            channel,
            messaging: Messaging::default(),
            state: SessionState::default(),
            bus,
            join_opens_messaging,
        }
    }

    pub(crate) fn join(&mut self, room: &str, token: &str) -> Result<()> {
        self.channel.join(room, token).map_err(|e| {
            error!(room, error = %e, "join failed");
            SessionError::ConnectionFailed(e.to_string())
        })?;

        self.state.is_joined = true;
        if self.join_opens_messaging {
            self.state.connected = true;
        }
        debug!(room, "session joined");
        self.bus.emit(&SessionEvent::StateChanged(self.state.clone()));
        Ok(())
    }

    /// Teardown never fails; transport errors here are logged and swallowed.
    pub(crate) fn disconnect(&mut self) {
        if let Err(error) = self.channel.leave() {
            warn!(%error, "leave failed during teardown");
        }
        self.messaging.clear();
        if self.state != SessionState::default() {
            self.state = SessionState::default();
            self.bus.emit(&SessionEvent::StateChanged(self.state.clone()));
        }
    }

    pub(crate) fn publish(&mut self, track: &TrackHandle) -> Result<()> {
        Ok(self.channel.publish_track(track)?)
    }

    pub(crate) fn unpublish(&mut self, kind: TrackKind) -> Result<()> {
        Ok(self.channel.unpublish_track(kind)?)
    }

    pub(crate) fn send_chat(&mut self, text: &str) -> Result<String> {
        self.messaging.send_chat(self.channel.as_mut(), text)
    }

    pub(crate) fn send_command(&mut self, payload: CommandPayload) -> Result<CommandDispatch> {
        self.messaging.send_command(self.channel.as_mut(), payload)
    }

    pub(crate) fn channel_ready(&self) -> bool {
        self.channel.messaging_open() && self.channel.local_identity().is_some()
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Drain every pending signal, then emit one `StateChanged` if anything
    /// about the normalized state moved.
    pub(crate) fn pump(&mut self) -> usize {
        let before = self.state.clone();
        let mut handled = 0;
        while let Some(signal) = self.channel.try_signal() {
            handled += 1;
            self.apply(signal);
        }
        if self.state != before {
            self.bus.emit(&SessionEvent::StateChanged(self.state.clone()));
        }
        handled
    }

    fn apply(&mut self, signal: ChannelSignal) {
        match signal {
            ChannelSignal::Joined { identity } => {
                debug!(identity, "transport confirmed join");
                self.state.is_joined = true;
                if self.join_opens_messaging {
                    self.state.connected = true;
                }
            }
            ChannelSignal::MessagingReady => {
                self.state.connected = true;
            }
            ChannelSignal::Left => {
                // A Left we did not initiate is a lost connection; local
                // teardown resets state before this signal is ever pumped.
                if self.state.is_joined {
                    self.bus.emit(&SessionEvent::Error(
                        SessionError::ConnectionLost("transport left the room".to_string())
                            .to_string(),
                    ));
                    self.messaging.clear();
                    self.state = SessionState::default();
                }
            }
            ChannelSignal::Data { bytes, .. } => {
                self.messaging.handle_data(&bytes, &self.bus);
            }
            ChannelSignal::PeerJoined { identity, name } => {
                let participant = Participant { identity, name };
                self.state.add_participant(participant.clone());
                self.bus.emit(&SessionEvent::ParticipantJoined(participant));
            }
            ChannelSignal::PeerLeft { identity } => {
                if let Some(participant) = self.state.remove_participant(&identity) {
                    self.bus.emit(&SessionEvent::ParticipantLeft(participant));
                }
            }
            ChannelSignal::Quality { score } => {
                let quality = NetworkQuality::from_score(score);
                self.state.network_quality = Some(quality);
                self.bus.emit(&SessionEvent::NetworkQuality(quality));
            }
            ChannelSignal::Stats {
                rtt_ms,
                packet_loss_pct,
            } => {
                self.state.remote_stats = Some(RemoteStats {
                    rtt_ms,
                    packet_loss_pct,
                });
            }
            ChannelSignal::Error(message) => {
                warn!(message, "transport error");
                self.bus.emit(&SessionEvent::Error(message));
            }
        }
    }
}
