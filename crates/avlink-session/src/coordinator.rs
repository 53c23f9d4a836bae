use std::collections::HashMap;
use std::sync::Arc;

use avlink_frame::CommandPayload;
use avlink_transport::{TrackHandle, TrackKind};
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::session::{AvatarSession, CommandDispatch, ProviderKind};
use crate::state::SessionState;

/// Constructs a session for one provider, wired to the coordinator's bus.
pub type SessionFactory =
    Box<dyn Fn(Arc<EventBus>) -> std::result::Result<Box<dyn AvatarSession>, SessionError> + Send>;

/// Maps provider kinds to session factories. The caller decides which
/// transports exist; the coordinator only switches between them.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<ProviderKind, SessionFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        kind: ProviderKind,
        factory: impl Fn(Arc<EventBus>) -> std::result::Result<Box<dyn AvatarSession>, SessionError>
            + Send
            + 'static,
    ) -> &mut Self {
        self.factories.insert(kind, Box::new(factory));
        self
    }
}

/// Owns at most one live session at a time and serializes every transition.
///
/// Selecting the already-active provider is a no-op that keeps the session.
/// Switching providers tears the old session down completely before the new
/// one is constructed, so two sessions never hold transport resources at
/// once.
pub struct SessionCoordinator {
    registry: ProviderRegistry,
    bus: Arc<EventBus>,
    current: Option<(ProviderKind, Box<dyn AvatarSession>)>,
}

impl SessionCoordinator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            bus: Arc::new(EventBus::new()),
            current: None,
        }
    }

    /// Subscribe to normalized events from whichever session is active.
    /// Subscriptions survive provider switches.
    pub fn subscribe(&self, callback: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.bus.subscribe(callback);
    }

    /// Make `kind` the active provider.
    ///
    /// Re-selecting the active kind reuses the live session with zero
    /// teardown. On a real switch the old session is fully disconnected
    /// before the new one is constructed; if construction then fails, no
    /// session is active.
    pub fn select_provider(&mut self, kind: ProviderKind) -> Result<()> {
        let reuse = matches!(&self.current, Some((active, _)) if *active == kind);
        if reuse {
            debug!(provider = %kind, "provider already active");
            return Ok(());
        }

        if let Some((old_kind, mut old)) = self.current.take() {
            info!(from = %old_kind, to = %kind, "switching provider");
            old.disconnect();
        }

        let factory = self
            .registry
            .factories
            .get(&kind)
            .ok_or(SessionError::ProviderUnavailable("provider not registered"))?;
        let session = factory(Arc::clone(&self.bus))?;
        self.current = Some((kind, session));
        Ok(())
    }

    /// The active provider kind, if any session is live.
    pub fn active_provider(&self) -> Option<ProviderKind> {
        self.current.as_ref().map(|(kind, _)| *kind)
    }

    /// Connect the active session with `credentials`.
    pub fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        self.active_mut()?.connect(credentials)
    }

    /// Disconnect the active session, if any. Never fails.
    pub fn disconnect(&mut self) {
        if let Some((_, session)) = self.current.as_mut() {
            session.disconnect();
        }
    }

    pub fn publish(&mut self, track: &TrackHandle) -> Result<()> {
        self.active_mut()?.publish(track)
    }

    pub fn unpublish(&mut self, kind: TrackKind) -> Result<()> {
        self.active_mut()?.unpublish(kind)
    }

    pub fn send_chat(&mut self, text: &str) -> Result<String> {
        self.active_mut()?.send_chat(text)
    }

    pub fn send_command(&mut self, payload: CommandPayload) -> Result<CommandDispatch> {
        self.active_mut()?.send_command(payload)
    }

    /// Snapshot of the active session's state; default when none is active.
    pub fn state(&self) -> SessionState {
        self.current
            .as_ref()
            .map(|(_, session)| session.state())
            .unwrap_or_default()
    }

    /// Drain transport signals on the active session.
    pub fn pump(&mut self) -> usize {
        self.current
            .as_mut()
            .map(|(_, session)| session.pump())
            .unwrap_or(0)
    }

    /// Tear everything down and drop the active session.
    pub fn shutdown(&mut self) {
        if let Some((kind, mut session)) = self.current.take() {
            info!(provider = %kind, "shutting down coordinator");
            session.disconnect();
        }
    }

    fn active_mut(&mut self) -> Result<&mut Box<dyn AvatarSession>> {
        self.current
            .as_mut()
            .map(|(_, session)| session)
            .ok_or(SessionError::ProviderUnavailable("no active provider"))
    }
}
