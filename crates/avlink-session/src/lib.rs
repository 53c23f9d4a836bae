//! Provider sessions and the coordinator that switches between them.
//!
//! A session wraps one [`RealtimeChannel`] and layers the avlink protocol on
//! top of it: chunked, paced chat, readiness-guarded commands, and a
//! normalized state/event vocabulary. The [`SessionCoordinator`] owns at most
//! one session at a time and serializes provider switches.
//!
//! [`RealtimeChannel`]: avlink_transport::RealtimeChannel

pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod events;
pub mod messaging;
pub mod providers;
pub mod retry;
pub mod session;
pub mod state;

pub use coordinator::{ProviderRegistry, SessionCoordinator, SessionFactory};
pub use credentials::Credentials;
pub use error::{Result, SessionError};
pub use events::{EventBus, SessionEvent};
pub use messaging::Messaging;
pub use providers::{BroadcastSession, RelaySession, SfuSession};
pub use retry::{NotReadyReport, ReadyOutcome, RetryPolicy};
pub use session::{AvatarSession, CommandDispatch, ProviderKind};
pub use state::{NetworkQuality, Participant, RemoteStats, SessionState};
