use std::sync::{Arc, Mutex};

use avlink_frame::ChatSource;

use crate::state::{NetworkQuality, Participant, SessionState};

/// Normalized event emitted to coordinator subscribers. Transport-native
/// shapes never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session's normalized state changed.
    StateChanged(SessionState),
    ParticipantJoined(Participant),
    ParticipantLeft(Participant),
    NetworkQuality(NetworkQuality),
    /// One chunk of an in-flight chat message, for progressive display.
    /// `first` marks the arrival that started the message.
    ChatChunk {
        message_id: String,
        text: String,
        first: bool,
    },
    /// A complete chat message (single-frame, or fully reassembled).
    ChatMessage {
        message_id: String,
        text: String,
        from: ChatSource,
    },
    /// Acknowledgment for a previously sent command.
    CommandAck {
        cmd: String,
        code: i64,
        msg: Option<String>,
    },
    /// A typed event notification from the avatar endpoint.
    AvatarEvent {
        name: String,
        data: Option<serde_json::Value>,
    },
    /// Inbound bytes that did not decode as a frame, surfaced as opaque
    /// text rather than dropped.
    SystemText(String),
    /// An asynchronous error, normalized onto the subscriber channel.
    Error(String),
}

type Subscriber = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Fan-out point for normalized session events. One bus per coordinator;
/// the mutex scope matches that ownership.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every subsequent event.
    pub fn subscribe(&self, callback: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .expect("subscriber lock")
            .push(Arc::new(callback));
    }

    /// Deliver an event to every subscriber, in registration order. The
    /// subscriber list is cloned out of the lock first, so callbacks may
    /// themselves subscribe or emit without deadlocking.
    pub fn emit(&self, event: &SessionEvent) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .expect("subscriber lock")
            .clone();
        for subscriber in subscribers {
            subscriber(event);
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("subscriber lock").len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn events_fan_out_to_all_subscribers() {
        let bus = EventBus::new();
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen_a);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        let sink = Arc::clone(&seen_b);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        bus.emit(&SessionEvent::Error("boom".to_string()));

        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 1);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.emit(&SessionEvent::StateChanged(SessionState::default()));
    }

    #[test]
    fn callbacks_may_subscribe_reentrantly() {
        let bus = Arc::new(EventBus::new());
        let handle = Arc::clone(&bus);
        bus.subscribe(move |_| handle.subscribe(|_| {}));

        bus.emit(&SessionEvent::Error("first".to_string()));
        assert_eq!(bus.subscriber_count(), 2);

        // Late subscribers see only subsequent events.
        bus.emit(&SessionEvent::Error("second".to_string()));
        assert_eq!(bus.subscriber_count(), 3);
    }
}
