use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{ChannelSignal, Delivery, RealtimeChannel, TrackHandle, TrackKind};

/// In-process realtime channel, built as a connected pair.
///
/// Each endpoint owns an inbox of [`ChannelSignal`]s; data sent on one side
/// lands in the other side's inbox. Joins resolve synchronously, which makes
/// this the reference transport for tests and the demo CLI.
pub struct LoopbackChannel {
    side: &'static str,
    joined: bool,
    messaging: bool,
    identity: Option<String>,
    published: Vec<TrackHandle>,
    inbox: Arc<Mutex<VecDeque<ChannelSignal>>>,
    peer_inbox: Arc<Mutex<VecDeque<ChannelSignal>>>,
}

impl LoopbackChannel {
    /// Create a connected pair of endpoints.
    pub fn pair() -> (LoopbackChannel, LoopbackChannel) {
        let left_inbox = Arc::new(Mutex::new(VecDeque::new()));
        let right_inbox = Arc::new(Mutex::new(VecDeque::new()));

        let left = LoopbackChannel {
            side: "left",
            joined: false,
            messaging: false,
            identity: None,
            published: Vec::new(),
            inbox: Arc::clone(&left_inbox),
            peer_inbox: Arc::clone(&right_inbox),
        };
        let right = LoopbackChannel {
            side: "right",
            joined: false,
            messaging: false,
            identity: None,
            published: Vec::new(),
            inbox: right_inbox,
            peer_inbox: left_inbox,
        };
        (left, right)
    }

    /// Queue a signal on this endpoint's own inbox, as if the transport had
    /// raised it. Test hook for quality/stats/error signals.
    pub fn raise(&self, signal: ChannelSignal) {
        self.inbox.lock().expect("inbox lock").push_back(signal);
    }

    /// Tracks currently published by this endpoint.
    pub fn published(&self) -> &[TrackHandle] {
        &self.published
    }

    fn push_to_peer(&self, signal: ChannelSignal) {
        self.peer_inbox
            .lock()
            .expect("peer inbox lock")
            .push_back(signal);
    }
}

impl RealtimeChannel for LoopbackChannel {
    fn join(&mut self, room: &str, _token: &str) -> Result<()> {
        if room.is_empty() {
            return Err(TransportError::Join("empty room".to_string()));
        }
        if self.joined {
            return Ok(());
        }

        let identity = format!("{room}-{}", self.side);
        self.joined = true;
        self.messaging = true;
        self.identity = Some(identity.clone());
        debug!(room, identity, "loopback join");

        self.raise(ChannelSignal::Joined {
            identity: identity.clone(),
        });
        self.raise(ChannelSignal::MessagingReady);
        self.push_to_peer(ChannelSignal::PeerJoined {
            identity,
            name: None,
        });
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if !self.joined {
            return Ok(());
        }
        self.joined = false;
        self.messaging = false;
        self.published.clear();

        if let Some(identity) = self.identity.take() {
            self.push_to_peer(ChannelSignal::PeerLeft { identity });
        }
        self.raise(ChannelSignal::Left);
        Ok(())
    }

    fn local_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn messaging_open(&self) -> bool {
        self.messaging
    }

    fn send_data(&mut self, payload: &[u8], delivery: Delivery) -> Result<()> {
        if !self.joined {
            return Err(TransportError::NotJoined);
        }
        self.push_to_peer(ChannelSignal::Data {
            bytes: payload.to_vec(),
            delivery,
        });
        Ok(())
    }

    fn publish_track(&mut self, track: &TrackHandle) -> Result<()> {
        if !self.joined {
            return Err(TransportError::NotJoined);
        }
        self.published.retain(|t| t.kind != track.kind);
        self.published.push(track.clone());
        Ok(())
    }

    fn unpublish_track(&mut self, kind: TrackKind) -> Result<()> {
        if !self.joined {
            return Err(TransportError::NotJoined);
        }
        self.published.retain(|t| t.kind != kind);
        Ok(())
    }

    fn try_signal(&mut self) -> Option<ChannelSignal> {
        self.inbox.lock().expect("inbox lock").pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(channel: &mut LoopbackChannel) -> Vec<ChannelSignal> {
        std::iter::from_fn(|| channel.try_signal()).collect()
    }

    #[test]
    fn join_raises_identity_and_readiness() {
        let (mut left, mut right) = LoopbackChannel::pair();
        left.join("room", "token").unwrap();

        assert_eq!(left.local_identity().as_deref(), Some("room-left"));
        assert!(left.messaging_open());

        let signals = drain(&mut left);
        assert!(matches!(&signals[0], ChannelSignal::Joined { identity } if identity == "room-left"));
        assert!(matches!(signals[1], ChannelSignal::MessagingReady));

        let peer_signals = drain(&mut right);
        assert!(
            matches!(&peer_signals[0], ChannelSignal::PeerJoined { identity, .. } if identity == "room-left")
        );
    }

    #[test]
    fn data_crosses_to_peer_with_delivery_hint() {
        let (mut left, mut right) = LoopbackChannel::pair();
        left.join("room", "t").unwrap();
        right.join("room", "t").unwrap();
        drain(&mut left);
        drain(&mut right);

        left.send_data(b"ping", Delivery::Reliable).unwrap();
        let signals = drain(&mut right);
        assert_eq!(
            signals,
            vec![ChannelSignal::Data {
                bytes: b"ping".to_vec(),
                delivery: Delivery::Reliable,
            }]
        );
    }

    #[test]
    fn send_before_join_is_refused() {
        let (mut left, _right) = LoopbackChannel::pair();
        let err = left.send_data(b"x", Delivery::BestEffort).unwrap_err();
        assert!(matches!(err, TransportError::NotJoined));
    }

    #[test]
    fn leave_is_idempotent_and_notifies_peer() {
        let (mut left, mut right) = LoopbackChannel::pair();
        left.join("room", "t").unwrap();
        left.leave().unwrap();
        left.leave().unwrap();

        assert!(!left.messaging_open());
        assert!(left.local_identity().is_none());

        let peer_signals = drain(&mut right);
        let lefts = peer_signals
            .iter()
            .filter(|s| matches!(s, ChannelSignal::PeerLeft { .. }))
            .count();
        assert_eq!(lefts, 1);
    }

    #[test]
    fn publish_replaces_same_kind_and_unpublish_removes() {
        let (mut left, _right) = LoopbackChannel::pair();
        left.join("room", "t").unwrap();

        left.publish_track(&TrackHandle::new("cam-1", TrackKind::Video))
            .unwrap();
        left.publish_track(&TrackHandle::new("cam-2", TrackKind::Video))
            .unwrap();
        left.publish_track(&TrackHandle::new("mic-1", TrackKind::Audio))
            .unwrap();
        assert_eq!(left.published().len(), 2);

        left.unpublish_track(TrackKind::Video).unwrap();
        assert_eq!(left.published().len(), 1);
        assert_eq!(left.published()[0].id, "mic-1");
    }

    #[test]
    fn empty_room_is_a_join_error() {
        let (mut left, _right) = LoopbackChannel::pair();
        let err = left.join("", "t").unwrap_err();
        assert!(matches!(err, TransportError::Join(_)));
    }
}
