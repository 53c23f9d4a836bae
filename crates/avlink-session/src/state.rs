use serde::{Deserialize, Serialize};

/// Normalized view of one transport session, shared with subscribers.
///
/// `is_joined` means the transport handshake succeeded; `connected` means
/// the messaging channel is usable. The two resolve separately on most
/// transports, so `connected` may lag `is_joined`. Reset to default on
/// disconnect.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub is_joined: bool,
    pub connected: bool,
    pub participants: Vec<Participant>,
    pub network_quality: Option<NetworkQuality>,
    pub remote_stats: Option<RemoteStats>,
}

impl SessionState {
    /// Record a participant, replacing any previous entry for the identity.
    pub(crate) fn add_participant(&mut self, participant: Participant) {
        self.participants
            .retain(|p| p.identity != participant.identity);
        self.participants.push(participant);
    }

    /// Remove and return a participant by identity.
    pub(crate) fn remove_participant(&mut self, identity: &str) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.identity == identity)?;
        Some(self.participants.remove(index))
    }
}

/// A remote participant in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub identity: String,
    pub name: Option<String>,
}

/// Network quality, normalized from transport-native scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkQuality {
    Excellent,
    Good,
    Poor,
    Bad,
    Lost,
}

impl NetworkQuality {
    /// Map a transport-native 0..=5 score onto the shared vocabulary.
    pub fn from_score(score: u8) -> Self {
        match score {
            5 => NetworkQuality::Excellent,
            4 => NetworkQuality::Good,
            2 | 3 => NetworkQuality::Poor,
            1 => NetworkQuality::Bad,
            _ => NetworkQuality::Lost,
        }
    }
}

/// Remote connection statistics, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteStats {
    pub rtt_ms: u32,
    pub packet_loss_pct: f32,
}
