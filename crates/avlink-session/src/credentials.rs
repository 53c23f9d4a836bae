use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Credentials handed to `connect`, produced by an out-of-scope
/// session-creation API. Each provider validates its own variant's shape
/// before touching the channel; everything else is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Credentials {
    Sfu {
        app_id: String,
        room: String,
        token: String,
    },
    Relay {
        endpoint: String,
        token: String,
    },
}

impl Credentials {
    pub(crate) fn expect_sfu(&self) -> Result<(&str, &str, &str), SessionError> {
        match self {
            Credentials::Sfu {
                app_id,
                room,
                token,
            } if !app_id.is_empty() && !room.is_empty() && !token.is_empty() => {
                Ok((app_id, room, token))
            }
            _ => Err(SessionError::InvalidCredentials { expected: "sfu" }),
        }
    }

    pub(crate) fn expect_relay(&self) -> Result<(&str, &str), SessionError> {
        match self {
            Credentials::Relay { endpoint, token }
                if !endpoint.is_empty() && !token.is_empty() =>
            {
                Ok((endpoint, token))
            }
            _ => Err(SessionError::InvalidCredentials { expected: "relay" }),
        }
    }
}
