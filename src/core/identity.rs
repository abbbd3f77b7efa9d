//! Layer 1: Identity atoms
//!
//! SessionId: opaque identifier minted by the session subsystem.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CoreError, InvalidId};

/// Session identifier - opaque non-empty string.
///
/// The session subsystem owns minting; generated ids are UUIDv4 strings, but
/// any non-empty string up to the length cap is accepted for interop with
/// callers that bring their own ids.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    const MAX_LEN: usize = 128;

    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let raw = s.into();
        if raw.is_empty() {
            return Err(InvalidId::Session {
                raw,
                reason: "empty".into(),
            }
            .into());
        }
        if raw.len() > Self::MAX_LEN {
            return Err(InvalidId::Session {
                raw,
                reason: format!("length must be <= {}", Self::MAX_LEN),
            }
            .into());
        }
        if raw.bytes().any(|b| b.is_ascii_control()) {
            return Err(InvalidId::Session {
                raw,
                reason: "contains control character".into(),
            }
            .into());
        }
        Ok(Self(raw))
    }

    /// Mint a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({:?})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        SessionId::parse(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> String {
        id.0
    }
}
