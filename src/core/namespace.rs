//! Namespace identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CoreError, InvalidId};

/// Namespace identifier - `[a-z][a-z0-9_]*`, at most 32 bytes.
///
/// Namespaces partition draft registers under a session; the conventional
/// namespace for a single-editor caller is `default`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceId(String);

impl NamespaceId {
    pub const DEFAULT: &'static str = "default";
    const MAX_LEN: usize = 32;

    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let raw = s.into();
        if raw.is_empty() {
            return Err(InvalidId::Namespace {
                raw,
                reason: "empty".into(),
            }
            .into());
        }
        if raw.len() > Self::MAX_LEN {
            return Err(InvalidId::Namespace {
                raw,
                reason: format!("length must be <= {}", Self::MAX_LEN),
            }
            .into());
        }
        let bytes = raw.as_bytes();
        let first = bytes[0];
        if !first.is_ascii_lowercase() {
            return Err(InvalidId::Namespace {
                raw,
                reason: "must start with [a-z]".into(),
            }
            .into());
        }
        for &b in &bytes[1..] {
            let ok = b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_';
            if !ok {
                return Err(InvalidId::Namespace {
                    raw,
                    reason: "contains invalid character".into(),
                }
                .into());
            }
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NamespaceId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespaceId({:?})", self.0)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NamespaceId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        NamespaceId::parse(s)
    }
}

impl From<NamespaceId> for String {
    fn from(id: NamespaceId) -> String {
        id.0
    }
}
