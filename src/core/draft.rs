//! Layer 2: The register value.

use serde::{Deserialize, Serialize};

use super::time::WallClock;

/// A draft register's value: the text payload and the LWW stamp it carries.
///
/// Every draft operation returns the authoritative stored pair; after a `set`
/// the caller compares what came back with what it sent to learn whether the
/// write was accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub text: String,
    pub timestamp: WallClock,
}

impl Draft {
    pub fn new(text: impl Into<String>, timestamp: WallClock) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}
