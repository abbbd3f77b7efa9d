//! Core domain types for drafts
//!
//! Module hierarchy follows type dependency order:
//! - time: wall clock, injected time source, skew tolerance (Layer 0)
//! - identity: SessionId (Layer 1)
//! - namespace: NamespaceId (Layer 1)
//! - draft: the register value (Layer 2)

pub mod draft;
pub mod error;
pub mod identity;
pub mod namespace;
pub mod time;

pub use draft::Draft;
pub use error::{CoreError, InvalidId};
pub use identity::SessionId;
pub use namespace::NamespaceId;
pub use time::{Clock, ManualClock, Skew, SkewWindow, SystemClock, WallClock};
