#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
mod paths;
pub mod store;
pub mod telemetry;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core and store types at crate root for convenience
pub use crate::core::{
    Clock, CoreError, Draft, InvalidId, ManualClock, NamespaceId, SessionId, Skew, SkewWindow,
    SystemClock, WallClock,
};
pub use crate::store::{DraftStore, DurabilityMode, Session, SessionStore, Store, StoreError};
