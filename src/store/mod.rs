//! SQLite-backed draft store.
//!
//! One database file holds the `sessions` and `session_drafts` relations.
//! Connections are opened per operation; the `BEGIN IMMEDIATE` transaction
//! inside `set` is the only mutual-exclusion region, and WAL mode keeps
//! readers unblocked while it runs.

mod drafts;
mod error;
mod schema;
mod sessions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use error::StoreError;
pub use schema::DurabilityMode;
pub use sessions::Session;

use drafts::SqliteDrafts;
use sessions::SqliteSessions;

use crate::core::{Clock, Draft, NamespaceId, SessionId, SkewWindow, SystemClock, WallClock};

/// Draft register operations.
///
/// `set` never fails for LWW reasons: a losing write is a normal outcome and
/// the returned draft is the authoritative state either way.
pub trait DraftStore: Send + Sync {
    fn get(
        &self,
        session_id: &SessionId,
        namespace: &NamespaceId,
    ) -> Result<Option<Draft>, StoreError>;

    fn set(
        &self,
        session_id: &SessionId,
        namespace: &NamespaceId,
        text: &str,
        client_timestamp: WallClock,
    ) -> Result<Draft, StoreError>;

    fn clear(&self, session_id: &SessionId, namespace: &NamespaceId) -> Result<(), StoreError>;
}

/// Session lifecycle operations consumed by the session subsystem.
pub trait SessionStore: Send + Sync {
    fn create(&self, namespace: &NamespaceId) -> Result<Session, StoreError>;
    fn get(&self, session_id: &SessionId) -> Result<Option<Session>, StoreError>;
    fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError>;
}

/// Handle on an opened store directory.
pub struct Store {
    db_path: PathBuf,
    mode: DurabilityMode,
    clock: Arc<dyn Clock>,
    skew: SkewWindow,
}

impl Store {
    /// Open (creating if needed) the store under `dir` with the system clock
    /// and default skew tolerance.
    pub fn open(dir: &Path, mode: DurabilityMode) -> Result<Self, StoreError> {
        Self::open_with_clock(dir, mode, SkewWindow::default(), Arc::new(SystemClock))
    }

    /// Open the store at the default data location using `config`.
    pub fn open_default(config: &crate::config::Config) -> Result<Self, StoreError> {
        Self::open_at(&crate::paths::store_dir(), config)
    }

    /// Open the store under `dir` using `config`.
    pub fn open_at(dir: &Path, config: &crate::config::Config) -> Result<Self, StoreError> {
        Self::open_with_clock(dir, config.durability, config.skew, Arc::new(SystemClock))
    }

    /// Open with an explicit time source. Tests use this with a manual clock.
    pub fn open_with_clock(
        dir: &Path,
        mode: DurabilityMode,
        skew: SkewWindow,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let db_path = schema::prepare(dir, mode)?;
        Ok(Self {
            db_path,
            mode,
            clock,
            skew,
        })
    }

    pub fn durability_mode(&self) -> DurabilityMode {
        self.mode
    }

    pub fn drafts(&self) -> Box<dyn DraftStore> {
        Box::new(SqliteDrafts {
            db_path: self.db_path.clone(),
            mode: self.mode,
            clock: self.clock.clone(),
            skew: self.skew,
        })
    }

    pub fn sessions(&self) -> Box<dyn SessionStore> {
        Box::new(SqliteSessions {
            db_path: self.db_path.clone(),
            mode: self.mode,
            clock: self.clock.clone(),
        })
    }
}
