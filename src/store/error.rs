//! Store capability errors.
//!
//! LWW rejection and timestamp clamping are not errors: they resolve inside
//! `set` and show up only in the returned draft. Everything here is a genuine
//! infrastructure or integrity failure, surfaced after the transaction has
//! rolled back.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::core::{NamespaceId, SessionId};
use crate::error::{Effect, Transience};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("path is a symlink: {path:?}")]
    Symlink { path: PathBuf },
    #[error("store schema version mismatch: expected {expected}, got {got}")]
    SchemaVersionMismatch { expected: u32, got: u32 },
    #[error("missing meta key: {key}")]
    MetaMissing { key: &'static str },
    #[error("unknown session {session_id} for draft in namespace {namespace}")]
    UnknownSession {
        session_id: SessionId,
        namespace: NamespaceId,
    },
    #[error("row decode failed: {0}")]
    RowDecode(String),
}

impl StoreError {
    pub fn transience(&self) -> Transience {
        match self {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => Transience::Retryable,
                _ => Transience::Permanent,
            },
            StoreError::Sqlite(_) => Transience::Unknown,
            StoreError::Io { .. } => Transience::Unknown,
            StoreError::Symlink { .. }
            | StoreError::SchemaVersionMismatch { .. }
            | StoreError::MetaMissing { .. }
            | StoreError::UnknownSession { .. }
            | StoreError::RowDecode(_) => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            // Typed failures surface only after rollback.
            StoreError::Symlink { .. }
            | StoreError::SchemaVersionMismatch { .. }
            | StoreError::MetaMissing { .. }
            | StoreError::UnknownSession { .. }
            | StoreError::RowDecode(_) => Effect::None,
            StoreError::Sqlite(_) | StoreError::Io { .. } => Effect::Unknown,
        }
    }
}
