//! Session lifecycle: the ownership side of the draft schema.
//!
//! Sessions are minted here; drafts reference them by id and are removed by
//! the schema's `ON DELETE CASCADE` when their session goes away.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};

use super::schema::{self, DurabilityMode};
use super::{SessionStore, StoreError};
use crate::core::{Clock, NamespaceId, SessionId, WallClock};

/// A session row: the owner of zero or more draft registers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub namespace: NamespaceId,
    pub created_at_ms: WallClock,
}

pub(crate) struct SqliteSessions {
    pub(crate) db_path: PathBuf,
    pub(crate) mode: DurabilityMode,
    pub(crate) clock: Arc<dyn Clock>,
}

impl SessionStore for SqliteSessions {
    fn create(&self, namespace: &NamespaceId) -> Result<Session, StoreError> {
        let id = SessionId::generate();
        let created_at_ms = self.clock.now();
        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        conn.execute(
            "INSERT INTO sessions (session_id, namespace, created_at_ms) VALUES (?1, ?2, ?3)",
            params![id.as_str(), namespace.as_str(), created_at_ms.0 as i64],
        )?;
        tracing::info!(session_id = %id, namespace = %namespace, "session created");
        Ok(Session {
            id,
            namespace: namespace.clone(),
            created_at_ms,
        })
    }

    fn get(&self, session_id: &SessionId) -> Result<Option<Session>, StoreError> {
        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        let row = conn
            .query_row(
                "SELECT namespace, created_at_ms FROM sessions WHERE session_id = ?1",
                params![session_id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((namespace, created_at_ms)) => {
                let namespace = NamespaceId::parse(namespace)
                    .map_err(|err| StoreError::RowDecode(err.to_string()))?;
                let created_at_ms = u64::try_from(created_at_ms).map_err(|_| {
                    StoreError::RowDecode("created_at_ms out of range".to_string())
                })?;
                Ok(Some(Session {
                    id: session_id.clone(),
                    namespace,
                    created_at_ms: WallClock(created_at_ms),
                }))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        // CASCADE removes the session's drafts in every namespace.
        let removed = conn.execute(
            "DELETE FROM sessions WHERE session_id = ?1",
            params![session_id.as_str()],
        )?;
        if removed > 0 {
            tracing::info!(session_id = %session_id, "session deleted");
        }
        Ok(removed > 0)
    }
}
