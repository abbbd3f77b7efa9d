//! Draft register operations: get / set (LWW compare-and-set) / clear.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension, params};

use super::schema::{self, DurabilityMode, ImmediateTxn};
use super::{DraftStore, StoreError};
use crate::core::{Clock, Draft, NamespaceId, SessionId, SkewWindow, WallClock};

pub(crate) struct SqliteDrafts {
    pub(crate) db_path: PathBuf,
    pub(crate) mode: DurabilityMode,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) skew: SkewWindow,
}

impl DraftStore for SqliteDrafts {
    fn get(
        &self,
        session_id: &SessionId,
        namespace: &NamespaceId,
    ) -> Result<Option<Draft>, StoreError> {
        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        read_draft(&conn, session_id, namespace)
    }

    fn set(
        &self,
        session_id: &SessionId,
        namespace: &NamespaceId,
        text: &str,
        client_timestamp: WallClock,
    ) -> Result<Draft, StoreError> {
        // Clamp once, before any comparison: the clamped stamp is what
        // competes in LWW and what gets persisted.
        let server_time = self.clock.now();
        let (stamp, violated) = self.skew.clamp(client_timestamp, server_time);
        if let Some(bound) = violated {
            tracing::warn!(
                session_id = %session_id,
                namespace = %namespace,
                client_ms = client_timestamp.0,
                server_ms = server_time.0,
                bound = ?bound,
                "draft timestamp outside tolerance, using server time"
            );
        }

        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        let txn = ImmediateTxn::begin(conn)?;

        if let Some(existing) = read_draft(txn.conn(), session_id, namespace)?
            && existing.timestamp > stamp
        {
            // Reject older update, return current draft.
            txn.rollback()?;
            tracing::debug!(
                session_id = %session_id,
                namespace = %namespace,
                incoming_ms = stamp.0,
                existing_ms = existing.timestamp.0,
                "rejected older draft update"
            );
            return Ok(existing);
        }

        let upsert = txn.conn().execute(
            "INSERT INTO session_drafts (session_id, namespace, draft_text, draft_timestamp) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(session_id, namespace) DO UPDATE SET \
               draft_text = excluded.draft_text, \
               draft_timestamp = excluded.draft_timestamp",
            params![
                session_id.as_str(),
                namespace.as_str(),
                text,
                stamp.0 as i64
            ],
        );
        match upsert {
            Ok(_) => {}
            Err(err) if schema::is_foreign_key_violation(&err) => {
                return Err(StoreError::UnknownSession {
                    session_id: session_id.clone(),
                    namespace: namespace.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        }
        txn.commit()?;

        tracing::debug!(
            session_id = %session_id,
            namespace = %namespace,
            timestamp_ms = stamp.0,
            len = text.len(),
            "draft saved"
        );
        Ok(Draft::new(text, stamp))
    }

    fn clear(&self, session_id: &SessionId, namespace: &NamespaceId) -> Result<(), StoreError> {
        let conn = schema::open_connection(&self.db_path, self.mode, false)?;
        let removed = conn.execute(
            "DELETE FROM session_drafts WHERE session_id = ?1 AND namespace = ?2",
            params![session_id.as_str(), namespace.as_str()],
        )?;
        if removed > 0 {
            tracing::debug!(session_id = %session_id, namespace = %namespace, "draft cleared");
        }
        Ok(())
    }
}

fn read_draft(
    conn: &Connection,
    session_id: &SessionId,
    namespace: &NamespaceId,
) -> Result<Option<Draft>, StoreError> {
    let row = conn
        .query_row(
            "SELECT draft_text, draft_timestamp FROM session_drafts \
             WHERE session_id = ?1 AND namespace = ?2",
            params![session_id.as_str(), namespace.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    match row {
        Some((text, ts)) => {
            let ts = u64::try_from(ts)
                .map_err(|_| StoreError::RowDecode("draft_timestamp out of range".to_string()))?;
            Ok(Some(Draft::new(text, WallClock(ts))))
        }
        None => Ok(None),
    }
}
