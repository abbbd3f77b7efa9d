//! SQLite schema + connection discipline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use super::StoreError;

pub(crate) const SCHEMA_VERSION: u32 = 1;
pub(crate) const DB_FILE: &str = "drafts.sqlite";
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// How hard SQLite flushes on commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    Cache,
    Durable,
}

impl DurabilityMode {
    fn synchronous_value(self) -> &'static str {
        match self {
            DurabilityMode::Cache => "NORMAL",
            DurabilityMode::Durable => "FULL",
        }
    }
}

/// Prepare the store directory and database file, creating or validating the
/// schema. Returns the database path.
pub(crate) fn prepare(dir: &Path, mode: DurabilityMode) -> Result<PathBuf, StoreError> {
    reject_symlink(dir)?;
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    reject_symlink(dir)?;
    let db_path = dir.join(DB_FILE);
    reject_symlink(&db_path)?;

    let conn = open_connection(&db_path, mode, true)?;
    let is_new = !table_exists(&conn, "meta")?;
    if is_new {
        initialize_schema(&conn)?;
        write_meta(&conn)?;
    } else {
        validate_meta(&conn)?;
    }

    ensure_permissions(&db_path)?;
    drop(conn);

    Ok(db_path)
}

pub(crate) fn open_connection(
    path: &Path,
    mode: DurabilityMode,
    create: bool,
) -> Result<Connection, StoreError> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE;
    if create {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let conn = Connection::open_with_flags(path, flags)?;
    apply_pragmas(&conn, mode)?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

fn apply_pragmas(conn: &Connection, mode: DurabilityMode) -> Result<(), StoreError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", mode.synchronous_value())?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
           session_id TEXT PRIMARY KEY,
           namespace TEXT NOT NULL,
           created_at_ms INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS sessions_by_namespace
           ON sessions (namespace);
         CREATE TABLE IF NOT EXISTS session_drafts (
           session_id TEXT NOT NULL
             REFERENCES sessions (session_id) ON DELETE CASCADE,
           namespace TEXT NOT NULL,
           draft_text TEXT NOT NULL,
           draft_timestamp INTEGER NOT NULL,
           PRIMARY KEY (session_id, namespace)
         );
         CREATE TABLE IF NOT EXISTS meta (
           key TEXT PRIMARY KEY,
           value TEXT NOT NULL
         );",
    )?;
    Ok(())
}

fn write_meta(conn: &Connection) -> Result<(), StoreError> {
    set_meta(conn, "schema_version", SCHEMA_VERSION.to_string())
}

fn validate_meta(conn: &Connection) -> Result<(), StoreError> {
    let version = require_meta(conn, "schema_version")?;
    let version = version
        .parse::<u32>()
        .map_err(|_| StoreError::RowDecode(format!("schema_version `{version}` not a u32")))?;
    if version != SCHEMA_VERSION {
        return Err(StoreError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            got: version,
        });
    }
    Ok(())
}

fn set_meta(conn: &Connection, key: &'static str, value: String) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn require_meta(conn: &Connection, key: &'static str) -> Result<String, StoreError> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    value.ok_or(StoreError::MetaMissing { key })
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn ensure_permissions(path: &Path) -> Result<(), StoreError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(
            |source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            },
        )?;
    }
    Ok(())
}

fn reject_symlink(path: &Path) -> Result<(), StoreError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(StoreError::Symlink {
            path: path.to_path_buf(),
        }),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// `BEGIN IMMEDIATE` transaction guard.
///
/// Every non-commit path, including panics and early error returns, rolls
/// back via `Drop`; no partial write becomes visible.
pub(crate) struct ImmediateTxn {
    conn: Connection,
    committed: bool,
}

impl ImmediateTxn {
    pub(crate) fn begin(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            committed: false,
        })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn commit(mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.committed = true;
        Ok(())
    }

    pub(crate) fn rollback(mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("ROLLBACK")?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for ImmediateTxn {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
