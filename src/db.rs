use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

pub const DB_FILE: &str = "classtrack.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    // Several daemons may share one workspace.
    conn.busy_timeout(Duration::from_secs(5))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            revision INTEGER NOT NULL,
            origin TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

#[derive(Debug, Clone)]
pub struct KvRow {
    pub value: String,
    pub revision: i64,
    pub origin: String,
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<KvRow>> {
    let row = conn
        .query_row(
            "SELECT value, revision, origin FROM kv_store WHERE key = ?",
            [key],
            |r| {
                Ok(KvRow {
                    value: r.get(0)?,
                    revision: r.get(1)?,
                    origin: r.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn kv_revision(conn: &Connection, key: &str) -> anyhow::Result<i64> {
    let rev: Option<i64> = conn
        .query_row("SELECT revision FROM kv_store WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(rev.unwrap_or(0))
}

/// Upserts the value and bumps the key's revision. Returns the new revision.
pub fn kv_put(conn: &Connection, key: &str, value: &str, origin: &str) -> anyhow::Result<i64> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO kv_store(key, value, revision, origin, updated_at)
         VALUES(?, ?, 1, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           revision = kv_store.revision + 1,
           origin = excluded.origin,
           updated_at = excluded.updated_at",
        (key, value, origin, &now),
    )?;
    kv_revision(conn, key)
}
