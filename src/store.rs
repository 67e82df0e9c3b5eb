use crate::db;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSON slots in the workspace key-value table.
///
/// Reads never fail: a missing or unparseable slot yields the caller's
/// default. Writes never fail either; errors are logged and dropped.
pub struct Store {
    conn: Connection,
    origin: String,
    workspace: PathBuf,
}

/// Tracks the last revision of one key seen by a [`Store`].
#[derive(Debug, Clone)]
pub struct Subscription {
    key: String,
    seen_revision: i64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        let conn = db::open_db(workspace)?;
        Ok(Store {
            conn,
            origin: Uuid::new_v4().to_string(),
            workspace: workspace.to_path_buf(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Reads `key`, invoking `default` only on a miss or a parse failure.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        let row = match db::kv_get(&self.conn, key) {
            Ok(Some(row)) => row,
            Ok(None) => return default(),
            Err(e) => {
                tracing::warn!(key, "error reading store key: {e:#}");
                return default();
            }
        };
        match serde_json::from_str(&row.value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, "error parsing store key: {e}");
                default()
            }
        }
    }

    pub fn read_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.read(key, || default)
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(key, "error serializing store key: {e}");
                return;
            }
        };
        match db::kv_put(&self.conn, key, &text, &self.origin) {
            Ok(revision) => tracing::debug!(key, revision, bytes = text.len(), "store write"),
            Err(e) => tracing::error!(key, "error writing store key: {e:#}"),
        }
    }

    /// Starts watching `key` from its current revision.
    pub fn subscribe(&self, key: &str) -> Subscription {
        let seen_revision = db::kv_revision(&self.conn, key).unwrap_or_else(|e| {
            tracing::warn!(key, "error reading store revision: {e:#}");
            0
        });
        Subscription {
            key: key.to_string(),
            seen_revision,
        }
    }

    /// Latest value written to the subscribed key by another origin since
    /// the previous poll. Own writes only advance the subscription.
    pub fn poll<T: DeserializeOwned>(&self, sub: &mut Subscription) -> Option<T> {
        let row = match db::kv_get(&self.conn, &sub.key) {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %sub.key, "error polling store key: {e:#}");
                return None;
            }
        };
        if row.revision <= sub.seen_revision {
            return None;
        }
        sub.seen_revision = row.revision;
        if row.origin == self.origin {
            return None;
        }
        match serde_json::from_str(&row.value) {
            Ok(v) => {
                tracing::info!(
                    key = %sub.key,
                    revision = row.revision,
                    from = %row.origin,
                    "store changed elsewhere"
                );
                Some(v)
            }
            Err(e) => {
                tracing::warn!(key = %sub.key, "ignoring unparseable foreign write: {e}");
                None
            }
        }
    }
}
