use crate::migrate::{self, LoadedFrom, LEGACY_STORAGE_KEY, STORAGE_KEY};
use crate::roster::RosterState;
use crate::store::{Store, Subscription};
use serde_json::Value;
use std::path::Path;

/// An open workspace: the store, the roster loaded from it, and the watch
/// on the roster key for writes made by other processes.
pub struct Session {
    pub store: Store,
    pub roster: RosterState,
    changes: Subscription,
}

impl Session {
    pub fn open(workspace: &Path) -> anyhow::Result<(Session, LoadedFrom)> {
        let store = Store::open(workspace)?;
        let current: Option<Value> = store.read_or(STORAGE_KEY, None);
        let legacy: Option<Value> = store.read_or(LEGACY_STORAGE_KEY, None);
        let loaded = migrate::load_versioned(current.as_ref(), legacy.as_ref());
        tracing::info!(
            workspace = %workspace.display(),
            loaded_from = loaded.loaded_from.as_str(),
            classes = loaded.roster.len(),
            "workspace opened"
        );

        let session = Session {
            roster: RosterState::new(loaded.roster),
            changes: store.subscribe(STORAGE_KEY),
            store,
        };
        // Persist the migrated shape so migration runs once per record.
        session.commit();
        Ok((session, loaded.loaded_from))
    }

    pub fn commit(&self) {
        self.store.write(STORAGE_KEY, self.roster.classes());
    }

    /// Applies the newest foreign write of the roster, if any. The incoming
    /// roster replaces the in-memory one outright.
    pub fn sync_external(&mut self) -> bool {
        let Some(value) = self.store.poll::<Value>(&mut self.changes) else {
            return false;
        };
        match migrate::backfill_numbers(&value) {
            Ok(classes) => {
                tracing::info!(
                    key = self.changes.key(),
                    classes = classes.len(),
                    "roster replaced by foreign write"
                );
                self.roster.replace_all(classes);
                true
            }
            Err(e) => {
                tracing::warn!(key = self.changes.key(), "ignoring foreign roster write: {e:#}");
                false
            }
        }
    }
}
