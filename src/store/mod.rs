pub mod markdown;
pub mod sqlite;

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::momentum::window::Window;
use crate::types::LogEntry;

/// Read access the reflection pipeline needs from persistence.
pub trait EntryStore {
    /// Entries owned by `user_id` with `created_at` inside `window`, newest first.
    fn entries_in_window(&self, user_id: &str, window: &Window) -> Result<Vec<LogEntry>>;

    /// Goal key → human label for `user_id`.
    fn goal_labels(&self, user_id: &str) -> Result<HashMap<String, String>>;
}

pub struct Store {
    pub db: sqlite::SqliteStore,
}

impl Store {
    pub async fn init(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path.join(markdown::REFLECTIONS_DIR))?;
        let db = sqlite::SqliteStore::open(path)?;
        tracing::debug!("momentum store opened at {}", path.display());

        Ok(Self { db })
    }
}

impl EntryStore for sqlite::SqliteStore {
    fn entries_in_window(&self, user_id: &str, window: &Window) -> Result<Vec<LogEntry>> {
        self.entries_between(user_id, window)
    }

    fn goal_labels(&self, user_id: &str) -> Result<HashMap<String, String>> {
        sqlite::SqliteStore::goal_labels(self, user_id)
    }
}

impl EntryStore for Store {
    fn entries_in_window(&self, user_id: &str, window: &Window) -> Result<Vec<LogEntry>> {
        self.db.entries_in_window(user_id, window)
    }

    fn goal_labels(&self, user_id: &str) -> Result<HashMap<String, String>> {
        EntryStore::goal_labels(&self.db, user_id)
    }
}
