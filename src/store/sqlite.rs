use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{types::Type, Connection};

use crate::momentum::window::Window;
use crate::types::{Goal, LogEntry};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        text TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        linked_goal TEXT,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS entries_user_created
        ON entries (user_id, created_at);

    CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        label TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS goals_user ON goals (user_id);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(store_path: &Path) -> Result<Self> {
        let db_path = store_path.join("index.db");
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_entry(&self, entry: &LogEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (id, user_id, text, tags, linked_goal, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                entry.id,
                entry.user_id,
                entry.text,
                serde_json::to_string(&entry.tags)?,
                entry.linked_goal,
                format_dt(&entry.created_at),
            ],
        )?;
        Ok(())
    }

    /// Delete an entry owned by `user_id`. Returns whether anything was removed.
    pub fn delete_entry(&self, user_id: &str, id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        Ok(removed > 0)
    }

    /// Entries for one user inside `window`, newest first.
    pub fn entries_between(&self, user_id: &str, window: &Window) -> Result<Vec<LogEntry>> {
        // Fixed-width RFC 3339 text compares in time order; "" precedes everything.
        let start = window.start.map(|s| format_dt(&s)).unwrap_or_default();
        let end = format_dt(&window.end);

        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, text, tags, linked_goal, created_at \
             FROM entries \
             WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3 \
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(rusqlite::params![user_id, start, end], |row| {
            let tags: String = row.get(3)?;
            Ok(LogEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                text: row.get(2)?,
                tags: serde_json::from_str(&tags)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
                linked_goal: row.get(4)?,
                created_at: parse_dt(5, row.get::<_, String>(5)?)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn insert_goal(&self, goal: &Goal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals (id, user_id, label, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![goal.id, goal.user_id, goal.label, format_dt(&goal.created_at)],
        )?;
        Ok(())
    }

    pub fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, label, created_at FROM goals \
             WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(rusqlite::params![user_id], |row| {
            Ok(Goal {
                id: row.get(0)?,
                user_id: row.get(1)?,
                label: row.get(2)?,
                created_at: parse_dt(3, row.get::<_, String>(3)?)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Resolve a goal reference that may be either a key or a label.
    pub fn resolve_goal(&self, user_id: &str, reference: &str) -> Result<Option<Goal>> {
        let needle = reference.trim().to_lowercase();
        Ok(self
            .list_goals(user_id)?
            .into_iter()
            .find(|g| g.id == reference.trim() || g.label.to_lowercase() == needle))
    }

    pub fn goal_labels(&self, user_id: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .list_goals(user_id)?
            .into_iter()
            .map(|g| (g.id, g.label))
            .collect())
    }
}

fn format_dt(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_dt(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
