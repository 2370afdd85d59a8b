use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::error::ServiceError;
use crate::server::MomentumServer;
use crate::types::LogEntry;

const MAX_TEXT_CHARS: usize = 2000;
const MAX_TAG_CHARS: usize = 40;

/// Validate user input into a new entry. Tags are trimmed and de-duplicated
/// in first-seen order; casing is left alone.
pub fn new_entry(
    user_id: &str,
    text: &str,
    tags: Vec<String>,
    linked_goal: Option<String>,
    now: DateTime<Utc>,
) -> Result<LogEntry, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::InvalidInput("entry text must not be empty".into()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "entry text is longer than {} characters",
            MAX_TEXT_CHARS
        )));
    }

    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "tag '{}' is longer than {} characters",
                tag, MAX_TAG_CHARS
            )));
        }
        if !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }

    let id = format!(
        "win_{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    );

    Ok(LogEntry {
        id,
        user_id: user_id.to_string(),
        text: text.to_string(),
        tags: unique,
        linked_goal: linked_goal.filter(|g| !g.trim().is_empty()),
        created_at: now,
    })
}

impl MomentumServer {
    pub async fn do_log_momentum(
        &self,
        text: &str,
        tags: Vec<String>,
        goal: Option<&str>,
    ) -> Result<String> {
        let caller = self.caller()?;
        let store = self.store.lock().await;

        // A goal may be referenced by key or by its label.
        let linked_goal = match goal.map(str::trim).filter(|g| !g.is_empty()) {
            Some(reference) => match store.db.resolve_goal(caller.user_id(), reference)? {
                Some(found) => Some(found.id),
                None => Some(reference.to_string()),
            },
            None => None,
        };

        let entry = new_entry(caller.user_id(), text, tags, linked_goal, Utc::now())?;
        store.db.insert_entry(&entry)?;
        tracing::debug!("logged {} for {}", entry.id, caller.user_id());

        let preview: String = entry.text.chars().take(80).collect();
        Ok(format!("Logged win: {} (id: {})", preview, entry.id))
    }

    pub async fn do_forget_momentum(&self, entry_id: &str) -> Result<String> {
        let caller = self.caller()?;
        let store = self.store.lock().await;

        if store.db.delete_entry(caller.user_id(), entry_id.trim())? {
            Ok(format!("Deleted entry {}.", entry_id.trim()))
        } else {
            Ok(format!("No entry found with id: {}", entry_id.trim()))
        }
    }
}
