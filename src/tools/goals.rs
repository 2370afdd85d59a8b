use anyhow::Result;
use chrono::Utc;

use crate::error::ServiceError;
use crate::server::MomentumServer;
use crate::types::Goal;

const MAX_LABEL_CHARS: usize = 120;

impl MomentumServer {
    pub async fn do_add_goal(&self, label: &str) -> Result<String> {
        let caller = self.caller()?;
        let label = label.trim();
        if label.is_empty() {
            return Err(ServiceError::InvalidInput("goal label must not be empty".into()).into());
        }
        if label.chars().count() > MAX_LABEL_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "goal label is longer than {} characters",
                MAX_LABEL_CHARS
            ))
            .into());
        }

        let store = self.store.lock().await;
        if let Some(existing) = store.db.resolve_goal(caller.user_id(), label)? {
            return Ok(format!(
                "Goal already exists: {} (key: {})",
                existing.label, existing.id
            ));
        }

        let goal = Goal {
            id: format!("goal_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            user_id: caller.user_id().to_string(),
            label: label.to_string(),
            created_at: Utc::now(),
        };
        store.db.insert_goal(&goal)?;

        Ok(format!("Added goal: {} (key: {})", goal.label, goal.id))
    }

    pub async fn do_list_goals(&self) -> Result<String> {
        let caller = self.caller()?;
        let store = self.store.lock().await;
        let goals = store.db.list_goals(caller.user_id())?;

        if goals.is_empty() {
            return Ok("No Compass goals yet. Use add_goal to set one.".into());
        }

        let lines: Vec<String> = goals
            .iter()
            .map(|g| format!("- {} (key: {})", g.label, g.id))
            .collect();
        Ok(format!("{} goals:\n{}", goals.len(), lines.join("\n")))
    }
}
