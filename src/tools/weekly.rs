use anyhow::Result;
use chrono::Utc;

use crate::momentum::pipeline::{reflect_weekly, weekly_window};
use crate::momentum::window::local_date;
use crate::server::MomentumServer;
use crate::store::markdown;
use crate::types::WeeklyReflection;

impl MomentumServer {
    pub async fn do_weekly_reflection(&self, archive: bool) -> Result<String> {
        let caller = self.caller()?;
        let now = Utc::now();

        let snapshot = self.snapshot(&caller, weekly_window(now, self.utc_offset)).await?;
        let result = reflect_weekly(&snapshot, self.utc_offset, self.generator()).await;

        // Archiving is best effort; the reflection is returned either way.
        if archive && result.stats.total_entries > 0 {
            let week = local_date(now, self.utc_offset).format("%G-W%V").to_string();
            match markdown::write_reflection(&self.store_path, caller.user_id(), &week, now, &result) {
                Ok(path) => tracing::info!("archived weekly reflection {}", path.display()),
                Err(e) => tracing::warn!("failed to archive weekly reflection: {}", e),
            }
        }

        Ok(serde_json::to_string_pretty(&WeeklyReflection::from(result))?)
    }

    pub async fn do_reflection_history(&self, limit: usize) -> Result<String> {
        let caller = self.caller()?;
        let archived = markdown::list_reflections(&self.store_path, caller.user_id())?;

        if archived.is_empty() {
            return Ok("No weekly reflections archived yet.".into());
        }

        let sections: Vec<String> = archived
            .iter()
            .take(limit.max(1))
            .map(|a| {
                format!(
                    "## {} ({} wins, {} active days)\n{}",
                    a.record.week, a.record.stats.total_entries, a.record.stats.active_days, a.text
                )
            })
            .collect();
        Ok(sections.join("\n\n"))
    }
}
