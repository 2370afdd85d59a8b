use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use rmcp::{
    ServerHandler,
    model::{ServerCapabilities, ServerInfo},
    tool,
    schemars,
};

use crate::ai::TextGenerator;
use crate::error::ServiceError;
use crate::momentum::pipeline::{load_locked, Caller, Snapshot};
use crate::momentum::window::Window;
use crate::store::Store;

#[derive(Clone)]
pub struct MomentumServer {
    pub store_path: PathBuf,
    pub user_id: Option<String>,
    pub utc_offset: FixedOffset,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub store: Arc<tokio::sync::Mutex<Store>>,
}

impl MomentumServer {
    pub fn caller(&self) -> Result<Caller, ServiceError> {
        Caller::authenticate(self.user_id.as_deref())
    }

    pub fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }

    /// Read the caller's window. The store lock is released on return.
    pub async fn snapshot(&self, caller: &Caller, window: Window) -> Result<Snapshot, ServiceError> {
        load_locked(&*self.store, caller, window).await
    }
}

// MCP request types

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LogMomentumRequest {
    #[schemars(description = "What you accomplished, in your own words")]
    pub text: String,
    #[schemars(description = "Short labels such as #focus or #health (optional)")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Compass goal key or label this win moves forward (optional)")]
    pub goal: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ForgetMomentumRequest {
    #[schemars(description = "ID of the entry to delete (from log_momentum)")]
    pub entry_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddGoalRequest {
    #[schemars(description = "Long-term goal, e.g. 'Run a marathon'")]
    pub label: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListGoalsRequest {}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct PeriodRequest {
    #[schemars(description = "week (default), month, or all")]
    pub period: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct WeeklyReflectionRequest {
    #[schemars(description = "Save the reflection to the weekly archive (default true)")]
    pub archive: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ReflectionHistoryRequest {
    #[schemars(description = "How many past weeks to return (default 4)")]
    pub limit: Option<usize>,
}

#[tool(tool_box)]
impl MomentumServer {
    #[tool(description = "Log a win. Text is required; tags and a linked Compass goal are optional. Returns the new entry ID.")]
    async fn log_momentum(
        &self, #[tool(aggr)] req: LogMomentumRequest,
    ) -> String {
        match self.do_log_momentum(
            &req.text,
            req.tags.unwrap_or_default(),
            req.goal.as_deref(),
        ).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Delete one of your logged wins by ID.")]
    async fn forget_momentum(
        &self, #[tool(aggr)] req: ForgetMomentumRequest,
    ) -> String {
        match self.do_forget_momentum(&req.entry_id).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Create a Compass goal that wins can be linked to.")]
    async fn add_goal(
        &self, #[tool(aggr)] req: AddGoalRequest,
    ) -> String {
        match self.do_add_goal(&req.label).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "List your Compass goals with their keys.")]
    async fn list_goals(
        &self, #[tool(aggr)] _req: ListGoalsRequest,
    ) -> String {
        match self.do_list_goals().await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Encouraging summary of recent momentum with tag and goal breakdowns. Uses the AI endpoint when available, otherwise a built-in summary.")]
    async fn momentum_summary(
        &self, #[tool(aggr)] req: PeriodRequest,
    ) -> String {
        match self.do_momentum_summary(req.period.as_deref()).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Reflection on the last 7 days: narrative, up to 3 insights, up to 3 recommendations, and activity stats.")]
    async fn weekly_reflection(
        &self, #[tool(aggr)] req: WeeklyReflectionRequest,
    ) -> String {
        match self.do_weekly_reflection(req.archive.unwrap_or(true)).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Activity statistics for a period (tags, goals, per-day counts, streaks, consistency). No AI call.")]
    async fn look_back(
        &self, #[tool(aggr)] req: PeriodRequest,
    ) -> String {
        match self.do_look_back(req.period.as_deref()).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Past weekly reflections, newest first.")]
    async fn reflection_history(
        &self, #[tool(aggr)] req: ReflectionHistoryRequest,
    ) -> String {
        match self.do_reflection_history(req.limit.unwrap_or(4)).await {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[tool(tool_box)]
impl ServerHandler for MomentumServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "MindShift momentum log. 8 tools: \
                 log_momentum (record a win with optional tags and goal), \
                 forget_momentum (delete a win), \
                 add_goal / list_goals (Compass goals), \
                 momentum_summary (encouraging summary, week/month/all), \
                 weekly_reflection (insights and recommendations for the last 7 days), \
                 look_back (raw activity stats), \
                 reflection_history (archived weekly reflections). \
                 Summaries fall back to built-in text when the AI endpoint is unavailable."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn server(dir: &std::path::Path, user: Option<&str>) -> MomentumServer {
        let store = Store::init(dir).await.unwrap();
        MomentumServer {
            store_path: dir.to_path_buf(),
            user_id: user.map(str::to_string),
            utc_offset: crate::config::utc(),
            generator: None,
            store: Arc::new(tokio::sync::Mutex::new(store)),
        }
    }
}
