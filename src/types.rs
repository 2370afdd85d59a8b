use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionMode {
    Summary,
    Weekly,
}

impl ReflectionMode {
    pub fn as_str(&self) -> &str {
        match self {
            ReflectionMode::Summary => "summary",
            ReflectionMode::Weekly => "weekly",
        }
    }
}

/// Which branch of the composer produced the text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionSource {
    Ai,
    Fallback,
    Empty,
}

/// Look-back period selectable by callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    All,
}

impl Period {
    pub fn days(&self) -> Option<u32> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::All => None,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" | "7" | "7d" => Some(Period::Week),
            "month" | "30" | "30d" => Some(Period::Month),
            "all" | "forever" => Some(Period::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub linked_goal: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_entries: u32,
    pub tag_counts: BTreeMap<String, u32>,
    pub goal_counts: BTreeMap<String, u32>,
    pub daily_activity: BTreeMap<NaiveDate, u32>,
    pub active_days: u32,
    pub top_tag: Option<String>,
    pub top_goal: Option<String>,
    pub tagged_entries: u32,
    pub goal_linked_entries: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub window_days: Option<u32>,
    pub consistency: f64,
}

impl AggregateStats {
    pub fn top_tag_count(&self) -> u32 {
        self.top_tag
            .as_ref()
            .and_then(|t| self.tag_counts.get(t).copied())
            .unwrap_or(0)
    }

    pub fn top_goal_count(&self) -> u32 {
        self.top_goal
            .as_ref()
            .and_then(|g| self.goal_counts.get(g).copied())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionResult {
    pub summary_text: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub stats: AggregateStats,
    pub source: ReflectionSource,
}

/// Response of the momentum summary entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MomentumSummary {
    pub summary: String,
    pub tag_analysis: BTreeMap<String, u32>,
    pub goal_progress: BTreeMap<String, u32>,
    pub total_entries: u32,
    pub tagged_entries: u32,
    pub goal_linked_entries: u32,
}

/// Response of the weekly reflection entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReflection {
    pub reflection: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub stats: AggregateStats,
}
