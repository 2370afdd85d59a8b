//! Entry-point plumbing shared by the MCP tools and the CLI.
//!
//! Each request runs read → fold → compose. The read is synchronous and
//! finishes before anything is awaited, so a store lock never spans the AI
//! call.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Mutex;

use crate::ai::TextGenerator;
use crate::error::ServiceError;
use crate::momentum::aggregate::aggregate;
use crate::momentum::compose::compose_with_ai;
use crate::momentum::window::Window;
use crate::store::EntryStore;
use crate::types::{
    AggregateStats, LogEntry, MomentumSummary, Period, ReflectionMode, ReflectionResult,
    WeeklyReflection,
};

/// An authenticated caller. Every read is scoped to this user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(String);

impl Caller {
    pub fn authenticate(user_id: Option<&str>) -> Result<Self, ServiceError> {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(Caller(id.to_string())),
            _ => Err(ServiceError::Unauthenticated),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.0
    }
}

/// Everything one request reads from the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<LogEntry>,
    pub labels: HashMap<String, String>,
    pub window: Window,
}

impl Snapshot {
    pub fn stats(&self, offset: FixedOffset) -> AggregateStats {
        aggregate(&self.entries, &self.window, offset)
    }
}

pub fn load_snapshot(
    store: &dyn EntryStore,
    caller: &Caller,
    window: Window,
) -> Result<Snapshot, ServiceError> {
    let entries = store
        .entries_in_window(caller.user_id(), &window)
        .map_err(ServiceError::internal)?;
    let labels = store
        .goal_labels(caller.user_id())
        .map_err(ServiceError::internal)?;
    debug_assert!(entries.iter().all(|e| window.contains(e.created_at)));

    tracing::debug!(
        "loaded {} entries for {} (window start {:?})",
        entries.len(),
        caller.user_id(),
        window.start
    );
    Ok(Snapshot {
        entries,
        labels,
        window,
    })
}

pub fn summary_window(period: Period, now: DateTime<Utc>, offset: FixedOffset) -> Window {
    Window::for_period(period, now, offset)
}

pub fn weekly_window(now: DateTime<Utc>, offset: FixedOffset) -> Window {
    Window::last_days(7, now, offset)
}

pub async fn summarize(
    snapshot: &Snapshot,
    offset: FixedOffset,
    generator: Option<&dyn TextGenerator>,
) -> MomentumSummary {
    let stats = snapshot.stats(offset);
    let result = compose_with_ai(
        stats,
        &snapshot.entries,
        &snapshot.labels,
        ReflectionMode::Summary,
        generator,
    )
    .await;
    MomentumSummary::from(result)
}

pub async fn reflect_weekly(
    snapshot: &Snapshot,
    offset: FixedOffset,
    generator: Option<&dyn TextGenerator>,
) -> ReflectionResult {
    let stats = snapshot.stats(offset);
    compose_with_ai(
        stats,
        &snapshot.entries,
        &snapshot.labels,
        ReflectionMode::Weekly,
        generator,
    )
    .await
}

/// Lock, read, unlock. The guard never outlives this call.
pub async fn load_locked<S: EntryStore>(
    store: &Mutex<S>,
    caller: &Caller,
    window: Window,
) -> Result<Snapshot, ServiceError> {
    let guard = store.lock().await;
    load_snapshot(&*guard, caller, window)
}

/// Momentum summary for the caller over `period`.
pub async fn generate_momentum_summary<S: EntryStore>(
    caller_id: Option<&str>,
    store: &Mutex<S>,
    generator: Option<&dyn TextGenerator>,
    period: Period,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<MomentumSummary, ServiceError> {
    let caller = Caller::authenticate(caller_id)?;
    let snapshot = load_locked(store, &caller, summary_window(period, now, offset)).await?;
    Ok(summarize(&snapshot, offset, generator).await)
}

/// Weekly reflection for the caller over the last seven local days.
pub async fn generate_weekly_reflection<S: EntryStore>(
    caller_id: Option<&str>,
    store: &Mutex<S>,
    generator: Option<&dyn TextGenerator>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<WeeklyReflection, ServiceError> {
    let caller = Caller::authenticate(caller_id)?;
    let snapshot = load_locked(store, &caller, weekly_window(now, offset)).await?;
    Ok(WeeklyReflection::from(reflect_weekly(&snapshot, offset, generator).await))
}

impl From<ReflectionResult> for MomentumSummary {
    fn from(result: ReflectionResult) -> Self {
        let ReflectionResult {
            summary_text,
            stats,
            ..
        } = result;
        MomentumSummary {
            summary: summary_text,
            total_entries: stats.total_entries,
            tagged_entries: stats.tagged_entries,
            goal_linked_entries: stats.goal_linked_entries,
            tag_analysis: stats.tag_counts,
            goal_progress: stats.goal_counts,
        }
    }
}

impl From<ReflectionResult> for WeeklyReflection {
    fn from(result: ReflectionResult) -> Self {
        WeeklyReflection {
            reflection: result.summary_text,
            insights: result.insights,
            recommendations: result.recommendations,
            stats: result.stats,
        }
    }
}
