use std::collections::HashMap;

use crate::ai::TextGenerator;
use crate::momentum::classify::bucket_lines;
use crate::momentum::fallback::{fallback_insights, fallback_recommendations, fallback_text};
use crate::momentum::prompt::{summary_prompt, weekly_prompt};
use crate::types::{AggregateStats, LogEntry, ReflectionMode, ReflectionResult, ReflectionSource};

const SUMMARY_MAX_TOKENS: u32 = 300;
const WEEKLY_MAX_TOKENS: u32 = 700;

/// Deterministic composition: the empty-state message or the fallback text.
pub fn compose(
    stats: AggregateStats,
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
) -> ReflectionResult {
    if stats.total_entries == 0 {
        return empty_result(stats, labels, mode);
    }
    fallback_result(stats, labels, mode)
}

/// Attempt AI enrichment once; any failure degrades to [`compose`].
///
/// `entries` are only used to build the summary-mode prompt. The returned
/// `stats` are the ones passed in, whichever branch produced the text.
pub async fn compose_with_ai(
    stats: AggregateStats,
    entries: &[LogEntry],
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
    generator: Option<&dyn TextGenerator>,
) -> ReflectionResult {
    if stats.total_entries == 0 {
        return compose(stats, labels, mode);
    }

    let Some(generator) = generator else {
        tracing::debug!("no AI endpoint configured, using {} fallback", mode.as_str());
        return compose(stats, labels, mode);
    };

    let (prompt, max_tokens) = match mode {
        ReflectionMode::Summary => (summary_prompt(entries, labels), SUMMARY_MAX_TOKENS),
        ReflectionMode::Weekly => (weekly_prompt(&stats, labels), WEEKLY_MAX_TOKENS),
    };

    match generator.generate(&prompt, max_tokens).await {
        Ok(text) if !text.trim().is_empty() => ai_result(text, stats, labels, mode),
        Ok(_) => {
            tracing::warn!("{} returned an empty {} reflection", generator.model(), mode.as_str());
            compose(stats, labels, mode)
        }
        Err(e) => {
            tracing::warn!(
                "{} reflection via {} failed, using fallback: {}",
                mode.as_str(),
                generator.model(),
                e
            );
            compose(stats, labels, mode)
        }
    }
}

fn ai_result(
    text: String,
    stats: AggregateStats,
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
) -> ReflectionResult {
    let summary_text = text.trim().to_string();

    let (insights, recommendations) = match mode {
        ReflectionMode::Summary => (Vec::new(), Vec::new()),
        ReflectionMode::Weekly => {
            let buckets = bucket_lines(&summary_text);
            let insights = if buckets.insights.is_empty() {
                fallback_insights(&stats, labels)
            } else {
                buckets.insights
            };
            let recommendations = if buckets.recommendations.is_empty() {
                fallback_recommendations(&stats, labels)
            } else {
                buckets.recommendations
            };
            (insights, recommendations)
        }
    };

    ReflectionResult {
        summary_text,
        insights,
        recommendations,
        stats,
        source: ReflectionSource::Ai,
    }
}

fn fallback_result(
    stats: AggregateStats,
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
) -> ReflectionResult {
    let summary_text = fallback_text(&stats, labels, mode);
    let (insights, recommendations) = match mode {
        ReflectionMode::Summary => (Vec::new(), Vec::new()),
        ReflectionMode::Weekly => (
            fallback_insights(&stats, labels),
            fallback_recommendations(&stats, labels),
        ),
    };

    ReflectionResult {
        summary_text,
        insights,
        recommendations,
        stats,
        source: ReflectionSource::Fallback,
    }
}

fn empty_result(
    stats: AggregateStats,
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
) -> ReflectionResult {
    let recommendations = match mode {
        ReflectionMode::Summary => Vec::new(),
        ReflectionMode::Weekly => fallback_recommendations(&stats, labels),
    };

    ReflectionResult {
        summary_text: fallback_text(&stats, labels, mode),
        insights: Vec::new(),
        recommendations,
        stats,
        source: ReflectionSource::Empty,
    }
}
