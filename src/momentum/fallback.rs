//! Deterministic reflection text used when the AI path is unavailable.
//!
//! Everything here is pure and total: missing optional fields drop their
//! clause instead of failing.

use std::collections::HashMap;

use crate::types::{AggregateStats, ReflectionMode};

pub const EMPTY_SUMMARY: &str =
    "You're just getting started! Log your first win and watch your momentum build. 🚀";

pub const EMPTY_WEEKLY: &str = "You're just getting started! Log a few wins this week and \
     your reflection will take shape here. 🚀";

pub const EMPTY_WEEKLY_RECOMMENDATION: &str =
    "Try logging one small win today, even a tiny one counts.";

const MAX_ITEMS: usize = 3;
const DEFAULT_WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumTier {
    BuildingMomentum,
    OnFire,
    Accelerating,
    CrushingIt,
}

impl MomentumTier {
    pub fn from_count(total: u32) -> Option<Self> {
        match total {
            0 => None,
            1 => Some(MomentumTier::BuildingMomentum),
            2..=3 => Some(MomentumTier::OnFire),
            4..=5 => Some(MomentumTier::Accelerating),
            _ => Some(MomentumTier::CrushingIt),
        }
    }

    fn sentence(&self, total: u32) -> String {
        match self {
            MomentumTier::BuildingMomentum => {
                "You're building momentum! Logging that first win is the hardest step, and you took it."
                    .to_string()
            }
            MomentumTier::OnFire => format!("You're on fire with {} wins logged!", total),
            MomentumTier::Accelerating => format!(
                "You're accelerating! {} wins means your momentum is really picking up.",
                total
            ),
            MomentumTier::CrushingIt => format!(
                "You're crushing it! {} wins is serious, sustained progress.",
                total
            ),
        }
    }
}

pub fn goal_label<'a>(labels: &'a HashMap<String, String>, key: &'a str) -> &'a str {
    labels.get(key).map(String::as_str).unwrap_or(key)
}

pub fn fallback_text(
    stats: &AggregateStats,
    labels: &HashMap<String, String>,
    mode: ReflectionMode,
) -> String {
    let mut text = match (mode, MomentumTier::from_count(stats.total_entries)) {
        (ReflectionMode::Summary, None) => return EMPTY_SUMMARY.to_string(),
        (ReflectionMode::Weekly, None) => return EMPTY_WEEKLY.to_string(),
        (ReflectionMode::Summary, Some(tier)) => tier.sentence(stats.total_entries),
        (ReflectionMode::Weekly, Some(_)) => format!(
            "This week you logged {} across {}.",
            plural(stats.total_entries, "win"),
            plural(stats.active_days, "active day"),
        ),
    };

    if let Some(tag) = &stats.top_tag {
        text.push_str(&format!(" Your focus on {} is clearly paying off.", tag));
    }
    if let Some(goal) = &stats.top_goal {
        text.push_str(&format!(
            " Every step toward \"{}\" counts, and you're making real progress.",
            goal_label(labels, goal)
        ));
    }

    text
}

pub fn fallback_insights(stats: &AggregateStats, labels: &HashMap<String, String>) -> Vec<String> {
    if stats.total_entries == 0 {
        return Vec::new();
    }

    let mut insights = vec![format!(
        "You were active {} out of {} days this week.",
        stats.active_days,
        stats.window_days.unwrap_or(DEFAULT_WEEK_DAYS)
    )];

    if let Some(tag) = &stats.top_tag {
        insights.push(format!(
            "{} showed up most often, in {} of your wins.",
            tag,
            stats.top_tag_count()
        ));
    }

    if let Some(goal) = &stats.top_goal {
        insights.push(format!(
            "\"{}\" got the most attention with {}.",
            goal_label(labels, goal),
            plural(stats.top_goal_count(), "linked win")
        ));
    } else if stats.longest_streak >= 2 {
        insights.push(format!(
            "Your longest streak was {} days in a row.",
            stats.longest_streak
        ));
    }

    insights.truncate(MAX_ITEMS);
    insights
}

pub fn fallback_recommendations(
    stats: &AggregateStats,
    labels: &HashMap<String, String>,
) -> Vec<String> {
    if stats.total_entries == 0 {
        return vec![EMPTY_WEEKLY_RECOMMENDATION.to_string()];
    }

    let mut recs = Vec::new();

    if stats.active_days < 4 {
        recs.push(
            "Try logging one small win each day next week to build a steadier rhythm.".to_string(),
        );
    } else {
        recs.push(
            "Keep your daily rhythm going next week. Consistency is what builds momentum."
                .to_string(),
        );
    }

    match &stats.top_tag {
        Some(tag) => recs.push(format!(
            "Lean into {} again next week, it's clearly working for you.",
            tag
        )),
        None => recs.push(
            "Try tagging your wins so the patterns in what energizes you become visible."
                .to_string(),
        ),
    }

    if stats.goal_linked_entries == 0 {
        recs.push("Link your wins to a Compass goal to watch your progress add up.".to_string());
    } else if let Some(goal) = &stats.top_goal {
        recs.push(format!(
            "Pick one concrete next step toward \"{}\" for the week ahead.",
            goal_label(labels, goal)
        ));
    }

    recs.truncate(MAX_ITEMS);
    recs
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
