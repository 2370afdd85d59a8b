use std::collections::HashMap;

use crate::momentum::fallback::goal_label;
use crate::types::{AggregateStats, LogEntry};

const SUMMARY_PROMPT: &str = r#"You are an encouraging productivity coach. Read the wins this person logged recently and write a short, warm summary (2-3 sentences) of their momentum. Mention recurring themes or goals if you see them. Speak directly to them ("you"). No lists, no headings."#;

const WEEKLY_PROMPT: &str = r#"You are an encouraging productivity coach writing a weekly reflection from someone's activity statistics. Write a short opening paragraph, then up to 3 lines that each start with "Insight:" describing patterns you noticed, then up to 3 lines that each start with "Recommendation:" suggesting what to try next week. Be specific to the numbers. Speak directly to them ("you")."#;

const MAX_ENTRY_CHARS: usize = 280;

pub fn summary_prompt(entries: &[LogEntry], labels: &HashMap<String, String>) -> String {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let text: String = entry.text.chars().take(MAX_ENTRY_CHARS).collect();
        let mut line = format!("- {}", text.trim());
        if !entry.tags.is_empty() {
            line.push_str(&format!(" [{}]", entry.tags.join(" ")));
        }
        if let Some(goal) = &entry.linked_goal {
            line.push_str(&format!(" (goal: {})", goal_label(labels, goal)));
        }
        lines.push(line);
    }

    format!("{}\n\n---\n\nWins:\n{}", SUMMARY_PROMPT, lines.join("\n"))
}

pub fn weekly_prompt(stats: &AggregateStats, labels: &HashMap<String, String>) -> String {
    let mut facts = vec![
        format!("Wins logged: {}", stats.total_entries),
        format!(
            "Active days: {} of {}",
            stats.active_days,
            stats.window_days.unwrap_or(7)
        ),
        format!("Current streak: {} days", stats.current_streak),
    ];

    if !stats.tag_counts.is_empty() {
        let tags: Vec<String> = stats
            .tag_counts
            .iter()
            .map(|(tag, count)| format!("{} ({})", tag, count))
            .collect();
        facts.push(format!("Tags: {}", tags.join(", ")));
    }

    if !stats.goal_counts.is_empty() {
        let goals: Vec<String> = stats
            .goal_counts
            .iter()
            .map(|(goal, count)| format!("\"{}\" ({})", goal_label(labels, goal), count))
            .collect();
        facts.push(format!("Goals worked on: {}", goals.join(", ")));
    }

    if !stats.daily_activity.is_empty() {
        let days: Vec<String> = stats
            .daily_activity
            .iter()
            .map(|(day, count)| format!("{} {}", day.format("%a"), count))
            .collect();
        facts.push(format!("Per day: {}", days.join(", ")));
    }

    format!("{}\n\n---\n\nThis week:\n{}", WEEKLY_PROMPT, facts.join("\n"))
}
