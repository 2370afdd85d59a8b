use std::collections::BTreeMap;

use chrono::{Duration, FixedOffset, NaiveDate};

use crate::momentum::window::{local_date, Window};
use crate::types::{AggregateStats, LogEntry};

/// Fold a pre-filtered set of entries into statistics.
///
/// The caller is responsible for restricting `entries` to one user and to
/// `window`; the window is only consulted for its length. Input order does
/// not affect the result.
pub fn aggregate(entries: &[LogEntry], window: &Window, offset: FixedOffset) -> AggregateStats {
    let mut stats = AggregateStats {
        window_days: window.days,
        ..Default::default()
    };

    for entry in entries {
        stats.total_entries += 1;

        for tag in &entry.tags {
            *stats.tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
        if !entry.tags.is_empty() {
            stats.tagged_entries += 1;
        }

        if let Some(goal) = &entry.linked_goal {
            *stats.goal_counts.entry(goal.clone()).or_insert(0) += 1;
            stats.goal_linked_entries += 1;
        }

        let day = local_date(entry.created_at, offset);
        *stats.daily_activity.entry(day).or_insert(0) += 1;
    }

    stats.active_days = stats.daily_activity.len() as u32;
    stats.top_tag = top_key(&stats.tag_counts);
    stats.top_goal = top_key(&stats.goal_counts);

    let (current, longest) = streaks(&stats.daily_activity);
    stats.current_streak = current;
    stats.longest_streak = longest;
    stats.consistency = consistency(&stats.daily_activity, window.days);

    stats
}

/// Key with the highest count. Equal counts resolve to the lexicographically
/// smallest key.
pub fn top_key(counts: &BTreeMap<String, u32>) -> Option<String> {
    let mut best: Option<(&String, u32)> = None;
    for (key, &count) in counts {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key.clone())
}

/// Returns `(current, longest)` runs of consecutive active days. The current
/// streak ends at the most recent active day.
fn streaks(daily: &BTreeMap<NaiveDate, u32>) -> (u32, u32) {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for (&day, &count) in daily {
        if count == 0 {
            continue;
        }
        run = match prev {
            Some(p) if p + Duration::days(1) == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    (run, longest)
}

fn consistency(daily: &BTreeMap<NaiveDate, u32>, window_days: Option<u32>) -> f64 {
    let active = daily.len() as f64;
    if active == 0.0 {
        return 0.0;
    }

    let span = match window_days {
        Some(days) => f64::from(days.max(1)),
        None => {
            // Unbounded: measure against the span actually covered.
            let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => return 0.0,
            };
            ((last - first).num_days() + 1) as f64
        }
    };

    (active / span).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn entry(id: &str, created: &str, tags: &[&str], goal: Option<&str>) -> LogEntry {
        LogEntry {
            id: id.into(),
            user_id: "ada".into(),
            text: format!("win {}", id),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            linked_goal: goal.map(|g| g.to_string()),
            created_at: at(created),
        }
    }

    fn week() -> Window {
        Window::last_days(7, at("2026-03-15T20:00:00Z"), crate::config::utc())
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let stats = aggregate(&[], &week(), crate::config::utc());
        assert_eq!(stats.total_entries, 0);
        assert!(stats.tag_counts.is_empty());
        assert!(stats.goal_counts.is_empty());
        assert!(stats.daily_activity.is_empty());
        assert_eq!(stats.active_days, 0);
        assert_eq!(stats.top_tag, None);
        assert_eq!(stats.top_goal, None);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.consistency, 0.0);
        assert_eq!(stats.window_days, Some(7));
    }

    #[test]
    fn counts_tags_and_goals() {
        let entries = vec![
            entry("1", "2026-03-15T09:00:00Z", &["#focus"], Some("goal1")),
            entry("2", "2026-03-15T10:00:00Z", &["#focus"], Some("goal1")),
            entry("3", "2026-03-14T10:00:00Z", &["#focus", "#health"], None),
            entry("4", "2026-03-13T10:00:00Z", &[], None),
        ];
        let stats = aggregate(&entries, &week(), crate::config::utc());

        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.tag_counts.get("#focus"), Some(&3));
        assert_eq!(stats.tag_counts.get("#health"), Some(&1));
        assert_eq!(stats.goal_counts.get("goal1"), Some(&2));
        assert_eq!(stats.top_tag.as_deref(), Some("#focus"));
        assert_eq!(stats.top_goal.as_deref(), Some("goal1"));
        assert_eq!(stats.top_tag_count(), 3);
        assert_eq!(stats.top_goal_count(), 2);
        assert_eq!(stats.tagged_entries, 3);
        assert_eq!(stats.goal_linked_entries, 2);
        assert_eq!(stats.active_days, 3);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn ties_break_lexicographically() {
        let entries = vec![
            entry("1", "2026-03-15T09:00:00Z", &["#zen"], Some("b")),
            entry("2", "2026-03-15T10:00:00Z", &["#art"], Some("a")),
        ];
        let stats = aggregate(&entries, &week(), crate::config::utc());
        assert_eq!(stats.top_tag.as_deref(), Some("#art"));
        assert_eq!(stats.top_goal.as_deref(), Some("a"));

        let reversed: Vec<_> = entries.into_iter().rev().collect();
        let stats = aggregate(&reversed, &week(), crate::config::utc());
        assert_eq!(stats.top_tag.as_deref(), Some("#art"));
    }

    #[test]
    fn same_input_same_output_regardless_of_order() {
        let entries = vec![
            entry("1", "2026-03-11T09:00:00Z", &["#a", "#b"], Some("g")),
            entry("2", "2026-03-12T09:00:00Z", &["#b"], None),
            entry("3", "2026-03-15T09:00:00Z", &[], Some("h")),
        ];
        let first = aggregate(&entries, &week(), crate::config::utc());
        let second = aggregate(&entries, &week(), crate::config::utc());
        assert_eq!(first, second);

        let shuffled = vec![entries[2].clone(), entries[0].clone(), entries[1].clone()];
        assert_eq!(first, aggregate(&shuffled, &week(), crate::config::utc()));
    }

    #[test]
    fn active_days_never_exceed_entries_or_window() {
        let window = week();
        let start = window.start.unwrap();
        for n in 0..40u32 {
            let entries: Vec<LogEntry> = (0..n)
                .map(|i| {
                    let created = start + Duration::hours(i64::from(i * 5 % (7 * 24)));
                    LogEntry {
                        id: i.to_string(),
                        user_id: "ada".into(),
                        text: "win".into(),
                        tags: vec![],
                        linked_goal: None,
                        created_at: created,
                    }
                })
                .filter(|e| window.contains(e.created_at))
                .collect();
            let stats = aggregate(&entries, &window, crate::config::utc());
            assert!(stats.active_days <= stats.total_entries);
            assert!(stats.active_days <= 7);
            assert!(stats.consistency <= 1.0);
        }
    }

    #[test]
    fn five_active_days_in_a_week() {
        let entries: Vec<_> = ["09", "10", "12", "13", "15"]
            .iter()
            .map(|d| entry(d, &format!("2026-03-{}T12:00:00Z", d), &[], None))
            .collect();
        let stats = aggregate(&entries, &week(), crate::config::utc());
        assert_eq!(stats.active_days, 5);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 2);
        assert!((stats.consistency - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn days_are_bucketed_in_local_time() {
        let offset = crate::config::parse_offset("-05:00").unwrap();
        // 03:00 UTC on the 15th is still the 14th in UTC-05:00.
        let entries = vec![
            entry("1", "2026-03-15T03:00:00Z", &[], None),
            entry("2", "2026-03-14T18:00:00Z", &[], None),
        ];
        let window = Window::last_days(7, at("2026-03-15T20:00:00Z"), offset);
        let stats = aggregate(&entries, &window, offset);
        assert_eq!(stats.active_days, 1);
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(stats.daily_activity.get(&day), Some(&2));
    }

    #[test]
    fn unbounded_consistency_uses_covered_span() {
        let entries = vec![
            entry("1", "2026-01-01T12:00:00Z", &[], None),
            entry("2", "2026-01-04T12:00:00Z", &[], None),
        ];
        let window = Window::unbounded(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        let stats = aggregate(&entries, &window, crate::config::utc());
        assert_eq!(stats.window_days, None);
        assert!((stats.consistency - 0.5).abs() < 1e-9);
        assert_eq!(stats.longest_streak, 1);
    }
}
