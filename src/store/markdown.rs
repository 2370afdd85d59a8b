use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AggregateStats, ReflectionResult, ReflectionSource};

pub const REFLECTIONS_DIR: &str = "reflections";

/// Frontmatter of an archived weekly reflection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReflectionRecord {
    pub week: String,
    pub generated_at: DateTime<Utc>,
    pub source: ReflectionSource,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub stats: AggregateStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedReflection {
    pub record: ReflectionRecord,
    pub text: String,
}

/// Write (or overwrite) the reflection for `week` with YAML frontmatter.
pub fn write_reflection(
    store_path: &Path,
    user_id: &str,
    week: &str,
    generated_at: DateTime<Utc>,
    result: &ReflectionResult,
) -> Result<PathBuf> {
    let dir = user_dir(store_path, user_id);
    std::fs::create_dir_all(&dir)?;
    let file = dir.join(format!("{}.md", slugify(week)));

    let record = ReflectionRecord {
        week: week.to_string(),
        generated_at,
        source: result.source,
        insights: result.insights.clone(),
        recommendations: result.recommendations.clone(),
        stats: result.stats.clone(),
    };
    let frontmatter = serde_yaml::to_string(&record)?;
    let content = format!(
        "---\n{}---\n\n# Week {}\n\n{}\n",
        frontmatter, week, result.summary_text
    );
    std::fs::write(&file, content)?;
    Ok(file)
}

/// Archived reflections for `user_id`, newest week first.
pub fn list_reflections(store_path: &Path, user_id: &str) -> Result<Vec<ArchivedReflection>> {
    let dir = user_dir(store_path, user_id);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let raw = std::fs::read_to_string(&path)?;
        match parse_reflection(&raw) {
            Some(archived) => found.push(archived),
            None => tracing::warn!("skipping unreadable reflection: {}", path.display()),
        }
    }

    found.sort_by(|a, b| b.record.week.cmp(&a.record.week));
    Ok(found)
}

fn parse_reflection(raw: &str) -> Option<ArchivedReflection> {
    let rest = raw.strip_prefix("---\n")?;
    let (frontmatter, body) = rest.split_once("\n---\n")?;
    let record: ReflectionRecord = serde_yaml::from_str(frontmatter).ok()?;

    let text = body
        .lines()
        .filter(|l| !l.starts_with("# Week "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    Some(ArchivedReflection { record, text })
}

/// Hex of the raw id bytes: distinct ids never share a directory and no id
/// can contain a path separator.
fn user_dir(store_path: &Path, user_id: &str) -> PathBuf {
    store_path.join(REFLECTIONS_DIR).join(hex::encode(user_id.as_bytes()))
}

fn slugify(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(text: &str) -> ReflectionResult {
        ReflectionResult {
            summary_text: text.into(),
            insights: vec!["You were active 3 out of 7 days this week.".into()],
            recommendations: vec!["Try tagging your wins.".into()],
            stats: AggregateStats {
                total_entries: 3,
                active_days: 3,
                tag_counts: BTreeMap::from([("#focus".to_string(), 2)]),
                window_days: Some(7),
                consistency: 3.0 / 7.0,
                ..Default::default()
            },
            source: ReflectionSource::Fallback,
        }
    }

    #[test]
    fn reflections_round_trip_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();

        write_reflection(dir.path(), "ada", "2026-W10", now, &result("Older week.")).unwrap();
        let path =
            write_reflection(dir.path(), "ada", "2026-W11", now, &result("Newer week.")).unwrap();
        assert!(path.ends_with("reflections/616461/2026-W11.md"));

        let listed = list_reflections(dir.path(), "ada").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].record.week, "2026-W11");
        assert_eq!(listed[0].text, "Newer week.");
        assert_eq!(listed[1].text, "Older week.");
        assert_eq!(listed[0].record.stats, result("").stats);
        assert_eq!(listed[0].record.source, ReflectionSource::Fallback);
    }

    #[test]
    fn rewriting_a_week_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        write_reflection(dir.path(), "ada", "2026-W11", now, &result("First.")).unwrap();
        write_reflection(dir.path(), "ada", "2026-W11", now, &result("Second.")).unwrap();

        let listed = list_reflections(dir.path(), "ada").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "Second.");
    }

    #[test]
    fn users_do_not_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        write_reflection(dir.path(), "ada", "2026-W11", Utc::now(), &result("Mine.")).unwrap();
        assert!(list_reflections(dir.path(), "bob").unwrap().is_empty());
    }

    #[test]
    fn user_ids_cannot_escape_the_archive() {
        let dir = user_dir(Path::new("/store"), "../etc");
        assert_eq!(dir, Path::new("/store/reflections/2e2e2f657463"));
    }

    #[test]
    fn lookalike_user_ids_keep_separate_archives() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        write_reflection(dir.path(), "a.b", "2026-W11", now, &result("Reflection of a.b.")).unwrap();
        write_reflection(dir.path(), "a@b", "2026-W11", now, &result("Reflection of a@b.")).unwrap();

        assert!(list_reflections(dir.path(), "a_b").unwrap().is_empty());
        let dotted = list_reflections(dir.path(), "a.b").unwrap();
        assert_eq!(dotted.len(), 1);
        assert_eq!(dotted[0].text, "Reflection of a.b.");
        let at = list_reflections(dir.path(), "a@b").unwrap();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].text, "Reflection of a@b.");
    }
}
