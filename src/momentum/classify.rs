use std::sync::OnceLock;

use regex::Regex;

const MAX_ITEMS: usize = 3;

fn insight_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(insights?|noticed?|patterns?)\b").expect("static regex")
    })
}

fn recommendation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(recommend\w*|suggest\w*|try|next\s+week)\b").expect("static regex")
    })
}

/// `Insight: ...`, `**Recommendation:** ...` and similar leading labels.
fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\**\s*(insights?|recommendations?|suggestions?)\s*\**\s*:\s*\**\s*(.*)$")
            .expect("static regex")
    })
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").expect("static regex"))
}

/// Lines of an AI reflection sorted into buckets by keyword.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Buckets {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Insight,
    Recommendation,
}

/// Best-effort split of free text into insights and recommendations.
///
/// A leading `Insight:` / `Recommendation:` label decides the bucket and is
/// stripped. Unlabelled lines fall back to keywords, where insight keywords
/// win when a line matches both families. Headings and blank lines are
/// skipped; each bucket holds at most three lines.
pub fn bucket_lines(text: &str) -> Buckets {
    let mut buckets = Buckets::default();

    for raw in text.lines() {
        let Some((kind, line)) = clean_line(raw).and_then(|l| classify(&l)) else {
            continue;
        };

        let bucket = match kind {
            Kind::Insight => &mut buckets.insights,
            Kind::Recommendation => &mut buckets.recommendations,
        };
        if bucket.len() < MAX_ITEMS {
            bucket.push(line);
        }
    }

    buckets
}

fn classify(line: &str) -> Option<(Kind, String)> {
    if let Some(caps) = label_re().captures(line) {
        let kind = if caps[1].to_ascii_lowercase().starts_with("insight") {
            Kind::Insight
        } else {
            Kind::Recommendation
        };
        let rest = caps[2].trim().trim_matches('*').trim();
        return (!rest.is_empty()).then(|| (kind, rest.to_string()));
    }

    if insight_re().is_match(line) {
        Some((Kind::Insight, line.to_string()))
    } else if recommendation_re().is_match(line) {
        Some((Kind::Recommendation, line.to_string()))
    } else {
        None
    }
}

fn clean_line(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let without_marker = marker_re().replace(trimmed, "");
    let line = without_marker.trim().trim_matches('*').trim();

    // "Insights:" or "**Recommendations**" on its own is a heading, not content.
    if line.is_empty() || line.ends_with(':') {
        return None;
    }

    Some(line.to_string())
}
