use anyhow::Result;
use chrono::Utc;

use crate::error::ServiceError;
use crate::momentum::pipeline::{generate_momentum_summary, summary_window};
use crate::server::MomentumServer;
use crate::types::Period;

pub fn parse_period(raw: Option<&str>) -> Result<Period, ServiceError> {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(Period::Week),
        Some(p) => Period::from_str(p).ok_or_else(|| {
            ServiceError::InvalidInput(format!("unknown period '{}'. use: week, month, all", p))
        }),
    }
}

impl MomentumServer {
    pub async fn do_momentum_summary(&self, period: Option<&str>) -> Result<String> {
        let period = parse_period(period)?;
        let summary = generate_momentum_summary(
            self.user_id.as_deref(),
            &*self.store,
            self.generator(),
            period,
            Utc::now(),
            self.utc_offset,
        )
        .await?;

        Ok(serde_json::to_string_pretty(&summary)?)
    }

    /// Aggregation-only preview of a period; never calls the AI endpoint.
    pub async fn do_look_back(&self, period: Option<&str>) -> Result<String> {
        let caller = self.caller()?;
        let period = parse_period(period)?;
        let window = summary_window(period, Utc::now(), self.utc_offset);

        let snapshot = self.snapshot(&caller, window).await?;
        let stats = snapshot.stats(self.utc_offset);

        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "period": period,
            "stats": stats,
        }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::fallback::EMPTY_SUMMARY;
    use crate::server::test_support::server;
    use crate::types::MomentumSummary;

    #[test]
    fn periods_default_to_week() {
        assert_eq!(parse_period(None).unwrap(), Period::Week);
        assert_eq!(parse_period(Some(" ")).unwrap(), Period::Week);
        assert_eq!(parse_period(Some("Month")).unwrap(), Period::Month);
        assert_eq!(parse_period(Some("all")).unwrap(), Period::All);
        assert!(parse_period(Some("fortnight")).is_err());
    }

    #[tokio::test]
    async fn summary_of_an_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), Some("ada")).await;
        let json = server.do_momentum_summary(None).await.unwrap();
        let summary: MomentumSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.summary, EMPTY_SUMMARY);
        assert!(summary.tag_analysis.is_empty());
    }

    #[tokio::test]
    async fn summary_after_logging() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), Some("ada")).await;
        server.do_log_momentum("Inbox zero", vec!["#focus".into()], None).await.unwrap();
        server.do_log_momentum("Gym", vec!["#health".into(), "#focus".into()], None).await.unwrap();

        let json = server.do_momentum_summary(Some("week")).await.unwrap();
        assert!(json.contains("\"tagAnalysis\""));
        let summary: MomentumSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.tagged_entries, 2);
        assert_eq!(summary.tag_analysis.get("#focus"), Some(&2));
        assert!(summary.summary.starts_with("You're on fire"));
    }

    #[tokio::test]
    async fn look_back_returns_stats() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), Some("ada")).await;
        server.do_log_momentum("Read a chapter", vec![], None).await.unwrap();

        let json = server.do_look_back(Some("all")).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["period"], "all");
        assert_eq!(value["stats"]["totalEntries"], 1);
        assert_eq!(value["stats"]["activeDays"], 1);
        assert_eq!(value["stats"]["currentStreak"], 1);
    }

    #[tokio::test]
    async fn summary_requires_a_caller() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), None).await;
        assert!(server.do_momentum_summary(None).await.is_err());
        assert!(server.do_look_back(None).await.is_err());
    }
}
