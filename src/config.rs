use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, Offset, Utc};

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_AI_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
const MAX_AI_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    /// Authenticated caller. `None` means every entry point rejects the request.
    pub user_id: Option<String>,
    pub ai: AiConfig,
    /// Offset used to bucket entries into the user's local calendar days.
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` disables the AI path; every reflection uses the fallback text.
    pub api_key: Option<String>,
    pub model: String,
    pub url: String,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_path = PathBuf::from(non_empty("MINDSHIFT_STORE_PATH").unwrap_or_else(|| {
            let home = lookup("HOME").unwrap_or_else(|| ".".into());
            format!("{}/.mindshift/store", home)
        }));

        let timeout_secs = match non_empty("MINDSHIFT_AI_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MINDSHIFT_AI_TIMEOUT_SECS is not a number: {}", v))?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("MINDSHIFT_AI_TIMEOUT_SECS must be greater than zero");
        }

        let max_attempts = match non_empty("MINDSHIFT_AI_MAX_ATTEMPTS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("MINDSHIFT_AI_MAX_ATTEMPTS is not a number: {}", v))?,
            None => 1,
        }
        .clamp(1, MAX_AI_ATTEMPTS);

        let utc_offset = match non_empty("MINDSHIFT_UTC_OFFSET") {
            Some(v) => parse_offset(&v)?,
            None => utc(),
        };

        Ok(Self {
            store_path,
            user_id: non_empty("MINDSHIFT_USER_ID").map(|v| v.trim().to_string()),
            ai: AiConfig {
                // Placeholder values in a copied .env file count as unset.
                api_key: non_empty("ANTHROPIC_API_KEY").filter(|k| !k.starts_with('<')),
                model: non_empty("MINDSHIFT_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                url: non_empty("MINDSHIFT_AI_URL").unwrap_or_else(|| DEFAULT_AI_URL.into()),
                timeout: Duration::from_secs(timeout_secs),
                max_attempts,
            },
            utc_offset,
        })
    }
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => bail!("invalid UTC offset '{}': expected +HH:MM or -HH:MM", raw),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("invalid UTC offset '{}': expected +HH:MM or -HH:MM", raw);
    }

    let hours: i32 = digits[..2].parse()?;
    let minutes: i32 = digits[2..].parse()?;
    if hours > 14 || minutes > 59 {
        bail!("UTC offset out of range: {}", raw);
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("UTC offset out of range: {}", raw))
}
