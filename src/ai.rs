use std::time::Duration;

use async_trait::async_trait;

use crate::config::AiConfig;
use crate::error::AiError;

/// A generative-text endpoint: one prompt in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Anthropic Messages API client with an explicit timeout and a bounded
/// number of attempts.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    timeout: Duration,
    max_attempts: u32,
}

impl AnthropicClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            url: config.url.clone(),
            timeout: config.timeout,
            max_attempts: config.max_attempts.max(1),
        })
    }

    async fn attempt(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{
                "role": "user",
                "content": prompt,
            }]
        });

        let resp = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: serde_json::Value = resp.json().await?;
        let text = data["content"][0]["text"]
            .as_str()
            .ok_or_else(|| AiError::Malformed("response has no text content".into()))?
            .trim();

        if text.is_empty() {
            return Err(AiError::Malformed("empty completion".into()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError> {
        let mut attempt = 1;
        loop {
            match self.attempt(prompt, max_tokens).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::debug!("AI attempt {} failed, retrying once: {}", attempt, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
