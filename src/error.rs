use thiserror::Error;

/// Errors that may reach a caller of the momentum entry points.
///
/// AI failures never show up here: they are recovered inside the composer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unauthenticated: sign in to view your momentum")]
    Unauthenticated,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: could not load your momentum right now")]
    Internal(String),
}

impl ServiceError {
    /// Log the underlying cause and collapse it into the generic internal error.
    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!("internal failure: {:#}", err);
        ServiceError::Internal(err.to_string())
    }
}

/// Failures of the generative-text endpoint.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI endpoint rate limited the request")]
    RateLimited,

    #[error("AI request timed out")]
    Timeout,

    #[error("AI endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("malformed AI response: {0}")]
    Malformed(String),
}

impl AiError {
    /// Whether a second bounded attempt is worth making.
    pub fn is_transient(&self) -> bool {
        match self {
            AiError::Timeout | AiError::Transport(_) => true,
            AiError::Http { status, .. } => *status >= 500,
            AiError::RateLimited | AiError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_decode() {
            AiError::Malformed(e.to_string())
        } else {
            AiError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(AiError::Timeout.is_transient());
        assert!(AiError::Transport("reset".into()).is_transient());
        assert!(AiError::Http { status: 503, body: String::new() }.is_transient());
        assert!(!AiError::Http { status: 400, body: String::new() }.is_transient());
        assert!(!AiError::RateLimited.is_transient());
        assert!(!AiError::Malformed("no text".into()).is_transient());
    }

    #[test]
    fn internal_error_hides_cause_from_display() {
        let err = ServiceError::internal(anyhow::anyhow!("disk I/O error"));
        assert_eq!(
            err.to_string(),
            "internal error: could not load your momentum right now"
        );
        assert_eq!(err, ServiceError::Internal("disk I/O error".into()));
    }
}
