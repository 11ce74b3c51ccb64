//! Error types for the chat completion client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// Client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the provider
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// HTTP status of the provider response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenAIError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider is throttling this key (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Provider refused for billing reasons (HTTP 402).
    pub fn is_payment_required(&self) -> bool {
        self.status() == Some(402)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_provider_statuses() {
        let throttled = OpenAIError::Api {
            status: 429,
            message: "Rate limit reached".into(),
        };
        assert!(throttled.is_rate_limited());
        assert!(!throttled.is_payment_required());

        let billing = OpenAIError::Api {
            status: 402,
            message: "Payment required".into(),
        };
        assert!(billing.is_payment_required());

        let network = OpenAIError::Network("connection reset".into());
        assert_eq!(network.status(), None);
        assert!(!network.is_rate_limited());
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = OpenAIError::Api {
            status: 500,
            message: "upstream exploded".into(),
        };
        assert_eq!(err.to_string(), "API error (500): upstream exploded");
    }
}
