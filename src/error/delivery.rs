use thiserror::Error;

/// Outcome of a failed delivery attempt.
///
/// The dispatcher re-queues `Retryable` failures with backoff and marks the rule's
/// target broken on `Terminal` failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Rate limit, transient network error or upstream 5xx.
    #[error("Retryable delivery failure: {0}")]
    Retryable(String),

    /// Channel or webhook deleted, permission revoked, or the request can never succeed.
    #[error("Terminal delivery failure: {0}")]
    Terminal(String),
}

impl DeliveryError {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryError::Terminal(_))
    }

    /// Classifies an HTTP status code returned by the messaging API.
    ///
    /// # Arguments
    /// - `status` - HTTP status code of the failed request
    /// - `message` - Error text kept for logging and rule health
    ///
    /// # Returns
    /// - `DeliveryError::Retryable` - 429 and 5xx
    /// - `DeliveryError::Terminal` - every other status (401, 403, 404 and remaining 4xx)
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = format!("HTTP {}: {}", status, message.into());
        match status {
            429 | 500..=599 => DeliveryError::Retryable(message),
            _ => DeliveryError::Terminal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable() {
        assert!(!DeliveryError::from_status(429, "slow down").is_terminal());
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(!DeliveryError::from_status(500, "oops").is_terminal());
        assert!(!DeliveryError::from_status(502, "bad gateway").is_terminal());
        assert!(!DeliveryError::from_status(503, "unavailable").is_terminal());
    }

    #[test]
    fn missing_target_and_permissions_are_terminal() {
        assert!(DeliveryError::from_status(401, "unauthorized").is_terminal());
        assert!(DeliveryError::from_status(403, "Missing Access").is_terminal());
        assert!(DeliveryError::from_status(404, "Unknown Channel").is_terminal());
    }

    #[test]
    fn keeps_status_in_message() {
        let err = DeliveryError::from_status(404, "Unknown Webhook");
        assert_eq!(
            err,
            DeliveryError::Terminal("HTTP 404: Unknown Webhook".to_string())
        );
    }
}
