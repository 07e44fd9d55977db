/// Transactional email delivery
///
/// Delivery is abstracted behind the [`EmailSender`] trait so the notifier can
/// run against the real provider API, a log-only noop when no provider is
/// configured, or a recording fake in tests.
///
/// All sends on request paths are best-effort; callers log failures and carry
/// on. See the notifier for the fire-and-forget policy.
use async_trait::async_trait;
use serde_json::json;

use crate::config::EmailConfig;

/// Error type for email delivery
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email request failed: {0}")]
    Request(String),

    #[error("email provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// A single outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery abstraction over the email provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Sends mail through the provider's HTTP API
pub struct HttpEmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "from": self.config.from_address,
                "to": message.to,
                "subject": message.subject,
                "text": message.body,
            }))
            .send()
            .await
            .map_err(|e| EmailError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Provider { status, body });
        }

        Ok(())
    }
}

/// Logs messages instead of sending them
///
/// Used when no email provider is configured, so development setups work
/// without credentials.
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email provider not configured; message not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sender_accepts_everything() {
        let sender = NoopEmailSender;
        let result = sender
            .send(EmailMessage {
                to: "a@example.com".to_string(),
                subject: "hello".to_string(),
                body: "body".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }
}
