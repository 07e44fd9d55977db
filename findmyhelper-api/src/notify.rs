/// Notification dispatcher
///
/// Renders the four transactional messages and hands them to the configured
/// [`EmailSender`]. Every send here is fire-and-forget: a delivery failure is
/// logged at `warn` and never fails the enclosing request. There is no retry
/// or outbox.
use std::sync::Arc;

use findmyhelper_shared::models::{ServiceProvider, User};

use crate::services::email::{EmailMessage, EmailSender};

/// Formats and dispatches transactional email
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn EmailSender>,

    /// External base URL for links in message bodies
    public_base_url: String,

    /// Recipient of new-application alerts (config-driven)
    admin_address: Option<String>,
}

impl Notifier {
    pub fn new(
        sender: Arc<dyn EmailSender>,
        public_base_url: String,
        admin_address: Option<String>,
    ) -> Self {
        Self {
            sender,
            public_base_url,
            admin_address,
        }
    }

    async fn dispatch(&self, kind: &str, message: EmailMessage) {
        if let Err(e) = self.sender.send(message).await {
            tracing::warn!(kind, error = %e, "Notification send failed");
        }
    }

    /// Emails the verification link after local registration
    pub async fn send_verification(&self, user: &User, token: &str) {
        let link = format!("{}/verify-email?token={}", self.public_base_url, token);
        self.dispatch(
            "verification",
            EmailMessage {
                to: user.email.clone(),
                subject: "Verify your FindMyHelper email".to_string(),
                body: format!(
                    "Welcome to FindMyHelper!\n\n\
                     Please confirm your email address by opening this link:\n{}\n\n\
                     If you did not create this account, ignore this message.",
                    link
                ),
            },
        )
        .await;
    }

    /// Alerts the admin address about a new provider application
    pub async fn send_new_application_alert(&self, user: &User, provider: &ServiceProvider) {
        let Some(admin_address) = &self.admin_address else {
            tracing::warn!("No admin notification address configured; skipping application alert");
            return;
        };

        self.dispatch(
            "new_application",
            EmailMessage {
                to: admin_address.clone(),
                subject: "New provider application awaiting review".to_string(),
                body: format!(
                    "A new provider application needs review.\n\n\
                     Applicant: {} ({})\n\
                     Provider id: {}\n\
                     Hourly rate: {:.2}\n",
                    user.full_name.as_deref().unwrap_or("unnamed"),
                    user.email,
                    provider.id,
                    provider.hourly_rate,
                ),
            },
        )
        .await;
    }

    /// Tells the applicant their application was approved
    pub async fn send_approval(&self, user: &User) {
        self.dispatch(
            "approval",
            EmailMessage {
                to: user.email.clone(),
                subject: "Your provider application was approved".to_string(),
                body: "Good news! Your FindMyHelper provider application has been approved. \
                       Your profile is now visible to clients."
                    .to_string(),
            },
        )
        .await;
    }

    /// Tells the applicant their application was rejected, with the notes
    pub async fn send_rejection(&self, user: &User, notes: &str) {
        self.dispatch(
            "rejection",
            EmailMessage {
                to: user.email.clone(),
                subject: "Your provider application was not approved".to_string(),
                body: format!(
                    "Unfortunately your FindMyHelper provider application was not approved.\n\n\
                     Reviewer notes: {}",
                    notes
                ),
            },
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::services::email::EmailError;

    struct RecordingSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::Request("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn test_user() -> User {
        User {
            id: 1,
            email: "user@example.com".to_string(),
            password_hash: None,
            auth_provider: None,
            full_name: Some("Jo Client".to_string()),
            phone: None,
            profile_image_url: None,
            email_verified: true,
            verification_token: None,
            is_admin: false,
            is_provider: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_verification_contains_token_link() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = Notifier::new(
            sender.clone(),
            "https://fmh.example".to_string(),
            None,
        );

        notifier.send_verification(&test_user(), "tok123").await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
        assert!(sent[0]
            .body
            .contains("https://fmh.example/verify-email?token=tok123"));
    }

    #[tokio::test]
    async fn test_send_failure_does_not_panic() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let notifier = Notifier::new(sender, "https://fmh.example".to_string(), None);

        // Must swallow the failure.
        notifier.send_approval(&test_user()).await;
    }

    #[tokio::test]
    async fn test_alert_skipped_without_admin_address() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = Notifier::new(sender.clone(), "https://fmh.example".to_string(), None);

        let provider = ServiceProvider {
            id: 7,
            user_id: 1,
            category_id: 1,
            hourly_rate: 30.0,
            bio: None,
            approval_status: findmyhelper_shared::models::ApprovalStatus::Pending,
            is_verified: false,
            verification_image_url: Some("https://objects.test/id.jpg".to_string()),
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            rating: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        notifier
            .send_new_application_alert(&test_user(), &provider)
            .await;
        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
