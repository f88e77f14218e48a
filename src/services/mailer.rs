use async_trait::async_trait;

/// Outbound mail boundary. Delivery itself lives outside this service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str);

    async fn send_password_reset(&self, email: &str, reset_url: &str);
}

/// Writes outgoing mail to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) {
        tracing::info!("Verification token for {}: {}", email, token);
    }

    async fn send_password_reset(&self, email: &str, reset_url: &str) {
        tracing::info!("Password reset link for {}: {}", email, reset_url);
    }
}
