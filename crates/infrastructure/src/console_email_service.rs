//! Email transport that writes messages to the log instead of sending them.

use async_trait::async_trait;
use tracing::info;
use trustgate_application::EmailService;
use trustgate_core::AppResult;

/// Development transport. Invitation links show up in the tracing output.
#[derive(Clone, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a console transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            to,
            subject,
            has_html = html_body.is_some(),
            "email (console transport)\n{text_body}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trustgate_application::EmailService;

    use super::ConsoleEmailService;

    #[tokio::test]
    async fn console_transport_always_accepts() {
        let result = ConsoleEmailService::new()
            .send_email("new@acme.test", "Invite", "body", None)
            .await;

        assert!(result.is_ok());
    }
}
