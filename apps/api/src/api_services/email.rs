use std::sync::Arc;

use tracing::warn;
use trustgate_application::EmailService;
use trustgate_core::AppError;
use trustgate_infrastructure::{ConsoleEmailService, SmtpEmailConfig, SmtpEmailService};

use crate::api_config::{ApiConfig, EmailProviderConfig};

pub(super) fn build_email_service(
    config: &ApiConfig,
) -> Result<Option<Arc<dyn EmailService>>, AppError> {
    let service: Arc<dyn EmailService> = match &config.email_provider {
        EmailProviderConfig::Disabled => {
            warn!("email delivery disabled, invitations will not be sent");
            return Ok(None);
        }
        EmailProviderConfig::Console => Arc::new(ConsoleEmailService::new()),
        EmailProviderConfig::Smtp(smtp) => {
            let smtp_config = SmtpEmailConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                from_address: smtp.from_address.clone(),
            };
            Arc::new(SmtpEmailService::new(smtp_config)?)
        }
    };

    Ok(Some(service))
}
