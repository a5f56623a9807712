use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    Message,
    SmtpTransport,
    Transport,
};
use service_core::error::AppError;
use std::time::Duration;

use crate::config::SmtpConfig;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Delivers a contact-form message to the site inbox, with the sender's
    /// address set as reply-to.
    async fn send_contact_email(
        &self,
        name: &str,
        reply_to: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SmtpEmailService {
    mailer: SmtpTransport,
    from_email: String,
    contact_recipient: String,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.app_password.clone());

        let mailer = SmtpTransport::relay("smtp.gmail.com")
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(587)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!("Email service initialized with Gmail SMTP");

        Ok(Self {
            mailer,
            from_email: config.user.clone(),
            contact_recipient: config.contact_recipient.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailService {
    async fn send_contact_email(
        &self,
        name: &str,
        reply_to: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), AppError> {
        let body = format!("From: {name} <{reply_to}>\n\n{message}");

        let email = Message::builder()
            .from(self.from_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .reply_to(reply_to.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .to(self.contact_recipient.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::InternalError(e.into()))?;

        // Send in the blocking pool; SmtpTransport is synchronous.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(
                    reply_to = %reply_to,
                    subject = %subject,
                    "Contact email sent successfully"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e.to_string(),
                    reply_to = %reply_to,
                    "Failed to send contact email"
                );
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

#[derive(Clone)]
pub struct MockEmailService;

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_contact_email(
        &self,
        _name: &str,
        _reply_to: &str,
        _subject: &str,
        _message: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_service_creation() {
        let config = SmtpConfig {
            user: "test@gmail.com".to_string(),
            app_password: "test_password".to_string(),
            contact_recipient: "inbox@example.com".to_string(),
        };

        let service = SmtpEmailService::new(&config);
        assert!(service.is_ok());
    }
}
