//! Transactional Email
//!
//! Password-reset mail goes out through Resend's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::MailSettings;
use crate::infrastructure::metrics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail provider is not configured")]
    NotConfigured,

    #[error("Mail provider request failed: {0}")]
    Transport(String),

    #[error("Mail provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Build the password-reset email for `token`.
pub fn password_reset_email(to: &str, reset_url: &str, token: &str) -> EmailMessage {
    let link = format!("{}?token={}", reset_url, token);
    let html = format!(
        r#"<h2>Recuperación de contraseña</h2>
<p>Recibimos una solicitud para restablecer la contraseña de tu cuenta.</p>
<p><a href="{link}">Restablecer contraseña</a></p>
<p>Este enlace expira en 1 hora. Si no solicitaste el cambio, ignorá este correo.</p>"#
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Recuperación de contraseña".to_string(),
        html,
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Resend client (`POST /emails` with a bearer API key).
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    settings: MailSettings,
}

impl ResendMailer {
    pub fn new(settings: MailSettings) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self { client, settings })
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.settings.api_key.is_empty() {
            return Err(MailError::NotConfigured);
        }

        let request = SendEmailRequest {
            from: &self.settings.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.settings.base_url.trim_end_matches('/')))
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let result = self.deliver(&message).await;
        metrics::record_email("password_reset", result.is_ok());
        result
    }
}
