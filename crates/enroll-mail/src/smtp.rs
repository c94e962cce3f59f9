//! # SMTP Mail Sender
//!
//! Delivers one HTML message per call through the configured relay, over
//! implicit TLS on port 465 and STARTTLS elsewhere. Each send opens its own
//! transport session.

use crate::config::MailConfig;
use async_trait::async_trait;
use enroll_core::{MailMessage, MailReceipt, MailSender};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay not configured: {0} missing")]
    NotConfigured(&'static str),

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("relay error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

pub struct SmtpMailSender {
    config: MailConfig,
}

impl SmtpMailSender {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(MailConfig::from_env())
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    /// Build the message with a generated Message-ID.
    pub fn build_message(&self, message: &MailMessage) -> Result<(Message, String), MailError> {
        let user = self
            .config
            .user
            .as_deref()
            .ok_or(MailError::NotConfigured("MAIL_USER"))?;

        let from_address: Address = user.parse()?;
        let message_id = format!("<{}@{}>", Uuid::new_v4(), from_address.domain());
        let from = Mailbox::new(Some(self.config.from_name.clone()), from_address);
        let to: Mailbox = message.to.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())?;

        Ok((email, message_id))
    }

    async fn try_send(&self, message: &MailMessage) -> Result<MailReceipt, MailError> {
        let host = self
            .config
            .host
            .as_deref()
            .ok_or(MailError::NotConfigured("MAIL_HOST"))?;
        let user = self
            .config
            .user
            .clone()
            .ok_or(MailError::NotConfigured("MAIL_USER"))?;
        let password = self
            .config
            .password
            .clone()
            .ok_or(MailError::NotConfigured("MAIL_PASS"))?;

        let (email, message_id) = self.build_message(message)?;

        let builder = if self.config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };
        let transport = builder
            .port(self.config.port)
            .credentials(Credentials::new(user, password))
            .build();

        let response = transport.send(email).await?;

        Ok(MailReceipt {
            message_id,
            response: format!(
                "{} {}",
                response.code(),
                response.message().collect::<Vec<_>>().join(" ")
            ),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send_mail(&self, message: &MailMessage) -> Option<MailReceipt> {
        match self.try_send(message).await {
            Ok(receipt) => {
                info!("Email sent: message_id={}", receipt.message_id);
                Some(receipt)
            }
            Err(e) => {
                warn!("Email sending failed: {}", e);
                None
            }
        }
    }
}
