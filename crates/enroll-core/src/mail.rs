//! # Mail Sender Trait
//!
//! Transactional email is a fire-and-forget side effect of enrollment.
//! Implementations never return an error: a failed or unconfigured send
//! yields `None` and is logged by the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An HTML email to a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl MailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

/// Relay acknowledgement for a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailReceipt {
    /// Message-ID header of the sent message
    pub message_id: String,
    /// Relay response text
    #[serde(default)]
    pub response: String,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send one message; `None` on any failure.
    async fn send_mail(&self, message: &MailMessage) -> Option<MailReceipt>;
}

pub type BoxedMailSender = Arc<dyn MailSender>;
