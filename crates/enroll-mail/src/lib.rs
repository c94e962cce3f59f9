//! # enroll-mail
//!
//! SMTP relay implementation of `MailSender`.
//!
//! Sending never fails from the caller's point of view: any error (relay not
//! configured, bad address, relay rejection) is logged at warn level and
//! the send yields `None`.

pub mod config;
pub mod smtp;

pub use config::MailConfig;
pub use smtp::{MailError, SmtpMailSender};
