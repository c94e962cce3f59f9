//! Mail relay configuration

use std::env;

/// Implicit-TLS submission port
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP relay configuration.
///
/// Every field is optional: a missing host or credential is not an error at
/// startup, it just makes each send fail and yield no receipt.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay host (e.g. smtp.gmail.com)
    pub host: Option<String>,

    /// Relay port; 465 uses implicit TLS, any other port upgrades with STARTTLS
    pub port: u16,

    /// Login user; also the sender address
    pub user: Option<String>,

    /// Login password (app password)
    pub password: Option<String>,

    /// Display name in the From header
    pub from_name: String,
}

impl MailConfig {
    /// Load from `MAIL_HOST`, `MAIL_PORT`, `MAIL_USER`, `MAIL_PASS`, `MAIL_FROM_NAME`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: non_empty_var("MAIL_HOST"),
            port: env::var("MAIL_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            user: non_empty_var("MAIL_USER"),
            password: non_empty_var("MAIL_PASS"),
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| default_from_name()),
        }
    }

    /// Config with explicit relay values
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: Some(host.into()),
            port: DEFAULT_SMTP_PORT,
            user: Some(user.into()),
            password: Some(password.into()),
            from_name: default_from_name(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
    }

    /// Whether the session starts in TLS rather than upgrading with STARTTLS
    pub fn implicit_tls(&self) -> bool {
        self.port == DEFAULT_SMTP_PORT
    }

    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.user.is_some() && self.password.is_some()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
            from_name: default_from_name(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_from_name() -> String {
    "StudyNotion".to_string()
}
