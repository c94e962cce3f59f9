//! # Application State
//!
//! Shared state for the Axum application.
//! Configuration is read once at startup; the processor, stores and mail
//! sender are shared behind `Arc`.

use anyhow::Context;
use enroll_core::{
    BoxedMailSender, BoxedPaymentProcessor, Catalog, InMemoryProcessedEvents, InMemoryStore,
    SharedCourseStore, SharedProcessedEventStore, SharedUserStore,
};
use enroll_mail::SmtpMailSender;
use enroll_store::{MongoStorage, DEFAULT_DB_NAME};
use enroll_stripe::StripePaymentIntents;
use std::sync::Arc;

/// Where courses and users live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Seeded from a TOML catalog, lost on restart
    Memory,
    MongoDb,
}

impl StoreBackend {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            other => anyhow::bail!("Unknown STORE_BACKEND: {}", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    pub store_backend: StoreBackend,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    /// TOML catalog for the memory backend
    pub course_seed_path: String,
    /// Skip webhook events whose id was already processed
    pub webhook_dedup: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => StoreBackend::parse(&value)?,
            Err(_) => StoreBackend::Memory,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            store_backend,
            mongodb_uri: std::env::var("MONGODB_URI").ok(),
            mongodb_database: std::env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            course_seed_path: std::env::var("COURSE_SEED_PATH")
                .unwrap_or_else(|_| "config/courses.toml".to_string()),
            webhook_dedup: std::env::var("WEBHOOK_DEDUP")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            store_backend: StoreBackend::Memory,
            mongodb_uri: None,
            mongodb_database: DEFAULT_DB_NAME.to_string(),
            course_seed_path: "config/courses.toml".to_string(),
            webhook_dedup: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub processor: BoxedPaymentProcessor,
    pub courses: SharedCourseStore,
    pub users: SharedUserStore,
    pub mailer: BoxedMailSender,
    /// Present only when webhook dedup is enabled
    pub processed_events: Option<SharedProcessedEventStore>,
}

impl AppState {
    /// Assemble state from explicit components
    pub fn new(
        config: AppConfig,
        processor: BoxedPaymentProcessor,
        courses: SharedCourseStore,
        users: SharedUserStore,
        mailer: BoxedMailSender,
    ) -> Self {
        Self {
            config: Arc::new(config),
            processor,
            courses,
            users,
            mailer,
            processed_events: None,
        }
    }

    /// Builder: enable the processed-event guard
    pub fn with_processed_events(mut self, store: SharedProcessedEventStore) -> Self {
        self.processed_events = Some(store);
        self
    }

    /// Build state from environment variables
    pub async fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let processor = StripePaymentIntents::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        tracing::info!(
            "Stripe mode: {}",
            if processor.config().is_test_mode() {
                "test"
            } else {
                "live"
            }
        );
        let mailer = SmtpMailSender::from_env();
        if !mailer.config().is_configured() {
            tracing::warn!("Mail relay not configured, enrollment emails will not be delivered");
        }

        let processor: BoxedPaymentProcessor = Arc::new(processor);
        let mailer: BoxedMailSender = Arc::new(mailer);
        let dedup = config.webhook_dedup;

        match config.store_backend {
            StoreBackend::Memory => {
                let catalog = load_catalog(&config.course_seed_path)?;
                let store = InMemoryStore::from_catalog(catalog);
                let state = Self::new(
                    config,
                    processor,
                    Arc::new(store.clone()),
                    Arc::new(store),
                    mailer,
                );
                Ok(if dedup {
                    state.with_processed_events(Arc::new(InMemoryProcessedEvents::new()))
                } else {
                    state
                })
            }
            StoreBackend::MongoDb => {
                let uri = config
                    .mongodb_uri
                    .clone()
                    .context("MONGODB_URI must be set when STORE_BACKEND=mongodb")?;
                let storage = MongoStorage::connect(&uri, &config.mongodb_database).await?;
                let state = Self::new(
                    config,
                    processor,
                    Arc::new(storage.courses.clone()),
                    Arc::new(storage.users.clone()),
                    mailer,
                );
                Ok(if dedup {
                    state.with_processed_events(Arc::new(storage.processed_events))
                } else {
                    state
                })
            }
        }
    }
}

/// Load the seed catalog for the memory backend
fn load_catalog(path: &str) -> anyhow::Result<Catalog> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let catalog = Catalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            tracing::info!(
                "Loaded {} courses and {} users from {}",
                catalog.courses.len(),
                catalog.users.len(),
                path
            );
            Ok(catalog)
        }
        Err(_) => {
            tracing::warn!("No course catalog found at {}, using empty catalog", path);
            Ok(Catalog::default())
        }
    }
}
