//! # enroll-store
//!
//! MongoDB implementations of the record store ports.
//!
//! Collections:
//! - `courses`: `{ _id, courseName, courseDescription, thumbnail, price, studentsEnrolled }`
//! - `users`: `{ _id, email, courses }`
//! - `processed_webhook_events`: `{ _id: <event id>, eventType, processedAt }`,
//!   one document per claimed event

pub mod course;
pub mod events;
pub mod user;

use anyhow::{Context, Result};
use enroll_core::CheckoutError;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Database};
use tracing::info;

pub use course::MongoCourseStore;
pub use events::MongoProcessedEvents;
pub use user::MongoUserStore;

/// Default database name of the platform
pub const DEFAULT_DB_NAME: &str = "studynotion";

#[derive(Clone)]
pub struct MongoStorage {
    _client: Client,
    pub courses: MongoCourseStore,
    pub users: MongoUserStore,
    pub processed_events: MongoProcessedEvents,
}

impl MongoStorage {
    /// Connect and ping the database
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let db: Database = client.database(db_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .context("Failed to ping MongoDB")?;
        info!("Connected to MongoDB database {}", db_name);

        Ok(Self {
            _client: client,
            courses: MongoCourseStore::new(&db),
            users: MongoUserStore::new(&db),
            processed_events: MongoProcessedEvents::new(&db),
        })
    }
}

/// Parse a hex record id; invalid ids fail like any other lookup error.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, CheckoutError> {
    ObjectId::parse_str(id).map_err(|_| {
        CheckoutError::Store(format!("Cast to ObjectId failed for value \"{}\"", id))
    })
}

pub(crate) fn store_error(err: mongodb::error::Error) -> CheckoutError {
    CheckoutError::Store(err.to_string())
}
