use crate::store_error;
use async_trait::async_trait;
use enroll_core::{CheckoutResult, ProcessedEvent, ProcessedEventStore};
use mongodb::bson::{doc, DateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Collection, Database};
use std::sync::Arc;
use tracing::info;

const COLLECTION: &str = "processed_webhook_events";

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

/// Processed webhook events, keyed by the processor's event id
#[derive(Clone)]
pub struct MongoProcessedEvents {
    events: Arc<Collection<Document>>,
}

impl MongoProcessedEvents {
    pub(crate) fn new(db: &Database) -> Self {
        Self {
            events: Arc::new(db.collection(COLLECTION)),
        }
    }
}

fn event_document(event: &ProcessedEvent) -> Document {
    doc! {
        "_id": event.event_id.as_str(),
        "eventType": event.event_type.as_str(),
        "processedAt": DateTime::from_millis(event.processed_at.timestamp_millis()),
    }
}

#[async_trait]
impl ProcessedEventStore for MongoProcessedEvents {
    async fn claim(&self, event: ProcessedEvent) -> CheckoutResult<bool> {
        match self.events.insert_one(event_document(&event)).await {
            Ok(_) => {
                info!("Claimed webhook event {}", event.event_id);
                Ok(true)
            }
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(store_error(e)),
        }
    }

    async fn release(&self, event_id: &str) -> CheckoutResult<()> {
        info!("Releasing webhook event {}", event_id);
        self.events
            .delete_one(doc! { "_id": event_id })
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}
