//! # Record Store Ports
//!
//! Persistence seams for courses, users and processed webhook events, plus
//! a thread-safe in-memory implementation used for development and tests.
//!
//! The enrollment pushes are single-record atomic appends. Nothing makes the
//! course push and the user push atomic together.

use crate::course::{Catalog, Course, User};
use crate::error::CheckoutResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_course(&self, course_id: &str) -> CheckoutResult<Option<Course>>;

    /// Append `user_id` to the course's enrolled set.
    ///
    /// Returns the updated course, or `None` if no course matched.
    async fn push_student(&self, course_id: &str, user_id: &str) -> CheckoutResult<Option<Course>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> CheckoutResult<Option<User>>;

    /// Append `course_id` to the user's course set.
    ///
    /// Returns the updated user, or `None` if no user matched.
    async fn push_course(&self, user_id: &str, course_id: &str) -> CheckoutResult<Option<User>>;
}

/// Claim on a webhook event id, held while and after its enrollment runs
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEvent {
    pub event_id: String,
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedEvent {
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
        }
    }
}

/// Dedup record for replayed webhook deliveries.
///
/// A delivery claims its event id before enrolling. Claiming is atomic, so
/// of two concurrent deliveries of one event only one proceeds.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Returns false if the event id is already claimed.
    async fn claim(&self, event: ProcessedEvent) -> CheckoutResult<bool>;

    /// Drop a claim whose enrollment failed, so a redelivery can retry it.
    async fn release(&self, event_id: &str) -> CheckoutResult<()>;
}

pub type SharedCourseStore = Arc<dyn CourseStore>;
pub type SharedUserStore = Arc<dyn UserStore>;
pub type SharedProcessedEventStore = Arc<dyn ProcessedEventStore>;

#[derive(Default)]
struct Records {
    courses: HashMap<String, Course>,
    users: HashMap<String, User>,
}

/// A thread-safe in-memory store for courses and users.
///
/// Both collections sit behind one `RwLock`, but each push takes the lock
/// separately, so enrollment is no more atomic here than against a database.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded from a catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        let records = Records {
            courses: catalog
                .courses
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            users: catalog.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        };
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert_course(&self, course: Course) {
        let mut records = self.records.write().await;
        records.courses.insert(course.id.clone(), course);
    }

    pub async fn insert_user(&self, user: User) {
        let mut records = self.records.write().await;
        records.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn find_course(&self, course_id: &str) -> CheckoutResult<Option<Course>> {
        let records = self.records.read().await;
        Ok(records.courses.get(course_id).cloned())
    }

    async fn push_student(&self, course_id: &str, user_id: &str) -> CheckoutResult<Option<Course>> {
        let mut records = self.records.write().await;
        Ok(records.courses.get_mut(course_id).map(|course| {
            course.students_enrolled.push(user_id.to_string());
            course.clone()
        }))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, user_id: &str) -> CheckoutResult<Option<User>> {
        let records = self.records.read().await;
        Ok(records.users.get(user_id).cloned())
    }

    async fn push_course(&self, user_id: &str, course_id: &str) -> CheckoutResult<Option<User>> {
        let mut records = self.records.write().await;
        Ok(records.users.get_mut(user_id).map(|user| {
            user.courses.push(course_id.to_string());
            user.clone()
        }))
    }
}

/// In-memory processed-event records
#[derive(Default, Clone)]
pub struct InMemoryProcessedEvents {
    events: Arc<RwLock<HashMap<String, ProcessedEvent>>>,
}

impl InMemoryProcessedEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEvents {
    async fn claim(&self, event: ProcessedEvent) -> CheckoutResult<bool> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.event_id) {
            return Ok(false);
        }
        events.insert(event.event_id.clone(), event);
        Ok(true)
    }

    async fn release(&self, event_id: &str) -> CheckoutResult<()> {
        self.events.write().await.remove(event_id);
        Ok(())
    }
}
