//! # Course and User
//!
//! The two records an enrollment touches. A course keeps the ids of its
//! students, a user keeps the ids of their courses; enrollment appends to
//! both. Neither set deduplicates on insertion.

use crate::currency::{Currency, CHECKOUT_CURRENCY};
use serde::{Deserialize, Serialize};

/// A purchasable course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Record id
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Thumbnail reference (URL)
    #[serde(default)]
    pub thumbnail: String,

    /// Price in whole units of the checkout currency
    pub price: f64,

    /// Ids of enrolled students, in insertion order
    #[serde(default)]
    pub students_enrolled: Vec<String>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            thumbnail: String::new(),
            price,
            students_enrolled: Vec::new(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set thumbnail
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = url.into();
        self
    }

    /// Builder: add an enrolled student
    pub fn with_student(mut self, user_id: impl Into<String>) -> Self {
        self.students_enrolled.push(user_id.into());
        self
    }

    pub fn is_enrolled(&self, user_id: &str) -> bool {
        self.students_enrolled.iter().any(|s| s == user_id)
    }

    /// Charge amount in the smallest unit of the checkout currency
    pub fn amount_due(&self) -> i64 {
        CHECKOUT_CURRENCY.to_smallest_unit(self.price)
    }

    pub fn currency(&self) -> Currency {
        CHECKOUT_CURRENCY
    }
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Ids of enrolled courses, in insertion order
    #[serde(default)]
    pub courses: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            courses: Vec::new(),
        }
    }
}

/// Seed data for the in-memory store (loaded from `config/courses.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Catalog {
    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
