use crate::{parse_object_id, store_error};
use async_trait::async_trait;
use enroll_core::{CheckoutResult, Course, CourseStore};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const COLLECTION: &str = "courses";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub course_name: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub students_enrolled: Vec<ObjectId>,
}

impl From<CourseDocument> for Course {
    fn from(doc: CourseDocument) -> Self {
        Course {
            id: doc.id.to_hex(),
            name: doc.course_name,
            description: doc.course_description,
            thumbnail: doc.thumbnail,
            price: doc.price,
            students_enrolled: doc.students_enrolled.into_iter().map(|oid| oid.to_hex()).collect(),
        }
    }
}

#[derive(Clone)]
pub struct MongoCourseStore {
    courses: Arc<Collection<CourseDocument>>,
}

impl MongoCourseStore {
    pub(crate) fn new(db: &Database) -> Self {
        Self {
            courses: Arc::new(db.collection(COLLECTION)),
        }
    }
}

#[async_trait]
impl CourseStore for MongoCourseStore {
    async fn find_course(&self, course_id: &str) -> CheckoutResult<Option<Course>> {
        let id = parse_object_id(course_id)?;
        let course = self
            .courses
            .find_one(doc! { "_id": id })
            .await
            .map_err(store_error)?;
        Ok(course.map(Course::from))
    }

    async fn push_student(&self, course_id: &str, user_id: &str) -> CheckoutResult<Option<Course>> {
        let id = parse_object_id(course_id)?;
        let student = parse_object_id(user_id)?;
        info!("Enrolling student {} into course {}", user_id, course_id);

        let course = self
            .courses
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$push": { "studentsEnrolled": student } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(store_error)?;
        Ok(course.map(Course::from))
    }
}
