use crate::{parse_object_id, store_error};
use async_trait::async_trait;
use enroll_core::{CheckoutResult, User, UserStore};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const COLLECTION: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    #[serde(default)]
    pub courses: Vec<ObjectId>,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id.to_hex(),
            email: doc.email,
            courses: doc.courses.into_iter().map(|oid| oid.to_hex()).collect(),
        }
    }
}

#[derive(Clone)]
pub struct MongoUserStore {
    users: Arc<Collection<UserDocument>>,
}

impl MongoUserStore {
    pub(crate) fn new(db: &Database) -> Self {
        Self {
            users: Arc::new(db.collection(COLLECTION)),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_user(&self, user_id: &str) -> CheckoutResult<Option<User>> {
        let id = parse_object_id(user_id)?;
        let user = self
            .users
            .find_one(doc! { "_id": id })
            .await
            .map_err(store_error)?;
        Ok(user.map(User::from))
    }

    async fn push_course(&self, user_id: &str, course_id: &str) -> CheckoutResult<Option<User>> {
        let id = parse_object_id(user_id)?;
        let course = parse_object_id(course_id)?;
        info!("Adding course {} to user {}", course_id, user_id);

        let user = self
            .users
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$push": { "courses": course } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(store_error)?;
        Ok(user.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_document_to_user() {
        let user_id = ObjectId::new();
        let course = ObjectId::new();
        let raw = doc! {
            "_id": user_id,
            "email": "learner@example.com",
            "firstName": "Asha",
            "courses": [course, course],
        };

        let document: UserDocument = bson::from_document(raw).unwrap();
        let user = User::from(document);

        assert_eq!(user.id, user_id.to_hex());
        assert_eq!(user.email, "learner@example.com");
        assert_eq!(user.courses, vec![course.to_hex(), course.to_hex()]);
    }
}
