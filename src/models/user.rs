use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// User document as stored in the `users` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Older documents may lack it; they read as "now".
    #[serde(rename = "createdAt", default = "BsonDateTime::now")]
    pub created_at: BsonDateTime,
}

impl User {
    /// Builds a record ready for insertion: fresh id, creation time = now.
    pub fn new(new_user: NewUser) -> Self {
        User {
            id: ObjectId::new(),
            name: new_user.name,
            email: new_user.email,
            created_at: BsonDateTime::now(),
        }
    }
}

/// Validated input of the create-user operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Body of `POST /users`. Fields are optional here so that a missing field
/// is a validation failure instead of a parse failure.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CreateUserRequest {
    /// Both fields present and non-empty, or nothing.
    pub fn into_new_user(self) -> Option<NewUser> {
        let name = self.name.filter(|name| !name.is_empty())?;
        let email = self.email.filter(|email| !email.is_empty())?;
        Some(NewUser { name, email })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let created_at = DateTime::<Utc>::from_timestamp_millis(user.created_at.timestamp_millis())
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        UserResponse {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            created_at,
        }
    }
}
