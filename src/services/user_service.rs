use crate::{
    database::MongoDB,
    models::{NewUser, User},
};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;
use std::fmt;

pub const COLLECTION: &str = "users";

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub enum StoreError {
    /// The email is already taken.
    DuplicateKey,
    StoreUnavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey => write!(f, "Duplicate key: email already exists"),
            StoreError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateKey
        } else {
            StoreError::StoreUnavailable(err.to_string())
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Persistence of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Every record, newest first.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<User>(COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User::new(new_user);

        self.collection.insert_one(&user).await?;

        log::debug!(user_id:% = user.id; "💾 User document inserted");

        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users: Vec<User> = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(users)
    }
}
