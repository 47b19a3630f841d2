//! In-process `UserStore` used by the HTTP tests.

use crate::{
    models::{NewUser, User},
    services::user_service::{StoreError, UserStore},
};
use async_trait::async_trait;
use std::sync::Mutex;

/// Keeps records in insertion order and enforces email uniqueness the way
/// the unique index does.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|user| user.email == new_user.email) {
            return Err(StoreError::DuplicateKey);
        }

        let user = User::new(new_user);
        users.push(user.clone());
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.lock().unwrap().iter().rev().cloned().collect();
        // Stable: records created in the same millisecond stay newest first.
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

/// Store whose every call fails, for the 500 paths.
pub struct UnavailableUserStore;

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn create(&self, _new_user: NewUser) -> Result<User, StoreError> {
        Err(StoreError::StoreUnavailable("connection refused".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Err(StoreError::StoreUnavailable("connection refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn rejects_second_record_with_same_email() {
        let store = InMemoryUserStore::default();

        store.create(new_user("Ann", "ann@x.com")).await.unwrap();
        let second = store.create(new_user("Other Ann", "ann@x.com")).await;

        assert!(matches!(second, Err(StoreError::DuplicateKey)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = InMemoryUserStore::default();

        store.create(new_user("Ann", "ann@x.com")).await.unwrap();
        store.create(new_user("Bob", "bob@x.com")).await.unwrap();
        store.create(new_user("Cid", "cid@x.com")).await.unwrap();

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.name)
            .collect();

        assert_eq!(names, vec!["Cid", "Bob", "Ann"]);
    }
}
