//! User persistence contract
//!
//! The authentication core only needs a handful of row-shaped queries
//! against user storage. This module defines that contract as a trait so
//! the relational backing (owned by the panel API) stays out of the core,
//! and provides an in-memory implementation for tests and tooling.

use crate::user::User;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Query contract for user storage.
///
/// Lookups return `Ok(None)` for absent rows; `Err` is reserved for
/// backend failures. Callers in the authentication core are expected to
/// collapse `None` into their own error taxonomy so that "no such user"
/// is indistinguishable from "wrong password" at the boundary.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email within a partner.
    async fn find_by_email(&self, partner_id: Uuid, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] when the
    /// (partner_id, email) pair already exists.
    async fn insert(&self, user: User) -> StoreResult<()>;
}

/// In-memory user store.
///
/// Suitable for tests and local tooling. Enforces the same
/// (partner_id, email) uniqueness a relational backing would.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with users.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, partner_id: Uuid, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.partner_id == partner_id && u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.partner_id == user.partner_id && u.email == user.email)
        {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists for partner",
                user.email
            )));
        }
        users.push(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryUserStore::new();
        let user = User::new(Uuid::now_v7(), "a@x.com", "hash");
        let partner_id = user.partner_id;
        let user_id = user.id;

        store.insert(user).await.unwrap();

        let by_email = store.find_by_email(partner_id, "a@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user_id);

        let by_id = store.find_by_id(user_id).await.unwrap();
        assert_eq!(by_id.unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_email_scoped_to_partner() {
        let store = MemoryUserStore::new();
        let p1 = Uuid::now_v7();
        let p2 = Uuid::now_v7();

        store.insert(User::new(p1, "a@x.com", "h1")).await.unwrap();
        // Same email under a different partner is a distinct user.
        store.insert(User::new(p2, "a@x.com", "h2")).await.unwrap();

        assert!(store.find_by_email(p1, "a@x.com").await.unwrap().is_some());
        assert!(store.find_by_email(p2, "a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let store = MemoryUserStore::new();
        let partner_id = Uuid::now_v7();

        store
            .insert(User::new(partner_id, "a@x.com", "h1"))
            .await
            .unwrap();
        let result = store.insert(User::new(partner_id, "a@x.com", "h2")).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let store = MemoryUserStore::new();
        let found = store.find_by_id(Uuid::now_v7()).await.unwrap();
        assert!(found.is_none());
    }
}
