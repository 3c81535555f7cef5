//! Identity connection store
//!
//! Durable links between a local user and an external provider identity.
//! The composite uniqueness of (partner, provider, subject) is what makes
//! OIDC login safe: one external subject can resolve to at most one local
//! account, and a replayed subject cannot be attached to a second one.
//! Concurrent connect attempts are decided by this constraint, not by
//! locking in the bridge.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use panel_core::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A stored provider↔user connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityConnection {
    /// Local user
    pub user_id: Uuid,

    /// Partner the user belongs to
    pub partner_id: Uuid,

    /// Configured provider id
    pub provider_id: String,

    /// The provider's stable identifier for the user
    pub subject: String,

    /// Email reported by the provider at connect time
    pub email: String,

    /// When the connection was created
    pub created_at: DateTime<Utc>,
}

impl IdentityConnection {
    /// Create a new connection stamped with the current time.
    pub fn new(
        user_id: Uuid,
        partner_id: Uuid,
        provider_id: impl Into<String>,
        subject: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            partner_id,
            provider_id: provider_id.into(),
            subject: subject.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}

/// Persistence contract for identity connections.
///
/// Backends must reject an insert that collides on
/// (partner_id, provider_id, subject) or on (user_id, provider_id); the
/// bridge relies on that rejection for its conflict semantics.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Insert a new connection. Fails with [`StoreError::Conflict`] on
    /// either uniqueness violation.
    async fn insert(&self, connection: IdentityConnection) -> StoreResult<()>;

    /// Resolve a (partner, provider, subject) triple to a user id.
    async fn find_by_provider_subject(
        &self,
        partner_id: Uuid,
        provider_id: &str,
        subject: &str,
    ) -> StoreResult<Option<Uuid>>;

    /// All connections for a user, oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<IdentityConnection>>;

    /// Remove a user's connection for a provider, returning how many rows
    /// matched.
    async fn delete(&self, user_id: Uuid, provider_id: &str) -> StoreResult<u64>;
}

/// In-memory connection store.
///
/// Suitable for tests and local tooling. Both uniqueness constraints are
/// checked under one write lock, so a concurrent connect race has exactly
/// one winner, the same guarantee a relational unique index gives.
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    connections: Arc<RwLock<Vec<IdentityConnection>>>,
}

impl MemoryConnectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn insert(&self, connection: IdentityConnection) -> StoreResult<()> {
        let mut connections = self.connections.write().await;

        if connections.iter().any(|c| {
            c.partner_id == connection.partner_id
                && c.provider_id == connection.provider_id
                && c.subject == connection.subject
        }) {
            return Err(StoreError::Conflict(
                "subject already linked for this provider".to_string(),
            ));
        }

        if connections
            .iter()
            .any(|c| c.user_id == connection.user_id && c.provider_id == connection.provider_id)
        {
            return Err(StoreError::Conflict(
                "user already has a connection for this provider".to_string(),
            ));
        }

        connections.push(connection);
        Ok(())
    }

    async fn find_by_provider_subject(
        &self,
        partner_id: Uuid,
        provider_id: &str,
        subject: &str,
    ) -> StoreResult<Option<Uuid>> {
        let connections = self.connections.read().await;
        Ok(connections
            .iter()
            .find(|c| {
                c.partner_id == partner_id
                    && c.provider_id == provider_id
                    && c.subject == subject
            })
            .map(|c| c.user_id))
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<IdentityConnection>> {
        let connections = self.connections.read().await;
        let mut result: Vec<IdentityConnection> = connections
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|c| c.created_at);
        Ok(result)
    }

    async fn delete(&self, user_id: Uuid, provider_id: &str) -> StoreResult<u64> {
        let mut connections = self.connections.write().await;
        let before = connections.len();
        connections.retain(|c| !(c.user_id == user_id && c.provider_id == provider_id));
        Ok((before - connections.len()) as u64)
    }
}
