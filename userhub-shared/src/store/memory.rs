/// In-memory implementation of [`UserStore`]
///
/// Enforces the same uniqueness rules as the `users` table (id and email)
/// and manages `created_at`/`updated_at` the same way. State lives for the
/// lifetime of the process.

use super::{StoreError, StoreResult, UserStore};
use crate::models::user::{CreateUser, SubscriptionUpdate, User};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    // Insertion order doubles as creation order
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store holds no users
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let id = data.id_or_generate();

        if users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation {
                field: "email".to_string(),
            });
        }
        if users.iter().any(|u| u.id == id) {
            return Err(StoreError::UniqueViolation {
                field: "id".to_string(),
            });
        }

        let now = Utc::now();
        let user = User {
            id,
            name: data.name,
            email: data.email,
            is_admin: data.is_admin,
            is_subscribed: data.is_subscribed,
            subscription_id: data.subscription_id,
            subscription_end_date: data.subscription_end_date,
            oauth_provider: data.oauth_provider,
            created_at: now,
            updated_at: now,
        };

        debug!(user_id = %user.id, "Inserted user into memory store");
        users.push(user.clone());
        Ok(user)
    }

    async fn update_subscription(
        &self,
        email: &str,
        data: SubscriptionUpdate,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(user) = users.iter_mut().find(|u| u.email == email) else {
            return Ok(None);
        };

        data.apply_to(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
