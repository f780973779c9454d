//! Persistence client for user records
//!
//! `UserStore` is the seam between HTTP handlers and storage. Each method
//! maps to exactly one query against the `users` table.
//!
//! # Implementations
//!
//! - [`postgres::PgUserStore`]: PostgreSQL via sqlx
//! - [`memory::InMemoryUserStore`]: process-local map, used in tests and
//!   for `DATABASE_URL=memory://`
//!
//! # Example
//!
//! ```
//! use userhub_shared::models::user::CreateUser;
//! use userhub_shared::store::{memory::InMemoryUserStore, UserStore};
//!
//! # async fn example() -> Result<(), userhub_shared::store::StoreError> {
//! let store = InMemoryUserStore::new();
//! let user = store.create(CreateUser::new("a@x.com")).await?;
//! assert_eq!(store.find_by_id(&user.id).await?, Some(user));
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgres;

use crate::models::user::{CreateUser, SubscriptionUpdate, User};
use async_trait::async_trait;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique column (email or id) already holds the value
    #[error("Unique constraint failed on the field: `{field}`")]
    UniqueViolation { field: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Typed access to the `users` relation
///
/// Lookups return `Ok(None)` when no row matches; callers decide whether
/// that is an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns every user, oldest first
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Finds a user by identifier
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Finds a user by email (exact match)
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts a new user and returns the stored row
    ///
    /// # Errors
    ///
    /// `StoreError::UniqueViolation` when the email or id is taken.
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    /// Applies a partial subscription update to the user with `email`
    ///
    /// Fields absent from `data` are left untouched; `updated_at` is always
    /// refreshed. Returns `None` when no user has that email.
    async fn update_subscription(
        &self,
        email: &str,
        data: SubscriptionUpdate,
    ) -> StoreResult<Option<User>>;

    /// Verifies the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;
}
