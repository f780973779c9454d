//! PostgreSQL implementation of [`UserStore`]
//!
//! # Example
//!
//! ```no_run
//! use userhub_shared::db::pool::{create_pool, DatabaseConfig};
//! use userhub_shared::store::{postgres::PgUserStore, UserStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig {
//!     url: std::env::var("DATABASE_URL")?,
//!     ..Default::default()
//! })
//! .await?;
//!
//! let store = PgUserStore::new(pool);
//! if let Some(user) = store.find_by_email("user@example.com").await? {
//!     println!("Found user: {}", user.id);
//! }
//! # Ok(())
//! # }
//! ```

use super::{StoreError, StoreResult, UserStore};
use crate::models::user::{CreateUser, SubscriptionUpdate, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

const USER_COLUMNS: &str = "id, name, email, is_admin, is_subscribed, subscription_id, \
     subscription_end_date, oauth_provider, created_at, updated_at";

/// User store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique violations to `StoreError::UniqueViolation`
///
/// The field name is recovered from the constraint name
/// (`users_email_key`, `users_pkey`).
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(constraint) if constraint.contains("email") => "email",
                Some(constraint) if constraint.contains("pkey") => "id",
                Some(constraint) => constraint,
                None => "unknown",
            };
            return StoreError::UniqueViolation {
                field: field.to_string(),
            };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let id = data.id_or_generate();
        debug!(user_id = %id, "Inserting user");

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, is_admin, is_subscribed,
                               subscription_id, subscription_end_date, oauth_provider)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.is_admin)
        .bind(data.is_subscribed)
        .bind(data.subscription_id)
        .bind(data.subscription_end_date)
        .bind(data.oauth_provider)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn update_subscription(
        &self,
        email: &str,
        data: SubscriptionUpdate,
    ) -> StoreResult<Option<User>> {
        // Only present fields make it into the SET list
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE users SET updated_at = NOW()");

        if let Some(is_subscribed) = data.is_subscribed {
            query.push(", is_subscribed = ").push_bind(is_subscribed);
        }
        if let Some(subscription_id) = data.subscription_id {
            query.push(", subscription_id = ").push_bind(subscription_id);
        }
        if let Some(end_date) = data.subscription_end_date {
            query.push(", subscription_end_date = ").push_bind(end_date);
        }

        query
            .push(" WHERE email = ")
            .push_bind(email)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        let user = query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(user)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
