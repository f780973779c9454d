//! User model and projections
//!
//! This module provides the `User` record as stored in the database, the
//! projections returned to HTTP callers, and the inputs accepted by the
//! persistence layer.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id TEXT PRIMARY KEY,
//!     name TEXT,
//!     email TEXT NOT NULL UNIQUE,
//!     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
//!     is_subscribed BOOLEAN NOT NULL DEFAULT FALSE,
//!     subscription_id TEXT,
//!     subscription_end_date TIMESTAMPTZ,
//!     oauth_provider TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use userhub_shared::models::user::{CreateUser, UserProfile};
//! use userhub_shared::store::{postgres::PgUserStore, UserStore};
//! use userhub_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! let store = PgUserStore::new(pool);
//!
//! let user = store
//!     .create(CreateUser::new("user@example.com").with_name("Jane Doe"))
//!     .await?;
//! let profile = UserProfile::from(user);
//! println!("Created user: {}", profile.id);
//! # Ok(())
//! # }
//! ```

use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// User record as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, immutable identifier
    pub id: String,

    /// Optional display name
    pub name: Option<String>,

    /// Email address, unique across all users
    pub email: String,

    /// Whether the user has administrative rights
    pub is_admin: bool,

    /// Whether the user currently holds a subscription
    pub is_subscribed: bool,

    /// Payment-provider subscription reference
    pub subscription_id: Option<String>,

    /// When the current subscription period ends
    pub subscription_end_date: Option<DateTime<Utc>>,

    /// OAuth provider the account was created through (e.g. "google")
    pub oauth_provider: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user
///
/// This is what list, lookup and create return. Subscription references
/// are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub is_admin: bool,
    pub is_subscribed: bool,
    pub oauth_provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            is_subscribed: user.is_subscribed,
            oauth_provider: user.oauth_provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Projection returned after a subscription update
///
/// Same as [`UserProfile`] plus the subscription fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub subscription_id: Option<String>,
    pub subscription_end_date: Option<DateTime<Utc>>,
}

impl From<User> for SubscriptionProfile {
    fn from(user: User) -> Self {
        let subscription_id = user.subscription_id.clone();
        let subscription_end_date = user.subscription_end_date;

        Self {
            profile: UserProfile::from(user),
            subscription_id,
            subscription_end_date,
        }
    }
}

/// Input for creating a new user
///
/// Only `email` is required. When `id` is `None` the store generates a
/// UUID v4 string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub is_admin: bool,
    pub is_subscribed: bool,
    pub subscription_id: Option<String>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub oauth_provider: Option<String>,
}

impl CreateUser {
    /// Creates an input with only the email set
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the caller-supplied id or a freshly generated one
    pub fn id_or_generate(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

/// Partial update of a user's subscription state
///
/// Outer `None` means "leave untouched". For the nullable columns,
/// `Some(None)` clears the value.
///
/// Deserializes from the camelCase request body:
///
/// ```json
/// { "isSubscribed": true, "subscriptionId": "sub_123", "subscriptionEndDate": "2026-01-01" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    #[serde(default)]
    pub is_subscribed: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_patch")]
    pub subscription_id: Option<Option<String>>,

    #[serde(default, deserialize_with = "timestamp::deserialize_patch")]
    pub subscription_end_date: Option<Option<DateTime<Utc>>>,
}

impl SubscriptionUpdate {
    /// Returns true when no field would be changed
    pub fn is_empty(&self) -> bool {
        self.is_subscribed.is_none()
            && self.subscription_id.is_none()
            && self.subscription_end_date.is_none()
    }

    /// Applies the present fields to `user` and bumps `updated_at`
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(is_subscribed) = self.is_subscribed {
            user.is_subscribed = is_subscribed;
        }
        if let Some(ref subscription_id) = self.subscription_id {
            user.subscription_id = subscription_id.clone();
        }
        if let Some(end_date) = self.subscription_end_date {
            user.subscription_end_date = end_date;
        }
        user.updated_at = now;
    }
}

/// Distinguishes an explicit `null` from an absent field
///
/// Used with `#[serde(default)]`: absent stays `None`, `null` becomes
/// `Some(None)`.
fn deserialize_patch<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
