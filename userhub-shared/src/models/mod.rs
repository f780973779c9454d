//! Data models for UserHub
//!
//! # Models
//!
//! - `user`: the `User` record, its public projections and update inputs
//! - `timestamp`: lenient timestamp parsing for request payloads
//!
//! # Example
//!
//! ```
//! use userhub_shared::models::user::SubscriptionUpdate;
//!
//! let update: SubscriptionUpdate =
//!     serde_json::from_str(r#"{ "isSubscribed": true }"#).unwrap();
//! assert_eq!(update.is_subscribed, Some(true));
//! assert!(update.subscription_id.is_none());
//! ```

pub mod timestamp;
pub mod user;
