/// User endpoints
///
/// Each handler performs a single store call and returns the projected
/// record(s).
///
/// # Endpoints
///
/// - `GET /users` - List users
/// - `GET /users/email/:email` - Get user by email
/// - `GET /users/:id` - Get user by id
/// - `POST /users` - Create user
/// - `PUT /users/subscription/:email` - Update subscription status
///
/// Path emails are matched exactly as sent; no trimming or case folding.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use userhub_shared::models::{
    timestamp,
    user::{CreateUser, SubscriptionProfile, SubscriptionUpdate, UserProfile},
};
use validator::Validate;

/// Create user request
///
/// `isAdmin` is not accepted here; unknown fields, including it, are
/// ignored. `createdAt`/`updatedAt` are managed by the store.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Optional caller-chosen identifier
    #[validate(length(min = 1, message = "Id must not be empty"))]
    pub id: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Email address (required)
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    pub is_subscribed: bool,

    pub subscription_id: Option<String>,

    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub subscription_end_date: Option<DateTime<Utc>>,

    pub oauth_provider: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            id: req.id,
            name: req.name,
            email: req.email.trim().to_string(),
            is_admin: false,
            is_subscribed: req.is_subscribed,
            subscription_id: req.subscription_id,
            subscription_end_date: req.subscription_end_date,
            oauth_provider: req.oauth_provider,
        }
    }
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Collapses validator output into a single 400
fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid field: {}", field))
            })
        })
        .collect();
    messages.sort();

    ApiError::BadRequest(messages.join("; "))
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /users
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "7b0f...",
///     "name": "Ada",
///     "email": "ada@example.com",
///     "isAdmin": false,
///     "isSubscribed": true,
///     "oauthProvider": "google",
///     "createdAt": "2025-01-03T12:00:00Z",
///     "updatedAt": "2025-01-03T12:00:00Z"
///   }
/// ]
/// ```
///
/// # Errors
///
/// - `500 Internal Server Error`: Store failure
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = state.store.list().await?;
    tracing::debug!(count = users.len(), "Listed users");

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// Get user by email
///
/// Registered as a static `/users/email/` prefix so it always wins over
/// `/users/:id`.
///
/// # Errors
///
/// - `404 Not Found`: No user with this email
/// - `500 Internal Server Error`: Store failure
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user.into()))
}

/// Get user by id
///
/// # Errors
///
/// - `404 Not Found`: No user with this id
/// - `500 Internal Server Error`: Store failure
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    find_user_by_id(&state, &id).await
}

/// `GET /users/subscription`
///
/// The static subscription routes shadow `/users/:id` for every method, so
/// the id lookup is repeated here for a user whose id is `subscription`.
pub async fn get_subscription_user(
    State(state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    find_user_by_id(&state, "subscription").await
}

async fn find_user_by_id(state: &AppState, id: &str) -> ApiResult<Json<UserProfile>> {
    tracing::debug!(user_id = %id, "Looking up user by id");

    let Some(user) = state.store.find_by_id(id).await? else {
        tracing::debug!(user_id = %id, "User not found");
        return Err(user_not_found());
    };

    Ok(Json(user.into()))
}

/// Create user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "name": "A", "email": "a@x.com" }
/// ```
///
/// # Response
///
/// `201 Created` with the projected user.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or missing email
/// - `500 Internal Server Error`: Store failure, including a taken email
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(req) = payload?;
    req.validate().map_err(validation_error)?;

    let input = CreateUser::from(req);
    if input.email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let user = state.store.create(input).await?;
    tracing::info!(user_id = %user.id, "Created user");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Update subscription status
///
/// Only fields present in the body are written. A request without a JSON
/// body is an empty update (only `updatedAt` moves).
///
/// # Endpoint
///
/// ```text
/// PUT /users/subscription/:email
/// Content-Type: application/json
///
/// {
///   "isSubscribed": true,
///   "subscriptionId": "sub_123",
///   "subscriptionEndDate": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or malformed body
/// - `404 Not Found`: No user with this email
/// - `500 Internal Server Error`: Store failure
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(email): Path<String>,
    payload: Result<Json<SubscriptionUpdate>, JsonRejection>,
) -> ApiResult<Json<SubscriptionProfile>> {
    if email.trim().is_empty() {
        return Err(email_required());
    }

    let update = match payload {
        Ok(Json(update)) => update,
        Err(JsonRejection::MissingJsonContentType(_)) => SubscriptionUpdate::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    if state.store.find_by_email(&email).await?.is_none() {
        return Err(user_not_found());
    }

    let user = state
        .store
        .update_subscription(&email, update)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(
        user_id = %user.id,
        is_subscribed = user.is_subscribed,
        "Updated subscription"
    );

    Ok(Json(user.into()))
}

/// `PUT /users/subscription` with no email segment
pub async fn update_subscription_missing_email() -> ApiResult<Json<SubscriptionProfile>> {
    Err(email_required())
}

fn email_required() -> ApiError {
    ApiError::BadRequest("Email is required".to_string())
}
