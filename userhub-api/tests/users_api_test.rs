/// Integration tests for the user endpoints
///
/// Drive the full router (routing, extraction, error mapping) against an
/// in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{json_request, TestContext};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;
use userhub_shared::store::UserStore;

const PROFILE_KEYS: [&str; 8] = [
    "id",
    "name",
    "email",
    "isAdmin",
    "isSubscribed",
    "oauthProvider",
    "createdAt",
    "updatedAt",
];

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_create_user_returns_projected_record() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json("/users", json!({ "name": "A", "email": "a@x.com" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["name"], "A");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["isSubscribed"], false);
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());

    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), PROFILE_KEYS.len());
    for key in PROFILE_KEYS {
        assert!(keys.contains(&key), "missing key {key}");
    }
}

#[tokio::test]
async fn test_create_ignores_admin_flag() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/users",
            json!({ "name": "Mallory", "email": "m@x.com", "isAdmin": true }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isAdmin"], false);
}

#[tokio::test]
async fn test_lookups_agree_with_created_user() {
    let ctx = TestContext::new();
    let created = ctx.create_user("Ada", "ada@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, by_id) = ctx.get(&format!("/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, created);

    let (status, by_email) = ctx.get("/users/email/ada@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_email, created);
}

#[tokio::test]
async fn test_email_route_takes_precedence_over_id() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    // A user whose id is literally "email" must not shadow the email lookup
    let (status, _) = ctx
        .post_json("/users", json!({ "id": "email", "email": "other@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.get("/users/email/ada@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_unknown_id_and_email_are_404() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, body) = ctx.get("/users/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let (status, body) = ctx.get("/users/email/nobody@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_list_users() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    ctx.create_user("A", "a@x.com").await;
    ctx.create_user("B", "b@x.com").await;

    let (status, body) = ctx.get("/users").await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "a@x.com");
    assert_eq!(users[1]["email"], "b@x.com");
    assert!(users[0].get("subscriptionId").is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_500() {
    let ctx = TestContext::new();
    ctx.create_user("A", "a@x.com").await;

    let (status, body) = ctx
        .post_json("/users", json!({ "name": "A2", "email": "a@x.com" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("email"));
    assert_eq!(ctx.store.len().await, 1);
}

#[tokio::test]
async fn test_create_without_email_is_400() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post_json("/users", json!({ "name": "A" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is required");

    let (status, _) = ctx.post_json("/users", json!({ "email": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_create_with_malformed_json_is_400() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = ctx.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_subscription_update_returns_subscription_fields() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({
                "isSubscribed": true,
                "subscriptionId": "sub_123",
                "subscriptionEndDate": "2026-01-01T00:00:00Z"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSubscribed"], true);
    assert_eq!(body["subscriptionId"], "sub_123");
    assert_eq!(body["subscriptionEndDate"], "2026-01-01T00:00:00Z");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_partial_update_keeps_subscription_id() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, _) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "isSubscribed": true, "subscriptionId": "sub_123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "isSubscribed": false }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSubscribed"], false);
    assert_eq!(body["subscriptionId"], "sub_123");
    assert!(body["subscriptionEndDate"].is_null());
}

#[tokio::test]
async fn test_update_converts_end_date_formats() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "subscriptionEndDate": "2026-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptionEndDate"], "2026-01-01T00:00:00Z");

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "subscriptionEndDate": 1_767_312_000_000_i64 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptionEndDate"], "2026-01-02T00:00:00Z");

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "subscriptionEndDate": "whenever" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_update_null_clears_subscription() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;
    ctx.put_json(
        "/users/subscription/ada@example.com",
        json!({ "subscriptionId": "sub_1", "subscriptionEndDate": "2026-01-01" }),
    )
    .await;

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "subscriptionId": null, "subscriptionEndDate": null }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["subscriptionId"].is_null());
    assert!(body["subscriptionEndDate"].is_null());
}

#[tokio::test]
async fn test_update_unknown_email_is_404() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .put_json(
            "/users/subscription/nobody@example.com",
            json!({ "isSubscribed": true }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_update_missing_email_is_400() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    for uri in [
        "/users/subscription",
        "/users/subscription/",
        "/users/subscription/%20",
    ] {
        let (status, body) = ctx.put_json(uri, json!({ "isSubscribed": true })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(body["error"], "Email is required");
    }

    let user = ctx
        .store
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.is_subscribed);
}

#[tokio::test]
async fn test_update_without_body_touches_only_updated_at() {
    let ctx = TestContext::new();
    let created = ctx.create_user("Ada", "ada@example.com").await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let request = Request::builder()
        .method("PUT")
        .uri("/users/subscription/ada@example.com")
        .body(Body::empty())
        .unwrap();

    let (status, body) = ctx.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSubscribed"], created["isSubscribed"]);
    assert_eq!(body["createdAt"], created["createdAt"]);
    assert!(body["subscriptionId"].is_null());
    assert!(timestamp(&body["updatedAt"]) > timestamp(&created["updatedAt"]));
}

#[tokio::test]
async fn test_update_with_empty_object_refreshes_updated_at() {
    let ctx = TestContext::new();
    let created = ctx.create_user("Ada", "ada@example.com").await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, body) = ctx
        .put_json("/users/subscription/ada@example.com", json!({}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSubscribed"], created["isSubscribed"]);
    assert_eq!(body["createdAt"], created["createdAt"]);
    assert_ne!(body["updatedAt"], created["updatedAt"]);
    assert!(timestamp(&body["updatedAt"]) > timestamp(&created["updatedAt"]));
}

#[tokio::test]
async fn test_get_user_with_id_subscription() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/users/subscription").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let (status, created) = ctx
        .post_json("/users", json!({ "id": "subscription", "email": "s@x.com" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.get("/users/subscription").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    // The PUT on the same path still reports the missing email
    let (status, body) = ctx
        .put_json("/users/subscription", json!({ "isSubscribed": true }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is required");
}

#[tokio::test]
async fn test_path_email_is_matched_exactly() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, _) = ctx.get("/users/email/%20ada@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .put_json(
            "/users/subscription/%20ada@example.com",
            json!({ "isSubscribed": true }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user = ctx
        .store
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.is_subscribed);
}

#[tokio::test]
async fn test_update_accepts_fractional_millis() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let (status, body) = ctx
        .put_json(
            "/users/subscription/ada@example.com",
            json!({ "subscriptionEndDate": 1_767_225_600_000.0_f64 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptionEndDate"], "2026-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_update_with_bad_json_is_400() {
    let ctx = TestContext::new();
    ctx.create_user("Ada", "ada@example.com").await;

    let request = json_request(
        "PUT",
        "/users/subscription/ada@example.com",
        json!({ "isSubscribed": "yes" }),
    );

    let (status, _) = ctx.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
