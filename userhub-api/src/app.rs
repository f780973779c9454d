/// Application state and router builder
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use userhub_api::{app::{build_router, AppState}, config::Config};
/// use userhub_shared::store::memory::InMemoryUserStore;
///
/// let state = AppState::new(Arc::new(InMemoryUserStore::new()), Config::in_memory());
/// let app = build_router(state);
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use userhub_shared::store::UserStore;

/// Shared application state
///
/// Cloned for each request by Axum's `State` extractor. The store handle
/// is created once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Persistence client
    pub store: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn UserStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// └── /users
///     ├── GET  /                      # List users
///     ├── POST /                      # Create user
///     ├── GET  /email/:email          # Get by email
///     ├── GET  /:id                   # Get by id
///     ├── GET  /subscription          # Get by id "subscription"
///     └── PUT  /subscription/:email   # Update subscription
/// ```
///
/// Static segments (`email`, `subscription`) take priority over `/:id`.
/// `GET /subscription` is routed back to the id lookup.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route("/email/:email", get(routes::users::get_user_by_email))
        .route(
            "/subscription",
            get(routes::users::get_subscription_user)
                .put(routes::users::update_subscription_missing_email),
        )
        .route(
            "/subscription/",
            get(routes::users::get_subscription_user)
                .put(routes::users::update_subscription_missing_email),
        )
        .route(
            "/subscription/:email",
            put(routes::users::update_subscription),
        )
        .route("/:id", get(routes::users::get_user_by_id));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/users", user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
