//! # UserHub API Server
//!
//! HTTP service for reading and writing user records and their
//! subscription status.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/userhub cargo run -p userhub-api
//! DATABASE_URL=memory:// cargo run -p userhub-api
//! ```

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userhub_api::{
    app::{build_router, AppState},
    config::Config,
};
use userhub_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{memory::InMemoryUserStore, postgres::PgUserStore, UserStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "userhub_api=debug,userhub_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        shared_version = userhub_shared::VERSION,
        "UserHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let (store, pool): (Arc<dyn UserStore>, Option<sqlx::PgPool>) =
        if config.database.uses_memory_store() {
            tracing::warn!("Using in-memory user store; data is lost on exit");
            (Arc::new(InMemoryUserStore::new()), None)
        } else {
            let pool = create_pool(DatabaseConfig {
                url: config.database.url.clone(),
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await?;

            if config.database.run_migrations {
                run_migrations(&pool).await?;
            }

            (Arc::new(PgUserStore::new(pool.clone())), Some(pool))
        };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");
    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
