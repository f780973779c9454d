//! Database layer for UserHub
//!
//! - `pool`: PostgreSQL connection pool with a health check
//! - `migrations`: applies the `users` table schema
//!
//! # Example
//!
//! ```no_run
//! use userhub_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
