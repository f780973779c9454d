//! # UserHub Shared Library
//!
//! Data model and persistence layer used by the UserHub API server.
//!
//! ## Module Organization
//!
//! - `models`: the `User` record and its projections
//! - `store`: the `UserStore` persistence client (PostgreSQL and in-memory)
//! - `db`: connection pool and migration helpers

pub mod db;
pub mod models;
pub mod store;

/// Current version of the UserHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
