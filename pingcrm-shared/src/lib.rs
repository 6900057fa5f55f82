//! # PingCRM Shared Library
//!
//! Data layer and domain logic used by the PingCRM web server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, migrations and demo seed
//! - `models`: users, organizations and contacts with their SQL
//! - `query`: list filters and pagination
//! - `resources`: client-facing shapes of the stored rows
//! - `auth`: password hashing and session tokens

pub mod auth;
pub mod db;
pub mod models;
pub mod query;
pub mod resources;

/// Current version of the PingCRM shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
