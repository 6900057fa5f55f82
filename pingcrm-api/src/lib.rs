//! # PingCRM Server Library
//!
//! The web layer of PingCRM: configuration, the Inertia bridge, cookie
//! sessions and the page handlers. Storage, models and the query layer live in
//! `pingcrm-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `inertia`: Page rendering over the Inertia protocol
//! - `middleware`: Security headers, shared props, authentication guard
//! - `routes`: Route handlers
//! - `session`: Session and flash cookies

pub mod app;
pub mod config;
pub mod error;
pub mod inertia;
pub mod middleware;
pub mod routes;
pub mod session;
