/// Middleware modules for the web server
///
/// - `security`: security response headers
/// - `share`: resolves the session and shares `auth`, `flash` and `errors`
///   with every page
/// - `auth`: keeps guests out of the protected routes

pub mod auth;
pub mod security;
pub mod share;
