/// Configuration management for the web server
///
/// Configuration is read from environment variables; a `.env` file is loaded
/// first when present (development).
///
/// # Environment Variables
///
/// - `APP_HOST`: Host to bind to (default: 0.0.0.0)
/// - `APP_PORT`: Port to bind to (default: 3000)
/// - `APP_PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `DATABASE_URL`: SQLite url (default: sqlite://database.sqlite)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Session signing secret, at least 32 characters (required)
/// - `SESSION_TTL_DAYS`: Session lifetime in days, at most 3650 (default: 7)
/// - `INERTIA_VERSION`: Asset version sent to the client (default: crate version)
/// - `INERTIA_ENTRY`: Client entry script (default: /build/app.js)
/// - `ACCOUNT_NAME`: Account name shared with every page (default: Acme Corporation)
/// - `SEED_DEMO_DATA`: Seed demo data into an empty database (default: true)
///
/// # Example
///
/// ```no_run
/// use pingcrm_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Minimum length of the session secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted session lifetime, ten years
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub inertia: InertiaConfig,

    /// Name of the single account every user belongs to
    pub account_name: String,

    /// Whether to seed demo data into an empty database at startup
    pub seed_demo_data: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Production mode: HSTS header and `Secure` cookies
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for signing session tokens
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Session lifetime in days
    pub ttl_days: i64,
}

/// Inertia bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertiaConfig {
    /// Asset version; clients with another version get a full reload
    pub version: String,

    /// URL of the client entry script loaded by the HTML shell
    pub entry: String,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "True" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "FALSE" | "False" | "no" | "off" | "") => Ok(false),
        Some(other) => anyhow::bail!("{key} must be true or false, got {other:?}"),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing or too short, or if a
    /// variable has an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    ///
    /// `from_env` uses the process environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "APP_PORT", 3000u16)?;
        let production = parse_flag(&lookup, "APP_PRODUCTION", false)?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://database.sqlite".to_string());
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("SESSION_SECRET must be at least {MIN_SECRET_LENGTH} characters long");
        }

        let ttl_days = parse_or(&lookup, "SESSION_TTL_DAYS", 7i64)?;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&ttl_days) {
            anyhow::bail!("SESSION_TTL_DAYS must be between 1 and {MAX_SESSION_TTL_DAYS}");
        }

        let version = lookup("INERTIA_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
        let entry = lookup("INERTIA_ENTRY").unwrap_or_else(|| "/build/app.js".to_string());

        let account_name = lookup("ACCOUNT_NAME").unwrap_or_else(|| "Acme Corporation".to_string());
        let seed_demo_data = parse_flag(&lookup, "SEED_DEMO_DATA", true)?;

        Ok(Self {
            app: AppConfig {
                host,
                port,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_days },
            inertia: InertiaConfig { version, entry },
            account_name,
            seed_demo_data,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
