/// Database layer for PingCRM
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `migrations`: embedded migration runner
/// - `seed`: demo data for a fresh database
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
/// use pingcrm_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod seed;
