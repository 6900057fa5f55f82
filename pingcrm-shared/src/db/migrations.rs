/// Schema migrations
///
/// The SQL files under `migrations/` at the workspace root are embedded at
/// compile time, so the binary can bring any database file up to date on
/// startup.
///
/// # Example
///
/// ```no_run
/// use pingcrm_shared::db::migrations::{ensure_database_exists, run_migrations};
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = "sqlite://database.sqlite";
///     ensure_database_exists(url).await?;
///
///     let pool = create_pool(DatabaseConfig { url: url.to_string(), ..Default::default() }).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    sqlite::SqlitePool,
    Sqlite,
};
use tracing::{error, info};

pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Fails when a migration does not apply or an applied one no longer matches
/// its embedded checksum.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!(migrations = MIGRATOR.migrations.len(), "Database schema up to date");
    Ok(())
}

/// Creates the database file when it is missing
///
/// In-memory URLs are left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if database_url.contains(":memory:") || Sqlite::database_exists(database_url).await? {
        return Ok(());
    }

    info!(url = database_url, "Creating database file");
    Sqlite::create_database(database_url).await
}
