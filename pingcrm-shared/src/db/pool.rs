/// SQLite connection pool
///
/// Every connection enforces foreign keys (contacts reference organizations)
/// and waits on a locked database instead of failing right away. File
/// databases are created on first use and run in WAL mode so readers do not
/// block the single writer.
///
/// # Example
///
/// ```no_run
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: "sqlite://database.sqlite".to_string(),
///         ..Default::default()
///     })
///     .await?;
///
///     let answer: i64 = sqlx::query_scalar("SELECT 42").fetch_one(&pool).await?;
///     assert_eq!(answer, 42);
///     Ok(())
/// }
/// ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite://path/to/file.sqlite` or `sqlite::memory:`
    pub url: String,

    /// Must be 1 for an in-memory database, each connection opens its own otherwise
    pub max_connections: u32,

    /// How long to wait for a free connection
    pub acquire_timeout: Duration,

    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// A private in-memory database living as long as the pool
    pub fn in_memory() -> Self {
        Self {
            url: MEMORY_URL.to_string(),
            max_connections: 1,
            ..Default::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Opens the pool and checks the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the file cannot be opened or
/// created, or the first query fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = config.is_in_memory();

    info!(
        url = %config.url,
        max_connections = config.max_connections,
        in_memory,
        "Opening database"
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

    if !in_memory {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);

    // Dropping the last connection would drop the database with it
    if in_memory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(connect_options).await?;
    health_check(&pool).await?;

    debug!(connections = pool.size(), "Database ready");
    Ok(pool)
}

/// Round trip to the database, used by `/health`
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Closes every connection, releasing the database file
pub async fn close_pool(pool: SqlitePool) {
    pool.close().await;
    info!("Database closed");
}
