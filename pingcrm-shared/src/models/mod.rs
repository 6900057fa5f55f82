/// Database models for PingCRM
///
/// Each model owns its table's SQL. Row types are plain `sqlx::FromRow`
/// structs; operations are associated async functions taking the pool.
///
/// # Models
///
/// - `user`: accounts that can sign in
/// - `organization`: companies contacts may belong to
/// - `contact`: people, optionally attached to one organization
///
/// All three tables are soft-deleted: `soft_delete` stamps `deleted_at` and
/// `restore` clears it, so no row is ever erased by the application.
///
/// # Example
///
/// ```no_run
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
/// use pingcrm_shared::models::organization::{Organization, OrganizationInput};
/// use pingcrm_shared::query::ListFilters;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let id = Organization::create(&pool, &OrganizationInput {
///     name: "Acme Corporation".to_string(),
///     ..Default::default()
/// }).await?;
///
/// let (rows, total) = Organization::paginate(&pool, &ListFilters::default(), 1, 10).await?;
/// # Ok(())
/// # }
/// ```

pub mod contact;
pub mod organization;
pub mod user;

use sqlx::{sqlite::SqliteRow, FromRow, SqlitePool};
use tracing::debug;

use crate::query::{pagination, SqlFragment};

/// Marks a row as deleted, keeping the first deletion time
///
/// Returns whether the row exists.
pub(crate) async fn soft_delete(pool: &SqlitePool, table: &'static str, id: i64) -> Result<bool, sqlx::Error> {
    let sql = format!("UPDATE {table} SET deleted_at = COALESCE(deleted_at, CURRENT_TIMESTAMP) WHERE id = ?");

    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Clears the deletion mark of a row
///
/// Returns whether the row exists.
pub(crate) async fn restore(pool: &SqlitePool, table: &'static str, id: i64) -> Result<bool, sqlx::Error> {
    let sql = format!("UPDATE {table} SET deleted_at = NULL WHERE id = ?");

    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Counts the rows of `from` matching `clause`
pub(crate) async fn count_matching(
    pool: &SqlitePool,
    from: &str,
    clause: &SqlFragment,
) -> Result<u64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {from}{}", clause.where_sql());

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for param in clause.params() {
        query = query.bind(param.clone());
    }

    let total = query.fetch_one(pool).await?;

    Ok(u64::try_from(total).unwrap_or_default())
}

/// Fetches one page of `select` filtered by `clause`
///
/// `select` is everything up to (and excluding) the WHERE clause.
pub(crate) async fn fetch_page<T>(
    pool: &SqlitePool,
    select: &str,
    clause: &SqlFragment,
    order_by: &str,
    page: u64,
    per_page: u64,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("{select}{} ORDER BY {order_by} LIMIT ? OFFSET ?", clause.where_sql());

    debug!(sql = %sql, params = clause.params().len(), "Fetching page");

    let limit = i64::try_from(per_page).unwrap_or(i64::MAX);
    let offset = i64::try_from(pagination::offset(page, per_page)).unwrap_or(i64::MAX);

    let mut query = sqlx::query_as::<_, T>(&sql);
    for param in clause.params() {
        query = query.bind(param.clone());
    }

    query.bind(limit).bind(offset).fetch_all(pool).await
}

/// Maps empty strings to `None`
///
/// Optional text columns are stored as NULL rather than `""`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
