/// User model and database operations
///
/// Users are the accounts that can sign in. The first seeded user is the
/// account owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     first_name TEXT NOT NULL,
///     last_name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     password TEXT NOT NULL,
///     owner INTEGER NOT NULL DEFAULT 0,
///     photo TEXT,
///     deleted_at TEXT,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use pingcrm_shared::models::user::{User, CreateUser};
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let id = User::create(&pool, &CreateUser {
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     email: "johndoe@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     owner: true,
///     photo: None,
/// }).await?;
///
/// let found = User::find_active_by_email(&pool, "johndoe@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::info;

use crate::query::ListFilters;

/// Columns searched by the users list
pub const SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "email"];

const COLUMNS: &str =
    "id, first_name, last_name, email, password, owner, photo, deleted_at, created_at, updated_at";

/// A user row
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response. Use `resources::UserResource` for output.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Unique across all users, deleted ones included
    pub email: String,

    /// Argon2id PHC hash
    pub password: String,

    /// Non-zero for the account owner
    pub owner: i64,

    /// Stored photo reference
    pub photo: Option<String>,

    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Argon2id PHC hash (NOT the plaintext password)
    pub password_hash: String,

    pub owner: bool,
    pub photo: Option<String>,
}

/// Input for updating a user
///
/// Every field is written. The stored hash is only replaced when
/// `password_hash` is `Some`.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub owner: bool,
    pub photo: Option<String>,
}

impl User {
    /// Inserts a user and returns its id
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already used (unique constraint) or
    /// the database is unreachable.
    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email, password, owner, photo)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(i64::from(data.owner))
        .bind(&data.photo)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(user_id = id, "User created");

        Ok(id)
    }

    /// Finds a user by id, deleted or not
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a non-deleted user by id
    ///
    /// Used to resolve the session's user on every request.
    pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a non-deleted user by email
    ///
    /// Soft-deleted users cannot sign in.
    pub async fn find_active_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL");

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether any user other than `except_id` already has `email`
    ///
    /// Soft-deleted users still hold their address, matching the storage-level
    /// unique constraint.
    pub async fn email_taken(
        pool: &SqlitePool,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = ? AND id IS NOT ?)",
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(pool)
        .await
    }

    /// Total number of users, deleted ones included
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Updates a user, refreshing `updated_at`
    ///
    /// Returns whether the user exists.
    pub async fn update(pool: &SqlitePool, id: i64, data: &UpdateUser) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, email = ?,
                password = COALESCE(?, password),
                owner = ?, photo = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(i64::from(data.owner))
        .bind(&data.photo)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes a user
    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        super::soft_delete(pool, "users", id).await
    }

    /// Restores a soft-deleted user
    pub async fn restore(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        super::restore(pool, "users", id).await
    }

    /// One page of users matching `filters`, ordered by last then first name
    ///
    /// Returns the rows and the number of matching users across all pages.
    pub async fn paginate(
        pool: &SqlitePool,
        filters: &ListFilters,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Self>, u64), sqlx::Error> {
        let clause = filters.clause("deleted_at", SEARCH_COLUMNS);

        let total = super::count_matching(pool, "users", &clause).await?;

        let select = format!("SELECT {COLUMNS} FROM users");
        let rows = super::fetch_page(pool, &select, &clause, "last_name, first_name", page, per_page).await?;

        Ok((rows, total))
    }

    pub fn is_owner(&self) -> bool {
        self.owner != 0
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
