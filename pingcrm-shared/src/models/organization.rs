/// Organization model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     email TEXT,
///     phone TEXT,
///     address TEXT,
///     city TEXT,
///     region TEXT,
///     country TEXT,
///     postal_code TEXT,
///     deleted_at TEXT,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// Soft-deleting an organization leaves its contacts attached.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::info;

use crate::query::ListFilters;
use crate::resources::OrganizationSummary;

/// Columns searched by the organizations list
pub const SEARCH_COLUMNS: &[&str] = &["name", "city", "phone"];

const COLUMNS: &str = "id, name, email, phone, address, city, region, country, postal_code, \
                       deleted_at, created_at, updated_at";

/// An organization row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Writable organization fields, used for both insert and update
#[derive(Debug, Clone, Default)]
pub struct OrganizationInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl Organization {
    /// Inserts an organization and returns its id
    pub async fn create(pool: &SqlitePool, data: &OrganizationInput) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO organizations (name, email, phone, address, city, region, country, postal_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.region)
        .bind(&data.country)
        .bind(&data.postal_code)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(organization_id = id, "Organization created");

        Ok(id)
    }

    /// Finds an organization by id, deleted or not
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM organizations WHERE id = ?");

        sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether an organization with this id exists, deleted or not
    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM organizations WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Id and name of every non-deleted organization, ordered by name
    ///
    /// Feeds the organization select on the contact forms.
    pub async fn list_active_options(pool: &SqlitePool) -> Result<Vec<OrganizationSummary>, sqlx::Error> {
        sqlx::query_as::<_, OrganizationSummary>(
            "SELECT id, name FROM organizations WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Updates an organization, refreshing `updated_at`
    ///
    /// Returns whether the organization exists.
    pub async fn update(pool: &SqlitePool, id: i64, data: &OrganizationInput) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET name = ?, email = ?, phone = ?, address = ?, city = ?, region = ?,
                country = ?, postal_code = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.region)
        .bind(&data.country)
        .bind(&data.postal_code)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        super::soft_delete(pool, "organizations", id).await
    }

    pub async fn restore(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        super::restore(pool, "organizations", id).await
    }

    /// One page of organizations matching `filters`, ordered by name
    pub async fn paginate(
        pool: &SqlitePool,
        filters: &ListFilters,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Self>, u64), sqlx::Error> {
        let clause = filters.clause("deleted_at", SEARCH_COLUMNS);

        let total = super::count_matching(pool, "organizations", &clause).await?;

        let select = format!("SELECT {COLUMNS} FROM organizations");
        let rows = super::fetch_page(pool, &select, &clause, "name", page, per_page).await?;

        Ok((rows, total))
    }

    pub fn summary(&self) -> OrganizationSummary {
        OrganizationSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
