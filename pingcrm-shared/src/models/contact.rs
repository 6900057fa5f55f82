/// Contact model and database operations
///
/// A contact optionally belongs to one organization. The reference is checked
/// by the foreign key on write and cleared if the organization row is ever
/// hard-deleted; soft-deleting the organization leaves it in place.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     organization_id INTEGER,
///     first_name TEXT NOT NULL,
///     last_name TEXT NOT NULL,
///     email TEXT,
///     phone TEXT,
///     address TEXT,
///     city TEXT,
///     region TEXT,
///     country TEXT,
///     postal_code TEXT,
///     deleted_at TEXT,
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE SET NULL
/// );
/// ```

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::info;

use crate::query::ListFilters;
use crate::resources::OrganizationSummary;

/// Columns searched by the contacts list
///
/// Qualified, since the list joins `organizations`.
pub const SEARCH_COLUMNS: &[&str] = &[
    "contacts.first_name",
    "contacts.last_name",
    "contacts.email",
    "organizations.name",
    "contacts.city",
];

const COLUMNS: &str = "contacts.id, contacts.organization_id, contacts.first_name, contacts.last_name, \
                       contacts.email, contacts.phone, contacts.address, contacts.city, contacts.region, \
                       contacts.country, contacts.postal_code, contacts.deleted_at, contacts.created_at, \
                       contacts.updated_at";

const LIST_FROM: &str = "contacts LEFT JOIN organizations ON contacts.organization_id = organizations.id";

/// A contact row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub organization_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
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

/// A contact joined with its organization's id and name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactWithOrganization {
    #[sqlx(flatten)]
    pub contact: Contact,

    /// `None` when the contact has no organization
    pub org_id: Option<i64>,
    pub org_name: Option<String>,
}

impl ContactWithOrganization {
    pub fn organization(&self) -> Option<OrganizationSummary> {
        match (self.org_id, &self.org_name) {
            (Some(id), Some(name)) => Some(OrganizationSummary {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }
}

/// Writable contact fields, used for both insert and update
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub organization_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl Contact {
    /// Inserts a contact and returns its id
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if `organization_id` names no
    /// organization.
    pub async fn create(pool: &SqlitePool, data: &ContactInput) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (organization_id, first_name, last_name, email, phone, address,
                                  city, region, country, postal_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.organization_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
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
        info!(contact_id = id, organization_id = ?data.organization_id, "Contact created");

        Ok(id)
    }

    /// Finds a contact by id, deleted or not
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE contacts.id = ?");

        sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Non-deleted contacts of one organization, ordered by last then first name
    pub async fn list_active_for_organization(
        pool: &SqlitePool,
        organization_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE contacts.organization_id = ? AND contacts.deleted_at IS NULL \
             ORDER BY contacts.last_name, contacts.first_name"
        );

        sqlx::query_as::<_, Contact>(&sql)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Updates a contact, refreshing `updated_at`
    ///
    /// Returns whether the contact exists.
    pub async fn update(pool: &SqlitePool, id: i64, data: &ContactInput) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET organization_id = ?, first_name = ?, last_name = ?, email = ?, phone = ?,
                address = ?, city = ?, region = ?, country = ?, postal_code = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(data.organization_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
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
        super::soft_delete(pool, "contacts", id).await
    }

    pub async fn restore(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        super::restore(pool, "contacts", id).await
    }

    /// One page of contacts matching `filters`, each joined with its organization
    ///
    /// Search also matches the organization's name. The trashed filter applies
    /// to the contact only.
    pub async fn paginate(
        pool: &SqlitePool,
        filters: &ListFilters,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ContactWithOrganization>, u64), sqlx::Error> {
        let clause = filters.clause("contacts.deleted_at", SEARCH_COLUMNS);

        let total = super::count_matching(pool, LIST_FROM, &clause).await?;

        let select = format!(
            "SELECT {COLUMNS}, organizations.id AS org_id, organizations.name AS org_name FROM {LIST_FROM}"
        );
        let rows = super::fetch_page(
            pool,
            &select,
            &clause,
            "contacts.last_name, contacts.first_name",
            page,
            per_page,
        )
        .await?;

        Ok((rows, total))
    }
}
