/// Demo data
///
/// Populates an empty database with two users, three organizations and five
/// contacts so a fresh install has something to look at. Both users sign in
/// with the password `secret`.
///
/// Seeding is skipped as soon as any user exists.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::password::{hash_password, PasswordError};
use crate::models::contact::{Contact, ContactInput};
use crate::models::organization::{Organization, OrganizationInput};
use crate::models::user::{CreateUser, User};

/// Password of every seeded user
pub const DEMO_PASSWORD: &str = "secret";

/// Email of the seeded account owner
pub const DEMO_OWNER_EMAIL: &str = "johndoe@example.com";

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error while seeding: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not hash demo password: {0}")]
    Password(#[from] PasswordError),
}

/// What a seeding run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub organizations: usize,
    pub contacts: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.users == 0 && self.organizations == 0 && self.contacts == 0
    }
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[allow(clippy::too_many_arguments)]
fn organization(
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
    city: &str,
    region: &str,
    country: &str,
    postal_code: &str,
) -> OrganizationInput {
    OrganizationInput {
        name: name.to_string(),
        email: text(email),
        phone: text(phone),
        address: text(address),
        city: text(city),
        region: text(region),
        country: text(country),
        postal_code: text(postal_code),
    }
}

fn contact(organization_id: Option<i64>, first_name: &str, last_name: &str, email: &str, phone: &str) -> ContactInput {
    ContactInput {
        organization_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: text(email),
        phone: text(phone),
        ..Default::default()
    }
}

/// Copies the organization's postal address onto a contact
fn located_at(mut input: ContactInput, org: &OrganizationInput) -> ContactInput {
    input.address = org.address.clone();
    input.city = org.city.clone();
    input.region = org.region.clone();
    input.country = org.country.clone();
    input.postal_code = org.postal_code.clone();
    input
}

/// Seeds the demo data if the users table is empty
///
/// # Errors
///
/// Returns `SeedError` if an insert fails or the password cannot be hashed.
/// Inserts already made are kept.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<SeedSummary, SeedError> {
    if User::count(pool).await? > 0 {
        debug!("Users exist, skipping demo data");
        return Ok(SeedSummary {
            users: 0,
            organizations: 0,
            contacts: 0,
        });
    }

    info!("Seeding database with demo data");

    let password_hash = hash_password(DEMO_PASSWORD)?;

    let users = [
        ("John", "Doe", DEMO_OWNER_EMAIL, true),
        ("Jane", "Smith", "janesmith@example.com", false),
    ];
    for (first_name, last_name, email, owner) in users {
        User::create(
            pool,
            &CreateUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.clone(),
                owner,
                photo: None,
            },
        )
        .await?;
    }

    let acme = organization(
        "Acme Corporation",
        "info@acme.com",
        "555-0100",
        "123 Main St",
        "New York",
        "NY",
        "US",
        "10001",
    );
    let tech = organization(
        "Tech Solutions Inc",
        "contact@techsolutions.com",
        "555-0200",
        "456 Tech Ave",
        "Toronto",
        "ON",
        "CA",
        "M5H 2N2",
    );
    let global = organization(
        "Global Industries",
        "hello@global.com",
        "555-0300",
        "789 Business Blvd",
        "Chicago",
        "IL",
        "US",
        "60601",
    );

    let acme_id = Organization::create(pool, &acme).await?;
    let tech_id = Organization::create(pool, &tech).await?;
    let global_id = Organization::create(pool, &global).await?;

    let independent = ContactInput {
        address: text("321 Independent St"),
        city: text("Seattle"),
        region: text("WA"),
        country: text("US"),
        postal_code: text("98101"),
        ..contact(None, "Eve", "Miller", "eve@example.com", "555-4001")
    };

    let contacts = [
        located_at(contact(Some(acme_id), "Alice", "Johnson", "alice@acme.com", "555-1001"), &acme),
        located_at(contact(Some(acme_id), "Bob", "Williams", "bob@acme.com", "555-1002"), &acme),
        located_at(
            contact(Some(tech_id), "Charlie", "Brown", "charlie@techsolutions.com", "555-2001"),
            &tech,
        ),
        located_at(contact(Some(global_id), "Diana", "Davis", "diana@global.com", "555-3001"), &global),
        independent,
    ];
    for input in &contacts {
        Contact::create(pool, input).await?;
    }

    let summary = SeedSummary {
        users: users.len(),
        organizations: 3,
        contacts: contacts.len(),
    };

    info!(
        users = summary.users,
        organizations = summary.organizations,
        contacts = summary.contacts,
        "Database seeded successfully"
    );

    Ok(summary)
}
