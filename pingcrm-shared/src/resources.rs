//! Client-facing shapes of the stored rows
//!
//! Every page prop that carries a user, organization or contact goes through
//! these types:
//!
//! - `name` is derived from first and last name
//! - the integer owner flag becomes a `bool`
//! - empty or NULL optional fields are left out of the JSON entirely
//! - `deleted_at` is always present, `null` for live rows
//!
//! Conversions are total and deterministic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::contact::{Contact, ContactWithOrganization};
use crate::models::organization::Organization;
use crate::models::user::User;

/// First and last name joined by a space
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// `{id, name}` of an organization
///
/// Embedded in contacts and used for select options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrganizationSummary {
    pub id: i64,
    pub name: String,
}

/// A user as sent to the client; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResource {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub owner: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    pub deleted_at: Option<NaiveDateTime>,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            name: display_name(&user.first_name, &user.last_name),
            email: user.email.clone(),
            owner: user.is_owner(),
            photo: present(&user.photo),
            deleted_at: user.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationResource {
    pub id: i64,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    pub deleted_at: Option<NaiveDateTime>,

    /// Active contacts, only on the edit page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<ContactResource>>,
}

impl OrganizationResource {
    /// Attaches the organization's contacts
    pub fn with_contacts(mut self, contacts: &[Contact]) -> Self {
        self.contacts = Some(contacts.iter().map(ContactResource::from).collect());
        self
    }
}

impl From<&Organization> for OrganizationResource {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            email: present(&org.email),
            phone: present(&org.phone),
            address: present(&org.address),
            city: present(&org.city),
            region: present(&org.region),
            country: present(&org.country),
            postal_code: present(&org.postal_code),
            deleted_at: org.deleted_at,
            contacts: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactResource {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,

    pub deleted_at: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationSummary>,
}

impl ContactResource {
    /// Embeds the organization summary, if there is one
    pub fn with_organization(mut self, organization: Option<OrganizationSummary>) -> Self {
        self.organization = organization;
        self
    }
}

impl From<&Contact> for ContactResource {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            name: display_name(&contact.first_name, &contact.last_name),
            email: present(&contact.email),
            phone: present(&contact.phone),
            address: present(&contact.address),
            city: present(&contact.city),
            region: present(&contact.region),
            country: present(&contact.country),
            postal_code: present(&contact.postal_code),
            organization_id: contact.organization_id.filter(|id| *id != 0),
            deleted_at: contact.deleted_at,
            organization: None,
        }
    }
}

impl From<&ContactWithOrganization> for ContactResource {
    fn from(row: &ContactWithOrganization) -> Self {
        ContactResource::from(&row.contact).with_organization(row.organization())
    }
}
