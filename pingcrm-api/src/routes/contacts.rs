/// Contact pages
///
/// # Endpoints
///
/// - `GET /contacts` - Paginated, filterable list; rows embed their organization
/// - `GET /contacts/create` - Create form with organization options
/// - `POST /contacts` - Store a new contact
/// - `GET /contacts/:id/edit` - Edit form with organization options
/// - `PUT /contacts/:id` - Update
/// - `DELETE /contacts/:id` - Soft delete
/// - `PUT /contacts/:id/restore` - Restore

use axum::{
    extract::{Path, State},
    response::Response,
};
use pingcrm_shared::{
    models::{
        contact::{Contact, ContactInput},
        organization::Organization,
    },
    query::{paginate, ListFilters, Paginated, PER_PAGE},
    resources::{ContactResource, OrganizationSummary},
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use validator::Validate;

use super::{
    forms::{list_base_url, optional_id, optional_text, required_text, FormJson, ListQuery},
    not_found, WithErrors,
};
use crate::{
    app::AppState,
    error::{field_errors, AppResult, FieldErrors},
    inertia::Inertia,
    session::{set_flash, Flash},
};

const BASE_PATH: &str = "/contacts";

pub const INVALID_ORGANIZATION: &str = "The selected organization is invalid.";

/// Create / update body
#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[serde(default, deserialize_with = "optional_id")]
    pub organization_id: Option<i64>,

    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub postal_code: Option<String>,
}

impl ContactForm {
    /// Field checks plus the organization reference, which needs the database
    async fn errors(&self, state: &AppState) -> AppResult<FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if let Some(organization_id) = self.organization_id {
            if !Organization::exists(&state.db, organization_id).await? {
                errors.insert("organization_id".to_string(), INVALID_ORGANIZATION.to_string());
            }
        }

        Ok(errors)
    }
}

impl From<ContactForm> for ContactInput {
    fn from(form: ContactForm) -> Self {
        Self {
            organization_id: form.organization_id,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            address: form.address,
            city: form.city,
            region: form.region,
            country: form.country,
            postal_code: form.postal_code,
        }
    }
}

#[derive(Debug, Serialize)]
struct IndexProps {
    contacts: Paginated<ContactResource>,
    filters: ListFilters,
}

#[derive(Debug, Serialize)]
struct CreateProps {
    organizations: Vec<OrganizationSummary>,
}

#[derive(Debug, Serialize)]
struct EditProps {
    contact: ContactResource,
    organizations: Vec<OrganizationSummary>,
}

fn edit_url(id: i64) -> String {
    format!("{BASE_PATH}/{id}/edit")
}

async fn create_props(state: &AppState) -> AppResult<CreateProps> {
    Ok(CreateProps {
        organizations: Organization::list_active_options(&state.db).await?,
    })
}

async fn edit_props(state: &AppState, id: i64) -> AppResult<EditProps> {
    let contact = Contact::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Contact"))?;

    Ok(EditProps {
        contact: ContactResource::from(&contact),
        organizations: Organization::list_active_options(&state.db).await?,
    })
}

pub async fn index(
    State(state): State<AppState>,
    inertia: Inertia,
    query: ListQuery,
) -> AppResult<Response> {
    let filters = query.filters();
    let page = query.page();

    tracing::debug!(search = %filters.search, trashed = filters.trashed.as_str(), page, "Listing contacts");

    let (rows, total) = Contact::paginate(&state.db, &filters, page, PER_PAGE).await?;
    let contacts = paginate(
        rows.iter().map(ContactResource::from).collect(),
        total,
        page,
        PER_PAGE,
        &list_base_url(BASE_PATH, &filters),
    );

    inertia.render("Contacts/Index", IndexProps { contacts, filters })
}

pub async fn create(State(state): State<AppState>, inertia: Inertia) -> AppResult<Response> {
    let props = create_props(&state).await?;
    inertia.render("Contacts/Create", props)
}

pub async fn store(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    FormJson(form): FormJson<ContactForm>,
) -> AppResult<Response> {
    let errors = form.errors(&state).await?;
    if !errors.is_empty() {
        let props = create_props(&state).await?;
        return inertia.render("Contacts/Create", WithErrors::new(props, errors));
    }

    let id = Contact::create(&state.db, &form.into()).await?;
    set_flash(&cookies, &state, &Flash::success("Contact created."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn edit(State(state): State<AppState>, inertia: Inertia, Path(id): Path<i64>) -> AppResult<Response> {
    let props = edit_props(&state, id).await?;
    inertia.render("Contacts/Edit", props)
}

pub async fn update(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
    FormJson(form): FormJson<ContactForm>,
) -> AppResult<Response> {
    let errors = form.errors(&state).await?;
    if !errors.is_empty() {
        let props = edit_props(&state, id).await?;
        return inertia.render("Contacts/Edit", WithErrors::new(props, errors));
    }

    if !Contact::update(&state.db, id, &form.into()).await? {
        return Err(not_found("Contact"));
    }
    set_flash(&cookies, &state, &Flash::success("Contact updated."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn destroy(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !Contact::soft_delete(&state.db, id).await? {
        return Err(not_found("Contact"));
    }
    tracing::info!(contact_id = id, "Contact deleted");
    set_flash(&cookies, &state, &Flash::success("Contact deleted."))?;

    Ok(inertia.location(BASE_PATH))
}

pub async fn restore(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !Contact::restore(&state.db, id).await? {
        return Err(not_found("Contact"));
    }
    tracing::info!(contact_id = id, "Contact restored");
    set_flash(&cookies, &state, &Flash::success("Contact restored."))?;

    Ok(inertia.location(&edit_url(id)))
}
