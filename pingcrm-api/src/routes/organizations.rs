/// Organization pages
///
/// # Endpoints
///
/// - `GET /organizations` - Paginated, filterable list
/// - `GET /organizations/create` - Create form
/// - `POST /organizations` - Store a new organization
/// - `GET /organizations/:id/edit` - Edit form, with the organization's active contacts
/// - `PUT /organizations/:id` - Update
/// - `DELETE /organizations/:id` - Soft delete
/// - `PUT /organizations/:id/restore` - Restore

use axum::{
    extract::{Path, State},
    response::Response,
};
use pingcrm_shared::{
    models::{
        contact::Contact,
        organization::{Organization, OrganizationInput},
    },
    query::{paginate, ListFilters, Paginated, PER_PAGE},
    resources::OrganizationResource,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use validator::Validate;

use super::{
    forms::{list_base_url, optional_text, required_text, FormJson, ListQuery},
    not_found, NoProps, WithErrors,
};
use crate::{
    app::AppState,
    error::{field_errors, AppResult},
    inertia::Inertia,
    session::{set_flash, Flash},
};

const BASE_PATH: &str = "/organizations";

/// Create / update body
#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationForm {
    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

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

impl From<OrganizationForm> for OrganizationInput {
    fn from(form: OrganizationForm) -> Self {
        Self {
            name: form.name,
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
    organizations: Paginated<OrganizationResource>,
    filters: ListFilters,
}

#[derive(Debug, Serialize)]
struct EditProps {
    organization: OrganizationResource,
}

fn edit_url(id: i64) -> String {
    format!("{BASE_PATH}/{id}/edit")
}

async fn edit_props(state: &AppState, id: i64) -> AppResult<EditProps> {
    let organization = Organization::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Organization"))?;
    let contacts = Contact::list_active_for_organization(&state.db, id).await?;

    Ok(EditProps {
        organization: OrganizationResource::from(&organization).with_contacts(&contacts),
    })
}

pub async fn index(
    State(state): State<AppState>,
    inertia: Inertia,
    query: ListQuery,
) -> AppResult<Response> {
    let filters = query.filters();
    let page = query.page();

    tracing::debug!(search = %filters.search, trashed = filters.trashed.as_str(), page, "Listing organizations");

    let (rows, total) = Organization::paginate(&state.db, &filters, page, PER_PAGE).await?;
    let organizations = paginate(
        rows.iter().map(OrganizationResource::from).collect(),
        total,
        page,
        PER_PAGE,
        &list_base_url(BASE_PATH, &filters),
    );

    inertia.render("Organizations/Index", IndexProps { organizations, filters })
}

pub async fn create(inertia: Inertia) -> AppResult<Response> {
    inertia.render("Organizations/Create", NoProps::default())
}

pub async fn store(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    FormJson(form): FormJson<OrganizationForm>,
) -> AppResult<Response> {
    if let Err(e) = form.validate() {
        return inertia.render(
            "Organizations/Create",
            WithErrors::new(NoProps::default(), field_errors(&e)),
        );
    }

    let id = Organization::create(&state.db, &form.into()).await?;
    set_flash(&cookies, &state, &Flash::success("Organization created."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn edit(State(state): State<AppState>, inertia: Inertia, Path(id): Path<i64>) -> AppResult<Response> {
    let props = edit_props(&state, id).await?;
    inertia.render("Organizations/Edit", props)
}

pub async fn update(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
    FormJson(form): FormJson<OrganizationForm>,
) -> AppResult<Response> {
    if let Err(e) = form.validate() {
        let props = edit_props(&state, id).await?;
        return inertia.render("Organizations/Edit", WithErrors::new(props, field_errors(&e)));
    }

    if !Organization::update(&state.db, id, &form.into()).await? {
        return Err(not_found("Organization"));
    }
    set_flash(&cookies, &state, &Flash::success("Organization updated."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn destroy(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !Organization::soft_delete(&state.db, id).await? {
        return Err(not_found("Organization"));
    }
    tracing::info!(organization_id = id, "Organization deleted");
    set_flash(&cookies, &state, &Flash::success("Organization deleted."))?;

    Ok(inertia.location(BASE_PATH))
}

pub async fn restore(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !Organization::restore(&state.db, id).await? {
        return Err(not_found("Organization"));
    }
    tracing::info!(organization_id = id, "Organization restored");
    set_flash(&cookies, &state, &Flash::success("Organization restored."))?;

    Ok(inertia.location(&edit_url(id)))
}
