/// User pages
///
/// # Endpoints
///
/// - `GET /users` - Paginated, filterable list
/// - `GET /users/create` - Create form
/// - `POST /users` - Store a new user
/// - `GET /users/:id/edit` - Edit form
/// - `PUT /users/:id` - Update; the password only changes when one is given
/// - `POST /users/:id` - Update through `"_method": "put"` (multipart-style clients)
/// - `DELETE /users/:id` - Soft delete
/// - `PUT /users/:id/restore` - Restore
///
/// The password hash never leaves the server: every page gets a
/// [`UserResource`].

use axum::{
    extract::{Path, State},
    response::Response,
};
use pingcrm_shared::{
    auth::password,
    models::user::{CreateUser, UpdateUser, User},
    query::{paginate, ListFilters, Paginated, PER_PAGE},
    resources::UserResource,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_cookies::Cookies;
use validator::Validate;

use super::{
    forms::{flag, list_base_url, optional_text, required_text, untrimmed_text, FormJson, ListQuery},
    not_found, NoProps, WithErrors,
};
use crate::{
    app::AppState,
    error::{field_errors, AppError, AppResult, FieldErrors},
    inertia::Inertia,
    session::{set_flash, Flash},
};

const BASE_PATH: &str = "/users";

pub const EMAIL_TAKEN: &str = "Email is already taken";

/// Create / update body
#[derive(Debug, Deserialize, Validate)]
pub struct UserForm {
    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Required on create; blank on update keeps the current password
    #[serde(default, deserialize_with = "untrimmed_text")]
    pub password: String,

    #[serde(default, deserialize_with = "flag")]
    pub owner: bool,

    #[serde(default, deserialize_with = "optional_text")]
    pub photo: Option<String>,
}

impl UserForm {
    /// Field checks plus email uniqueness among all other users
    async fn errors(&self, state: &AppState, except_id: Option<i64>) -> AppResult<FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if except_id.is_none() && self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        }

        if !self.email.is_empty() && User::email_taken(&state.db, &self.email, except_id).await? {
            errors.insert("email".to_string(), EMAIL_TAKEN.to_string());
        }

        Ok(errors)
    }

    fn new_password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct IndexProps {
    users: Paginated<UserResource>,
    filters: ListFilters,
}

#[derive(Debug, Serialize)]
struct EditProps {
    user: UserResource,
}

fn edit_url(id: i64) -> String {
    format!("{BASE_PATH}/{id}/edit")
}

async fn edit_props(state: &AppState, id: i64) -> AppResult<EditProps> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    Ok(EditProps {
        user: UserResource::from(&user),
    })
}

pub async fn index(
    State(state): State<AppState>,
    inertia: Inertia,
    query: ListQuery,
) -> AppResult<Response> {
    let filters = query.filters();
    let page = query.page();

    tracing::debug!(search = %filters.search, trashed = filters.trashed.as_str(), page, "Listing users");

    let (rows, total) = User::paginate(&state.db, &filters, page, PER_PAGE).await?;
    let users = paginate(
        rows.iter().map(UserResource::from).collect(),
        total,
        page,
        PER_PAGE,
        &list_base_url(BASE_PATH, &filters),
    );

    inertia.render("Users/Index", IndexProps { users, filters })
}

pub async fn create(inertia: Inertia) -> AppResult<Response> {
    inertia.render("Users/Create", NoProps::default())
}

pub async fn store(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    FormJson(form): FormJson<UserForm>,
) -> AppResult<Response> {
    let errors = form.errors(&state, None).await?;
    if !errors.is_empty() {
        return inertia.render("Users/Create", WithErrors::new(NoProps::default(), errors));
    }

    let password_hash = password::hash_password(&form.password)?;
    let id = User::create(
        &state.db,
        &CreateUser {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password_hash,
            owner: form.owner,
            photo: form.photo,
        },
    )
    .await?;
    set_flash(&cookies, &state, &Flash::success("User created."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn edit(State(state): State<AppState>, inertia: Inertia, Path(id): Path<i64>) -> AppResult<Response> {
    let props = edit_props(&state, id).await?;
    inertia.render("Users/Edit", props)
}

async fn apply_update(
    state: &AppState,
    inertia: &Inertia,
    cookies: &Cookies,
    id: i64,
    form: UserForm,
) -> AppResult<Response> {
    // Unknown ids are a 404 even when the form is invalid
    let props = edit_props(state, id).await?;

    let errors = form.errors(state, Some(id)).await?;
    if !errors.is_empty() {
        return inertia.render("Users/Edit", WithErrors::new(props, errors));
    }

    let password_hash = form.new_password().map(password::hash_password).transpose()?;
    let updated = User::update(
        &state.db,
        id,
        &UpdateUser {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password_hash,
            owner: form.owner,
            photo: form.photo,
        },
    )
    .await?;

    if !updated {
        return Err(not_found("User"));
    }
    set_flash(cookies, state, &Flash::success("User updated."))?;

    Ok(inertia.location(&edit_url(id)))
}

pub async fn update(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
    FormJson(form): FormJson<UserForm>,
) -> AppResult<Response> {
    apply_update(&state, &inertia, &cookies, id, form).await
}

/// `POST /users/:id` carrying `"_method": "put"`
pub async fn update_via_post(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
    FormJson(body): FormJson<Value>,
) -> AppResult<Response> {
    let spoofs_put = body
        .get("_method")
        .and_then(Value::as_str)
        .is_some_and(|method| method.eq_ignore_ascii_case("put"));

    if !spoofs_put {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let form: UserForm = serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    apply_update(&state, &inertia, &cookies, id, form).await
}

pub async fn destroy(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !User::soft_delete(&state.db, id).await? {
        return Err(not_found("User"));
    }
    tracing::info!(user_id = id, "User deleted");
    set_flash(&cookies, &state, &Flash::success("User deleted."))?;

    Ok(inertia.location(BASE_PATH))
}

pub async fn restore(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !User::restore(&state.db, id).await? {
        return Err(not_found("User"));
    }
    tracing::info!(user_id = id, "User restored");
    set_flash(&cookies, &state, &Flash::success("User restored."))?;

    Ok(inertia.location(&edit_url(id)))
}
