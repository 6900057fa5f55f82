/// Authentication endpoints
///
/// # Endpoints
///
/// - `GET /login` - Login page (signed-in users go to the dashboard)
/// - `POST /login` - Check credentials and start a session
/// - `POST /logout` - End the session

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use pingcrm_shared::{auth::password, models::user::User};
use serde::Deserialize;
use tower_cookies::Cookies;
use validator::Validate;

use super::{
    forms::{required_text, untrimmed_text, FormJson},
    NoProps, WithErrors,
};
use crate::{
    app::AppState,
    error::{field_errors, AppResult, FieldErrors},
    inertia::Inertia,
    middleware::share::CurrentUser,
    session,
};

const LOGIN_COMPONENT: &str = "Auth/Login";

/// Shown for an unknown email and for a wrong password alike
pub const INVALID_CREDENTIALS: &str = "These credentials do not match our records.";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "required_text")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default, deserialize_with = "untrimmed_text")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

fn login_failed(inertia: &Inertia, errors: FieldErrors) -> AppResult<Response> {
    inertia.render(LOGIN_COMPONENT, WithErrors::new(NoProps::default(), errors))
}

pub async fn show_login(inertia: Inertia, current_user: Option<Extension<CurrentUser>>) -> AppResult<Response> {
    if current_user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    inertia.render(LOGIN_COMPONENT, NoProps::default())
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "johndoe@example.com",
///   "password": "secret"
/// }
/// ```
///
/// Soft-deleted users cannot sign in. Every failure re-renders the login page
/// with field errors.
pub async fn login(
    State(state): State<AppState>,
    inertia: Inertia,
    cookies: Cookies,
    FormJson(req): FormJson<LoginRequest>,
) -> AppResult<Response> {
    if let Err(e) = req.validate() {
        return login_failed(&inertia, field_errors(&e));
    }

    let invalid = || FieldErrors::from([("email".to_string(), INVALID_CREDENTIALS.to_string())]);

    let Some(user) = User::find_active_by_email(&state.db, &req.email).await? else {
        tracing::warn!(email = %req.email, "Login attempt for unknown email");
        return login_failed(&inertia, invalid());
    };

    if !password::verify_password(&req.password, &user.password)? {
        tracing::warn!(user_id = user.id, "Login attempt with wrong password");
        return login_failed(&inertia, invalid());
    }

    session::start_session(&cookies, &state, user.id)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(inertia.location("/"))
}

pub async fn logout(cookies: Cookies, current_user: Option<Extension<CurrentUser>>) -> Response {
    session::end_session(&cookies);

    if let Some(Extension(user)) = current_user {
        tracing::info!(user_id = user.id(), "User logged out");
    }

    Redirect::to("/login").into_response()
}
