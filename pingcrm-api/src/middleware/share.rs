/// Shared page props
///
/// Resolves the session cookie to an active user and attaches the props every
/// page receives:
///
/// - `auth.user`: the signed-in user with their `account`, or `null`
/// - `flash`: the pending flash message, consumed by this request
/// - `errors`: an empty map; validation failures replace it
///
/// A session naming a deleted or soft-deleted user is treated as a guest.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use pingcrm_shared::{models::user::User, resources::UserResource};
use serde_json::{json, Value};
use tower_cookies::Cookies;

use crate::{
    app::AppState,
    error::AppResult,
    inertia::SharedProps,
    session::{session_user_id, take_flash},
};

/// Id of the single account every user belongs to
pub const ACCOUNT_ID: i64 = 1;

/// The signed-in user, available to handlers as a request extension
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// `auth.user` prop: the formatted user plus their account
pub fn auth_user(user: &User, account_name: &str) -> AppResult<Value> {
    let mut value = serde_json::to_value(UserResource::from(user))?;
    value["account"] = json!({ "id": ACCOUNT_ID, "name": account_name });
    Ok(value)
}

pub async fn share_props(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let user = match session_user_id(&cookies, state.session_secret()) {
        Some(user_id) => User::find_active_by_id(&state.db, user_id).await?,
        None => None,
    };

    let auth_user = match &user {
        Some(user) => auth_user(user, &state.config.account_name)?,
        None => Value::Null,
    };

    let mut shared = SharedProps::default();
    shared.insert("auth", json!({ "user": auth_user }));
    shared.insert("flash", serde_json::to_value(take_flash(&cookies))?);
    shared.insert("errors", json!({}));

    req.extensions_mut().insert(shared);
    if let Some(user) = user {
        req.extensions_mut().insert(CurrentUser(user));
    }

    Ok(next.run(req).await)
}
