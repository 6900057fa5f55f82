/// Session and flash cookies
///
/// The session cookie holds a signed token naming the signed-in user. The
/// flash cookie carries a one-shot `{success?, error?}` message, URL-encoded
/// JSON, that the next request consumes.

use pingcrm_shared::auth::session::{create_session_token, validate_session_token, SessionClaims, SessionError};
use serde::{Deserialize, Serialize};
use tower_cookies::{
    cookie::{CookieBuilder, SameSite},
    Cookie, Cookies,
};

use crate::{app::AppState, error::AppResult};

pub const SESSION_COOKIE: &str = "pingcrm_session";
pub const FLASH_COOKIE: &str = "pingcrm_flash";

fn base_cookie(name: &'static str, value: String, secure: bool) -> CookieBuilder<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
}

/// Signs the user in
pub fn start_session(cookies: &Cookies, state: &AppState, user_id: i64) -> AppResult<()> {
    let ttl_days = state.config.session.ttl_days;
    let lifetime = chrono::Duration::try_days(ttl_days)
        .ok_or_else(|| SessionError::CreateError(format!("Session lifetime of {ttl_days} days is out of range")))?;

    let claims = SessionClaims::with_expiration(user_id, lifetime)?;
    let token = create_session_token(&claims, state.session_secret())?;

    let cookie = base_cookie(SESSION_COOKIE, token, state.config.app.production)
        .max_age(time::Duration::seconds(claims.lifetime_seconds()))
        .build();
    cookies.add(cookie);

    Ok(())
}

/// Signs the current user out
pub fn end_session(cookies: &Cookies) {
    cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
}

/// Id of the signed-in user, if the session cookie holds a valid token
pub fn session_user_id(cookies: &Cookies, secret: &str) -> Option<i64> {
    let cookie = cookies.get(SESSION_COOKIE)?;

    match validate_session_token(cookie.value(), secret).and_then(|claims| claims.user_id()) {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session cookie");
            None
        }
    }
}

/// One-shot status message shown on the next page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            error: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }

    /// Cookie value: URL-encoded JSON
    pub fn encode(&self) -> AppResult<String> {
        let json = serde_json::to_string(self)?;
        Ok(urlencoding::encode(&json).into_owned())
    }

    /// Parses a cookie value; anything unreadable is an empty flash
    pub fn decode(raw: &str) -> Self {
        urlencoding::decode(raw)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }
}

/// Stores a flash message for the next request
pub fn set_flash(cookies: &Cookies, state: &AppState, flash: &Flash) -> AppResult<()> {
    let cookie = base_cookie(FLASH_COOKIE, flash.encode()?, state.config.app.production).build();
    cookies.add(cookie);
    Ok(())
}

/// Reads and clears the pending flash message
pub fn take_flash(cookies: &Cookies) -> Flash {
    let Some(cookie) = cookies.get(FLASH_COOKIE) else {
        return Flash::default();
    };

    let flash = Flash::decode(cookie.value());
    cookies.remove(Cookie::build(FLASH_COOKIE).path("/").build());
    flash
}
