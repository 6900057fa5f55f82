/// Authentication guard for the protected routes
///
/// Runs after the share middleware, which has already resolved the session
/// into a [`CurrentUser`]. Guests are redirected to the login page.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::share::CurrentUser;

pub const LOGIN_PATH: &str = "/login";

pub async fn require_auth(req: Request, next: Next) -> Response {
    if req.extensions().get::<CurrentUser>().is_none() {
        tracing::debug!(path = %req.uri().path(), "Guest request to protected route");
        return Redirect::to(LOGIN_PATH).into_response();
    }

    next.run(req).await
}
