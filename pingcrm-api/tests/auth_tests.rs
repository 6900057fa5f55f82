/// Integration tests for sessions, shared props and the Inertia bridge

mod common;

use axum::http::{header, Method, StatusCode};
use common::*;
use pingcrm_api::app::{build_router, AppState};
use pingcrm_api::config::MAX_SESSION_TTL_DAYS;
use pingcrm_api::inertia::{X_INERTIA, X_INERTIA_LOCATION};
use pingcrm_api::routes::auth::INVALID_CREDENTIALS;
use pingcrm_api::session::SESSION_COOKIE;
use pingcrm_shared::models::user::User;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send(browser_request("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_guest_is_redirected_to_login() {
    let ctx = TestContext::new().await.unwrap();

    for uri in ["/", "/reports", "/organizations", "/contacts/create", "/users/1/edit"] {
        let response = ctx.guest(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(header_str(&response, "location"), Some("/login"));
    }

    let response = ctx.guest(Method::DELETE, "/organizations/1", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_page_html_shell() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send(browser_request("/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, X_INERTIA).is_none());
    assert!(header_str(&response, "content-type").unwrap().starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("data-page=\""));
    assert!(html.contains("&quot;component&quot;:&quot;Auth/Login&quot;"));
    assert!(html.contains("&quot;version&quot;:&quot;test-assets-1&quot;"));
}

#[tokio::test]
async fn test_login_page_redirects_signed_in_user() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/login").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, "location"), Some("/"));
}

#[tokio::test]
async fn test_login_success_starts_session() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .guest(
            Method::POST,
            "/login",
            Some(json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(header_str(&response, X_INERTIA_LOCATION), Some("/"));

    let cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with(SESSION_COOKIE))
        .expect("Session cookie should be set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));

    // The new cookie opens the protected pages
    let session = cookie_pair(&response, SESSION_COOKIE).unwrap();
    let response = ctx
        .send(inertia_request(Method::GET, "/", None, Some(&session)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(page(response).await.component, "Dashboard/Index");
}

#[tokio::test]
async fn test_login_with_longest_session_lifetime() {
    let ctx = TestContext::new().await.unwrap();

    let mut config = ctx.config.clone();
    config.session.ttl_days = MAX_SESSION_TTL_DAYS;
    let mut app = build_router(AppState::new(ctx.db.clone(), config));

    let request = inertia_request(
        Method::POST,
        "/login",
        Some(json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD })),
        None,
    );
    let response = match tower::Service::call(&mut app, request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with(SESSION_COOKIE))
        .expect("Session cookie should be set");
    assert!(cookie.contains(&format!("Max-Age={}", MAX_SESSION_TTL_DAYS * 24 * 60 * 60)));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.guest(Method::POST, "/login", Some(json!({ "email": "" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = page(response).await;
    assert_eq!(page.component, "Auth/Login");
    assert_eq!(page.props["errors"]["email"], "Email is required");
    assert_eq!(page.props["errors"]["password"], "Password is required");
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let ctx = TestContext::new().await.unwrap();

    for body in [
        json!({ "email": TEST_EMAIL, "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
    ] {
        let response = ctx.guest(Method::POST, "/login", Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cookie_pair(&response, SESSION_COOKIE).is_none());

        let page = page(response).await;
        assert_eq!(page.props["errors"], json!({ "email": INVALID_CREDENTIALS }));
    }
}

#[tokio::test]
async fn test_soft_deleted_user_cannot_log_in() {
    let ctx = TestContext::new().await.unwrap();
    User::soft_delete(&ctx.db, ctx.user.id).await.unwrap();

    let response = ctx
        .guest(
            Method::POST,
            "/login",
            Some(json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD })),
        )
        .await;
    let page = page(response).await;
    assert_eq!(page.props["errors"]["email"], INVALID_CREDENTIALS);

    // An existing session of the deleted user no longer counts either
    let response = ctx.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_invalid_session_cookie_is_a_guest() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = format!("{SESSION_COOKIE}=not-a-token");
    let response = ctx.send(inertia_request(Method::GET, "/", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, "location"), Some("/login"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.inertia(Method::POST, "/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, "location"), Some("/login"));

    let cleared = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with(SESSION_COOKIE))
        .expect("Session cookie should be cleared");
    assert!(cleared.contains("Max-Age=0") || cleared.contains("Expires="));
}

#[tokio::test]
async fn test_shared_props() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, X_INERTIA), Some("true"));
    assert_eq!(header_str(&response, "vary"), Some(X_INERTIA));

    let page = page(response).await;
    assert_eq!(page.component, "Dashboard/Index");
    assert_eq!(page.url, "/");
    assert_eq!(page.version, TEST_VERSION);

    let user = &page.props["auth"]["user"];
    assert_eq!(user["id"], ctx.user.id);
    assert_eq!(user["name"], "John Doe");
    assert_eq!(user["owner"], true);
    assert_eq!(user["account"], json!({ "id": 1, "name": "Acme Corporation" }));
    assert!(user.get("password").is_none());

    assert_eq!(page.props["flash"], json!({}));
    assert_eq!(page.props["errors"], json!({}));
}

#[tokio::test]
async fn test_guest_shared_props() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.guest(Method::GET, "/login", None).await;
    let page = page(response).await;
    assert_eq!(page.component, "Auth/Login");
    assert!(page.props["auth"]["user"].is_null());
}

#[tokio::test]
async fn test_page_url_keeps_query_string() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/organizations?search=acme&trashed=with").await;
    let page = page(response).await;
    assert_eq!(page.url, "/organizations?search=acme&trashed=with");
}

#[tokio::test]
async fn test_stale_asset_version_forces_reload() {
    let ctx = TestContext::new().await.unwrap();

    let mut request = inertia_request(Method::GET, "/reports?x=1", None, Some(&ctx.session_cookie));
    request
        .headers_mut()
        .insert("x-inertia-version", "old-assets".parse().unwrap());

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(header_str(&response, X_INERTIA_LOCATION), Some("/reports?x=1"));

    // Plain browser visits are never version-checked
    let response = ctx
        .send(browser_request("/reports", Some(&ctx.session_cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send(browser_request("/login", None)).await;
    assert_eq!(header_str(&response, "x-frame-options"), Some("DENY"));
    assert_eq!(header_str(&response, "x-content-type-options"), Some("nosniff"));
    assert!(response.headers().get(header::STRICT_TRANSPORT_SECURITY).is_none());
}
