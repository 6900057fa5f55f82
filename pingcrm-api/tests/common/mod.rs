#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - A private in-memory database with migrations applied
/// - A signed-in owner and their session cookie
/// - Request builders for Inertia and plain browser requests
/// - Response helpers (page object, cookies)

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use pingcrm_api::app::{build_router, AppState};
use pingcrm_api::config::Config;
use pingcrm_api::inertia::{Page, X_INERTIA, X_INERTIA_VERSION};
use pingcrm_api::session::SESSION_COOKIE;
use pingcrm_shared::auth::password::hash_password;
use pingcrm_shared::auth::session::{create_session_token, SessionClaims};
use pingcrm_shared::db::migrations::run_migrations;
use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
use pingcrm_shared::models::user::{CreateUser, User};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-session-secret-at-least-32-bytes-long";
pub const TEST_VERSION: &str = "test-assets-1";
pub const TEST_PASSWORD: &str = "secret";
pub const TEST_EMAIL: &str = "johndoe@example.com";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
    pub user: User,
    pub session_cookie: String,
}

pub fn test_config() -> anyhow::Result<Config> {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SESSION_SECRET", TEST_SECRET),
        ("INERTIA_VERSION", TEST_VERSION),
        ("ACCOUNT_NAME", "Acme Corporation"),
        ("SEED_DEMO_DATA", "false"),
    ]);

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

impl TestContext {
    /// Creates a new test context with a fresh database and a signed-in owner
    pub async fn new() -> anyhow::Result<Self> {
        let config = test_config()?;

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let user_id = User::create(
            &db,
            &CreateUser {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: TEST_EMAIL.to_string(),
                password_hash: hash_password(TEST_PASSWORD)?,
                owner: true,
                photo: None,
            },
        )
        .await?;
        let user = User::find_by_id(&db, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Test user was not created"))?;

        let session_cookie = session_cookie_for(user_id)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            session_cookie,
        })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        let mut app = self.app.clone();
        match app.call(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Inertia request from the signed-in owner
    pub async fn inertia(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.send(inertia_request(method, uri, body, Some(&self.session_cookie)))
            .await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.inertia(Method::GET, uri, None).await
    }

    /// Inertia request without a session
    pub async fn guest(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.send(inertia_request(method, uri, body, None)).await
    }

    /// `GET` of a page component's props, asserting a `200`
    pub async fn props(&self, uri: &str) -> Value {
        let response = self.get(uri).await;
        assert_eq!(response.status(), 200, "GET {uri} should render a page");
        page(response).await.props
    }
}

/// `name=value` cookie pair carrying a valid session for `user_id`
pub fn session_cookie_for(user_id: i64) -> anyhow::Result<String> {
    let token = create_session_token(&SessionClaims::new(user_id)?, TEST_SECRET)?;
    Ok(format!("{SESSION_COOKIE}={token}"))
}

pub fn inertia_request(method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(X_INERTIA, "true")
        .header(X_INERTIA_VERSION, TEST_VERSION);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

/// Plain browser `GET`
pub fn browser_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn page(response: Response) -> Page {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Every `Set-Cookie` header of the response
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` of the cookie the response sets, without attributes
pub fn cookie_pair(response: &Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next().map(str::to_string))
}
