/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use pingcrm_api::{app::AppState, config::Config};
/// use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = pingcrm_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::AppError,
    inertia::version_guard,
    middleware::{auth::require_auth, security::SecurityHeadersLayer, share::share_props},
    routes,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret the session tokens are signed with
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                       # public
/// ├── GET  /login, POST /login           # public
/// ├── POST /logout                       # public
/// └── everything else                    # signed-in users only
///     ├── GET /, GET /reports
///     ├── /organizations[/create|/:id|/:id/edit|/:id/restore]
///     ├── /contacts[/create|/:id|/:id/edit|/:id/restore]
///     └── /users[/create|/:id|/:id/edit|/:id/restore]
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Cookies (tower-cookies)
/// 4. Inertia asset version guard
/// 5. Shared props: session user, flash, errors
/// 6. Authentication guard (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use routes::{auth, contacts, dashboard, health, organizations, reports, users};

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/", get(dashboard::index))
        .route("/reports", get(reports::index))
        // Organizations
        .route("/organizations", get(organizations::index).post(organizations::store))
        .route("/organizations/create", get(organizations::create))
        .route("/organizations/:id", put(organizations::update).delete(organizations::destroy))
        .route("/organizations/:id/edit", get(organizations::edit))
        .route("/organizations/:id/restore", put(organizations::restore))
        // Contacts
        .route("/contacts", get(contacts::index).post(contacts::store))
        .route("/contacts/create", get(contacts::create))
        .route("/contacts/:id", put(contacts::update).delete(contacts::destroy))
        .route("/contacts/:id/edit", get(contacts::edit))
        .route("/contacts/:id/restore", put(contacts::restore))
        // Users
        .route("/users", get(users::index).post(users::store))
        .route("/users/create", get(users::create))
        .route(
            "/users/:id",
            put(users::update).post(users::update_via_post).delete(users::destroy),
        )
        .route("/users/:id/edit", get(users::edit))
        .route("/users/:id/restore", put(users::restore))
        .route_layer(from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), share_props))
        .layer(from_fn_with_state(state.clone(), version_guard))
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.app.production))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
