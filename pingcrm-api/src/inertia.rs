/// Server side of the Inertia protocol
///
/// A handler names a client page component and hands it props; the bridge
/// decides how to deliver them:
///
/// - requests carrying `X-Inertia: true` (client navigations) get the page
///   object as JSON
/// - every other request gets an HTML shell with the page object embedded in
///   the root element, which boots the client
///
/// Shared props (`auth`, `flash`, `errors`) are attached to the request by the
/// share middleware and merged under the page props.
///
/// # Example
///
/// ```no_run
/// use axum::response::Response;
/// use pingcrm_api::{error::AppResult, inertia::Inertia};
/// use serde_json::json;
///
/// async fn dashboard(inertia: Inertia) -> AppResult<Response> {
///     inertia.render("Dashboard/Index", json!({}))
/// }
/// ```

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{header, request::Parts, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    app::AppState,
    error::{AppError, AppResult},
};

pub const X_INERTIA: &str = "x-inertia";
pub const X_INERTIA_VERSION: &str = "x-inertia-version";
pub const X_INERTIA_LOCATION: &str = "x-inertia-location";

/// Props merged into every page
#[derive(Debug, Clone, Default)]
pub struct SharedProps(pub Map<String, Value>);

impl SharedProps {
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }
}

/// The page object sent to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub component: String,
    pub props: Value,
    pub url: String,
    pub version: String,
}

/// Whether the request was made by the Inertia client
pub fn is_inertia_request(headers: &HeaderMap) -> bool {
    headers
        .get(X_INERTIA)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Path and query of the request as the client sent it
fn request_url(parts_uri: &axum::http::Uri, original: Option<&OriginalUri>) -> String {
    let uri = original.map(|o| &o.0).unwrap_or(parts_uri);
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Per-request handle on the bridge
#[derive(Debug, Clone)]
pub struct Inertia {
    is_inertia: bool,
    url: String,
    version: String,
    entry: String,
    shared: SharedProps,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Inertia {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self {
            is_inertia: is_inertia_request(&parts.headers),
            url: request_url(&parts.uri, parts.extensions.get::<OriginalUri>()),
            version: state.config.inertia.version.clone(),
            entry: state.config.inertia.entry.clone(),
            shared: parts.extensions.get::<SharedProps>().cloned().unwrap_or_default(),
        })
    }
}

impl Inertia {
    /// Builds the page object; page props win over shared props
    ///
    /// # Errors
    ///
    /// Fails when `props` does not serialize to a JSON object.
    pub fn page(&self, component: &str, props: impl Serialize) -> AppResult<Page> {
        let Value::Object(page_props) = serde_json::to_value(props)? else {
            return Err(AppError::InternalError(format!(
                "Props of {component} must serialize to an object"
            )));
        };

        let mut merged = self.shared.0.clone();
        merged.extend(page_props);

        Ok(Page {
            component: component.to_string(),
            props: Value::Object(merged),
            url: self.url.clone(),
            version: self.version.clone(),
        })
    }

    /// Renders a page component
    pub fn render(&self, component: &str, props: impl Serialize) -> AppResult<Response> {
        let page = self.page(component, props)?;

        if self.is_inertia {
            let headers = [(X_INERTIA, "true"), (header::VARY.as_str(), X_INERTIA)];
            return Ok((headers, Json(page)).into_response());
        }

        let shell = html_shell(&page, &self.entry)?;
        Ok(([(header::VARY.as_str(), X_INERTIA)], Html(shell)).into_response())
    }

    /// Sends the client to `url`
    ///
    /// Inertia requests get `409` with `X-Inertia-Location`, which makes the
    /// client visit the url; plain requests get a `303` redirect.
    pub fn location(&self, url: &str) -> Response {
        if self.is_inertia {
            (StatusCode::CONFLICT, [(X_INERTIA_LOCATION, url.to_string())]).into_response()
        } else {
            Redirect::to(url).into_response()
        }
    }
}

/// Escapes text for use inside an HTML attribute
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn html_shell(page: &Page, entry: &str) -> AppResult<String> {
    let data = escape_html(&serde_json::to_string(page)?);
    let entry = escape_html(entry);

    Ok(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>PingCRM</title>\n\
         <script type=\"module\" src=\"{entry}\" defer></script>\n\
         </head>\n\
         <body>\n\
         <div id=\"app\" data-page=\"{data}\"></div>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Forces a full reload when the client runs stale assets
///
/// Applies to Inertia `GET` requests whose `X-Inertia-Version` differs from
/// the configured version; a missing header counts as a mismatch.
pub async fn version_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() == Method::GET && is_inertia_request(req.headers()) {
        let client_version = req
            .headers()
            .get(X_INERTIA_VERSION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if client_version != state.config.inertia.version {
            let url = request_url(req.uri(), req.extensions().get::<OriginalUri>());
            tracing::debug!(
                client_version = %client_version,
                server_version = %state.config.inertia.version,
                "Asset version changed, forcing reload"
            );
            return (StatusCode::CONFLICT, [(X_INERTIA_LOCATION, url)]).into_response();
        }
    }

    next.run(req).await
}
