/// Dashboard page
///
/// `GET /` renders `Dashboard/Index`; it carries only the shared props.

use axum::response::Response;

use super::NoProps;
use crate::{error::AppResult, inertia::Inertia};

pub async fn index(inertia: Inertia) -> AppResult<Response> {
    inertia.render("Dashboard/Index", NoProps::default())
}
