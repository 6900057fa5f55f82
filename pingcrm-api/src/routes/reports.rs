use axum::response::Response;

use super::NoProps;
use crate::{error::AppResult, inertia::Inertia};

/// `GET /reports`
pub async fn index(inertia: Inertia) -> AppResult<Response> {
    inertia.render("Reports/Index", NoProps::default())
}
