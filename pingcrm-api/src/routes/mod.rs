/// Route handlers
///
/// - `health`: health check endpoint
/// - `auth`: login and logout
/// - `dashboard`, `reports`: static pages
/// - `organizations`, `contacts`, `users`: the resource pages
/// - `forms`: request parsing shared by the resource handlers

pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod organizations;
pub mod reports;
pub mod users;

use serde::Serialize;

use crate::error::{AppError, FieldErrors};

/// Page props of a form re-rendered after failed validation
#[derive(Debug, Serialize)]
pub struct WithErrors<P> {
    #[serde(flatten)]
    pub props: P,
    pub errors: FieldErrors,
}

impl<P> WithErrors<P> {
    pub fn new(props: P, errors: FieldErrors) -> Self {
        Self { props, errors }
    }
}

/// Props of a page that needs none of its own
#[derive(Debug, Default, Serialize)]
pub struct NoProps {}

pub(crate) fn not_found(resource: &str) -> AppError {
    AppError::NotFound(format!("{resource} not found"))
}
