use axum::response::Redirect;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{error::ApiError, repository::Repository};

pub mod auth;
pub mod care;
pub mod dashboard;
pub mod visits;

/// health
///
/// [Public Route] Liveness probe.
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Alive", body = String)))]
pub async fn health() -> &'static str {
    "ok"
}

/// Local calendar date used for "today" on dashboards.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 303 back to a form page carrying a message in the query string.
pub(crate) fn redirect_with(page: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?{}={}", page, key, urlencoding::encode(message)))
}

pub(crate) async fn require_animal(repo: &dyn Repository, id: Uuid) -> Result<(), ApiError> {
    match repo.get_animal(id).await {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("animal")),
    }
}
