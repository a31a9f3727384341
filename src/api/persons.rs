//! Person endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::Person;
use crate::AppState;

/// GET /api/v1/admin/person
pub async fn get_default_person(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Person>, ApiError> {
    let person = state
        .persons
        .get_default_person()
        .await?
        .ok_or_else(|| ApiError::not_found("person not found"))?;
    Ok(Json(person))
}
