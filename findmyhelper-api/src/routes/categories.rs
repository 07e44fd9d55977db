/// Service category endpoints
use axum::{extract::State, Json};
use findmyhelper_shared::models::ServiceCategory;

use crate::{app::AppState, error::ApiResult};

/// Lists the category taxonomy
///
/// # Endpoint
///
/// ```text
/// GET /categories
/// ```
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ServiceCategory>>> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories))
}
