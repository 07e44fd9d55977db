/// Own-profile endpoints
///
/// # Endpoints
///
/// - `GET /user` - The authenticated user's profile
/// - `PUT /user` - Update display name and phone; email and role flags are
///   not editable here
use axum::{extract::State, Json};
use findmyhelper_shared::models::{UpdateUser, User};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
}

/// Returns the authenticated user's profile
pub async fn get_me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    let user = state
        .store
        .user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates the authenticated user's profile
///
/// Only supplied fields change; omitted fields keep their value.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = state
        .store
        .update_user(
            auth.user_id,
            UpdateUser {
                full_name: req.full_name.map(Some),
                phone: req.phone.map(Some),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(user))
}
