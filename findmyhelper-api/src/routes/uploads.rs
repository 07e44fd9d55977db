/// Image upload endpoints
///
/// Multipart uploads go to the configured object store; the endpoints return
/// the resulting public URL. Profile pictures additionally update the user
/// row; identity-verification images are returned for use in the provider
/// registration payload.
///
/// # Endpoints
///
/// - `POST /upload/profile-picture`
/// - `POST /upload/id-verification`
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use findmyhelper_shared::models::UpdateUser;
use serde::Serialize;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Largest accepted image
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Pulls the image part out of a multipart body
async fn read_image(mut multipart: Multipart) -> ApiResult<(String, Bytes)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
        .ok_or_else(|| ApiError::BadRequest("Missing file part".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if !content_type.starts_with("image/") {
        return Err(ApiError::invalid_field("file", "Only image uploads are accepted"));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

    if data.is_empty() {
        return Err(ApiError::invalid_field("file", "Uploaded file is empty"));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::invalid_field("file", "Image exceeds the 5 MB limit"));
    }

    Ok((content_type, data))
}

/// Stores a profile picture and updates the caller's profile
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let (content_type, data) = read_image(multipart).await?;

    let url = state
        .objects
        .put("profiles", &content_type, data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Profile picture upload failed");
            ApiError::ServiceUnavailable("Image storage is unavailable".to_string())
        })?;

    state
        .store
        .update_user(
            auth.user_id,
            UpdateUser {
                profile_image_url: Some(Some(url.clone())),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(UploadResponse { url }))
}

/// Stores an identity-verification image
///
/// The returned URL is meant to be passed as `verification_image_url` when
/// creating a provider profile.
pub async fn upload_id_verification(
    State(state): State<AppState>,
    _auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let (content_type, data) = read_image(multipart).await?;

    let url = state
        .objects
        .put("id-verification", &content_type, data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Verification image upload failed");
            ApiError::ServiceUnavailable("Image storage is unavailable".to_string())
        })?;

    Ok(Json(UploadResponse { url }))
}
