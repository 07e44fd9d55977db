/// Service provider endpoints
///
/// Providers created with an identity-verification image enter the approval
/// queue as `pending` and trigger an admin alert. Providers created without
/// one skip review and come back already approved and verified.
///
/// # Endpoints
///
/// - `GET  /providers?category_id=` - Approved providers (public)
/// - `GET  /providers/:id` - Single provider (public)
/// - `POST /providers` - Create own provider profile (one per user)
/// - `PUT  /providers/:id` - Owner-only profile edits
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use findmyhelper_shared::models::{
    ApprovalStatus, CreateProvider, ServiceProvider, UpdateProvider, UpdateUser,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Provider listing filter
#[derive(Debug, Deserialize)]
pub struct ListProvidersQuery {
    pub category_id: Option<i64>,
}

/// Provider creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProviderRequest {
    pub category_id: i64,

    #[validate(range(min = 0.0, message = "Hourly rate must not be negative"))]
    pub hourly_rate: f64,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    /// Identity-verification image URL from `POST /upload/id-verification`.
    /// Omitting it skips admin review entirely.
    pub verification_image_url: Option<String>,
}

/// Provider update request (owner only)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProviderRequest {
    pub category_id: Option<i64>,

    #[validate(range(min = 0.0, message = "Hourly rate must not be negative"))]
    pub hourly_rate: Option<f64>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,
}

/// Lists approved providers, optionally filtered by category
pub async fn list_providers(
    State(state): State<AppState>,
    Query(query): Query<ListProvidersQuery>,
) -> ApiResult<Json<Vec<ServiceProvider>>> {
    let providers = state
        .store
        .list_approved_providers(query.category_id)
        .await?;
    Ok(Json(providers))
}

/// Fetches a single provider
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ServiceProvider>> {
    let provider = state
        .store
        .provider_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;
    Ok(Json(provider))
}

/// Creates the caller's provider profile
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed or unknown category
/// - `409 Conflict`: the user already has a provider profile
pub async fn create_provider(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateProviderRequest>,
) -> ApiResult<(StatusCode, Json<ServiceProvider>)> {
    req.validate().map_err(ApiError::from_validation)?;

    if state.store.category_by_id(req.category_id).await?.is_none() {
        return Err(ApiError::invalid_field("category_id", "Unknown category"));
    }

    // No verification image means nothing for an admin to check: the profile
    // goes live immediately.
    let (approval_status, is_verified) = match req.verification_image_url {
        Some(_) => (ApprovalStatus::Pending, false),
        None => (ApprovalStatus::Approved, true),
    };

    let provider = state
        .store
        .create_provider(CreateProvider {
            user_id: auth.user_id,
            category_id: req.category_id,
            hourly_rate: req.hourly_rate,
            bio: req.bio,
            verification_image_url: req.verification_image_url,
            approval_status,
            is_verified,
        })
        .await?;

    let user = state
        .store
        .update_user(
            auth.user_id,
            UpdateUser {
                is_provider: Some(true),
                ..Default::default()
            },
        )
        .await?;

    if provider.approval_status == ApprovalStatus::Pending {
        state
            .notifier
            .send_new_application_alert(&user, &provider)
            .await;
    }

    tracing::info!(
        provider_id = provider.id,
        user_id = auth.user_id,
        status = provider.approval_status.as_str(),
        "Provider profile created"
    );
    Ok((StatusCode::CREATED, Json(provider)))
}

/// Updates a provider profile (owner only)
///
/// Approval fields are not reachable from here; only the admin endpoints
/// touch them.
pub async fn update_provider(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProviderRequest>,
) -> ApiResult<Json<ServiceProvider>> {
    req.validate().map_err(ApiError::from_validation)?;

    let provider = state
        .store
        .provider_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;

    if provider.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the profile owner may edit it".to_string(),
        ));
    }

    if let Some(category_id) = req.category_id {
        if state.store.category_by_id(category_id).await?.is_none() {
            return Err(ApiError::invalid_field("category_id", "Unknown category"));
        }
    }

    let updated = state
        .store
        .update_provider(
            id,
            UpdateProvider {
                category_id: req.category_id,
                hourly_rate: req.hourly_rate,
                bio: req.bio.map(Some),
            },
        )
        .await?;

    Ok(Json(updated))
}
