/// Admin review endpoints
///
/// Admins work through the pending queue and decide each application exactly
/// once. The decision stamps the reviewing admin and fires an outcome email
/// to the applicant.
///
/// # Endpoints
///
/// - `GET  /admin/pending-providers`
/// - `POST /admin/providers/:id/approve` - notes optional
/// - `POST /admin/providers/:id/reject` - non-empty notes required
use axum::{
    extract::{Path, State},
    Json,
};
use findmyhelper_shared::models::{ApprovalStatus, ProviderReview, ServiceProvider};
use serde::Deserialize;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AdminContext,
};

/// Approval request body (optional)
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub notes: Option<String>,
}

/// Rejection request body
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub notes: String,
}

/// Lists applications awaiting review
pub async fn pending_providers(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> ApiResult<Json<Vec<ServiceProvider>>> {
    let providers = state.store.list_pending_providers().await?;
    Ok(Json(providers))
}

/// Approves a pending application
///
/// # Errors
///
/// - `404 Not Found`: unknown provider
/// - `409 Conflict`: application already decided
pub async fn approve_provider(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(id): Path<i64>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<Json<ServiceProvider>> {
    let notes = body
        .map(|Json(req)| req.notes)
        .unwrap_or_default()
        .filter(|n| !n.trim().is_empty());

    let provider = state
        .store
        .review_provider(
            id,
            ProviderReview {
                status: ApprovalStatus::Approved,
                admin_notes: notes,
                reviewed_by: admin.0.user_id,
            },
        )
        .await?;

    if let Some(user) = state.store.user_by_id(provider.user_id).await? {
        state.notifier.send_approval(&user).await;
    }

    tracing::info!(
        provider_id = id,
        reviewed_by = admin.0.user_id,
        "Provider application approved"
    );
    Ok(Json(provider))
}

/// Rejects a pending application
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing or empty notes
/// - `404 Not Found`: unknown provider
/// - `409 Conflict`: application already decided
pub async fn reject_provider(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> ApiResult<Json<ServiceProvider>> {
    let notes = req.notes.trim();
    if notes.is_empty() {
        return Err(ApiError::invalid_field(
            "notes",
            "Rejection requires an explanation for the applicant",
        ));
    }

    let provider = state
        .store
        .review_provider(
            id,
            ProviderReview {
                status: ApprovalStatus::Rejected,
                admin_notes: Some(notes.to_string()),
                reviewed_by: admin.0.user_id,
            },
        )
        .await?;

    if let Some(user) = state.store.user_by_id(provider.user_id).await? {
        state.notifier.send_rejection(&user, notes).await;
    }

    tracing::info!(
        provider_id = id,
        reviewed_by = admin.0.user_id,
        "Provider application rejected"
    );
    Ok(Json(provider))
}
