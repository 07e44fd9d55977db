/// Service request endpoints
///
/// A service request is the engagement between a client and a provider.
/// Status transitions are party-scoped: only the provider may answer a
/// pending request (accept or reject); either party may progress, complete,
/// or cancel afterwards.
///
/// # Endpoints
///
/// - `POST /service-requests` - Client engages a provider
/// - `GET  /service-requests` - Own requests; `?role=provider` for the
///   provider side
/// - `PUT  /service-requests/:id` - Status transition
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use findmyhelper_shared::models::{
    ApprovalStatus, CreateServiceRequest, RequestStatus, ServiceRequest,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Service request creation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequestRequest {
    pub provider_id: i64,

    /// Optional task this engagement is for; must belong to the caller
    pub task_id: Option<i64>,

    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: Option<String>,
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequestRequest {
    pub status: RequestStatus,
}

/// Listing side selector
#[derive(Debug, Deserialize)]
pub struct ListServiceRequestsQuery {
    /// `provider` lists requests addressed to the caller's provider profile
    pub role: Option<String>,
}

/// Creates a service request from the caller to a provider
///
/// # Errors
///
/// - `404 Not Found`: unknown provider or task
/// - `422 Unprocessable Entity`: provider is not approved
/// - `403 Forbidden`: task belongs to someone else
pub async fn create_service_request(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateServiceRequestRequest>,
) -> ApiResult<(StatusCode, Json<ServiceRequest>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let provider = state
        .store
        .provider_by_id(req.provider_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))?;

    if provider.approval_status != ApprovalStatus::Approved {
        return Err(ApiError::invalid_field(
            "provider_id",
            "Provider is not accepting requests",
        ));
    }

    if let Some(task_id) = req.task_id {
        let task = state
            .store
            .task_by_id(task_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
        if task.client_id != auth.user_id {
            return Err(ApiError::Forbidden(
                "Task belongs to another client".to_string(),
            ));
        }
    }

    let request = state
        .store
        .create_service_request(CreateServiceRequest {
            client_id: auth.user_id,
            provider_id: req.provider_id,
            task_id: req.task_id,
            message: req.message,
        })
        .await?;

    tracing::info!(
        request_id = request.id,
        client_id = auth.user_id,
        provider_id = req.provider_id,
        "Service request created"
    );
    Ok((StatusCode::CREATED, Json(request)))
}

/// Lists the caller's service requests
pub async fn list_service_requests(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListServiceRequestsQuery>,
) -> ApiResult<Json<Vec<ServiceRequest>>> {
    let requests = match query.role.as_deref() {
        Some("provider") => {
            let provider = state
                .store
                .provider_by_user(auth.user_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Forbidden("Caller has no provider profile".to_string())
                })?;
            state
                .store
                .list_service_requests_for_provider(provider.id)
                .await?
        }
        _ => {
            state
                .store
                .list_service_requests_for_client(auth.user_id)
                .await?
        }
    };
    Ok(Json(requests))
}

/// Applies a status transition to a service request
///
/// # Errors
///
/// - `403 Forbidden`: caller is neither party, or a client attempts a
///   provider-only transition
/// - `409 Conflict`: transition not allowed from the current status
pub async fn update_service_request(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateServiceRequestRequest>,
) -> ApiResult<Json<ServiceRequest>> {
    let request = state
        .store
        .service_request_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service request not found".to_string()))?;

    let is_client = request.client_id == auth.user_id;
    let is_provider = match state.store.provider_by_user(auth.user_id).await? {
        Some(provider) => provider.id == request.provider_id,
        None => false,
    };

    if !is_client && !is_provider {
        return Err(ApiError::Forbidden(
            "Not a party to this service request".to_string(),
        ));
    }

    if RequestStatus::provider_only_transition(req.status) && !is_provider {
        return Err(ApiError::Forbidden(
            "Only the provider may answer a pending request".to_string(),
        ));
    }

    if !request.status.can_transition_to(req.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot move request from {} to {}",
            request.status.as_str(),
            req.status.as_str()
        )));
    }

    let updated = state
        .store
        .update_service_request_status(id, req.status)
        .await?;

    tracing::info!(
        request_id = id,
        status = updated.status.as_str(),
        "Service request transitioned"
    );
    Ok(Json(updated))
}
