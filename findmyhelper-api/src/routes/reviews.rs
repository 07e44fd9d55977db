/// Review endpoints
///
/// A review may only be left by the client of a completed service request,
/// once per request. Creation recomputes the provider's aggregate rating
/// atomically in the store.
///
/// # Endpoints
///
/// - `POST /reviews`
/// - `GET  /providers/:id/reviews` (public)
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use findmyhelper_shared::models::{CreateReview, RequestStatus, Review};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Review creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub service_request_id: i64,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Creates a review for a completed service request
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the request's client
/// - `409 Conflict`: request is not completed, or already reviewed
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let request = state
        .store
        .service_request_by_id(req.service_request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service request not found".to_string()))?;

    if request.client_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the request's client may leave a review".to_string(),
        ));
    }

    if request.status != RequestStatus::Completed {
        return Err(ApiError::Conflict(
            "Only completed service requests can be reviewed".to_string(),
        ));
    }

    let review = state
        .store
        .create_review(CreateReview {
            service_request_id: req.service_request_id,
            client_id: auth.user_id,
            provider_id: request.provider_id,
            rating: req.rating,
            comment: req.comment,
        })
        .await?;

    tracing::info!(
        review_id = review.id,
        provider_id = review.provider_id,
        rating = review.rating,
        "Review created"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

/// Lists a provider's reviews
pub async fn list_provider_reviews(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Json<Vec<Review>>> {
    if state.store.provider_by_id(provider_id).await?.is_none() {
        return Err(ApiError::NotFound("Provider not found".to_string()));
    }

    let reviews = state.store.list_reviews_for_provider(provider_id).await?;
    Ok(Json(reviews))
}
