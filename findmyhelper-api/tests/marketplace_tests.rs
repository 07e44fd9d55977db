/// Task, service-request, and review flow tests.
mod common;

use axum::http::StatusCode;
use common::{request, TestContext};
use serde_json::{json, Value};

/// A client, an approved provider, and their session cookies
struct Marketplace {
    ctx: TestContext,
    client_cookie: String,
    provider_cookie: String,
    provider_id: i64,
}

impl Marketplace {
    async fn new() -> Self {
        let ctx = TestContext::new().await;

        ctx.create_verified_user("client@example.com", "sturdy-passw0rd")
            .await;
        let client_cookie = ctx.login("client@example.com", "sturdy-passw0rd").await;

        ctx.create_verified_user("provider@example.com", "sturdy-passw0rd")
            .await;
        let provider_cookie = ctx.login("provider@example.com", "sturdy-passw0rd").await;

        let (status, provider) = ctx
            .send_json(request(
                "POST",
                "/providers",
                Some(&provider_cookie),
                Some(json!({
                    "category_id": ctx.category_id().await,
                    "hourly_rate": 40.0
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        Marketplace {
            client_cookie,
            provider_cookie,
            provider_id: provider["id"].as_i64().unwrap(),
            ctx,
        }
    }

    /// Client engages the provider; returns the request body
    async fn engage(&self) -> Value {
        let (status, body) = self
            .ctx
            .send_json(request(
                "POST",
                "/service-requests",
                Some(&self.client_cookie),
                Some(json!({ "provider_id": self.provider_id, "message": "Please help" })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    /// Applies a status transition as the given party
    async fn transition(&self, request_id: i64, cookie: &str, status: &str) -> (StatusCode, Value) {
        self.ctx
            .send_json(request(
                "PUT",
                &format!("/service-requests/{}", request_id),
                Some(cookie),
                Some(json!({ "status": status })),
            ))
            .await
    }

    /// Drives an engagement from pending all the way to completed
    async fn completed_engagement(&self) -> i64 {
        let engagement = self.engage().await;
        let id = engagement["id"].as_i64().unwrap();
        for status in ["accepted", "in_progress", "completed"] {
            let (code, _) = self.transition(id, &self.provider_cookie, status).await;
            assert_eq!(code, StatusCode::OK, "transition to {}", status);
        }
        id
    }
}

#[tokio::test]
async fn test_task_crud_and_ownership() {
    let m = Marketplace::new().await;
    let category_id = m.ctx.category_id().await;

    let (status, task) = m
        .ctx
        .send_json(request(
            "POST",
            "/tasks",
            Some(&m.client_cookie),
            Some(json!({
                "category_id": category_id,
                "title": "Fix the kitchen sink",
                "budget": 120.0,
                "location": "Springfield"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "open");
    let task_id = task["id"].as_i64().unwrap();

    // Open tasks are browsable by any authenticated user.
    let (_, listing) = m
        .ctx
        .send_json(request("GET", "/tasks", Some(&m.provider_cookie), None))
        .await;
    assert!(listing
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["id"].as_i64() == Some(task_id)));

    // ?mine=true scopes to the caller's own tasks.
    let (_, mine) = m
        .ctx
        .send_json(request("GET", "/tasks?mine=true", Some(&m.provider_cookie), None))
        .await;
    assert!(mine.as_array().unwrap().is_empty());

    // Only the owner may edit.
    let uri = format!("/tasks/{}", task_id);
    let (status, _) = m
        .ctx
        .send_json(request(
            "PUT",
            &uri,
            Some(&m.provider_cookie),
            Some(json!({ "title": "Hijacked" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Skipping in_progress is not a valid transition.
    let (status, _) = m
        .ctx
        .send_json(request(
            "PUT",
            &uri,
            Some(&m.client_cookie),
            Some(json!({ "status": "completed" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = m
        .ctx
        .send_json(request(
            "PUT",
            &uri,
            Some(&m.client_cookie),
            Some(json!({ "status": "in_progress", "budget": 150.0 })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in_progress");
    assert_eq!(updated["budget"].as_f64(), Some(150.0));

    // Delete is owner-only too, then the task is gone.
    let response = m
        .ctx
        .send(request("DELETE", &uri, Some(&m.client_cookie), None))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = m
        .ctx
        .send_json(request("GET", &uri, Some(&m.client_cookie), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_request_lifecycle() {
    let m = Marketplace::new().await;

    let engagement = m.engage().await;
    assert_eq!(engagement["status"], "pending");
    let id = engagement["id"].as_i64().unwrap();

    // Only the provider may answer a pending request.
    let (status, _) = m.transition(id, &m.client_cookie, "accepted").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = m.transition(id, &m.provider_cookie, "accepted").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    // Jumping straight to completed from accepted is invalid.
    let (status, _) = m.transition(id, &m.provider_cookie, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = m.transition(id, &m.provider_cookie, "in_progress").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = m.transition(id, &m.client_cookie, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    // Both sides see the engagement in their listings.
    let (_, client_side) = m
        .ctx
        .send_json(request("GET", "/service-requests", Some(&m.client_cookie), None))
        .await;
    assert_eq!(client_side.as_array().unwrap().len(), 1);

    let (_, provider_side) = m
        .ctx
        .send_json(request(
            "GET",
            "/service-requests?role=provider",
            Some(&m.provider_cookie),
            None,
        ))
        .await;
    assert_eq!(provider_side.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_service_request_outsider_forbidden() {
    let m = Marketplace::new().await;
    let engagement = m.engage().await;
    let id = engagement["id"].as_i64().unwrap();

    m.ctx
        .create_verified_user("outsider@example.com", "sturdy-passw0rd")
        .await;
    let outsider_cookie = m.ctx.login("outsider@example.com", "sturdy-passw0rd").await;

    let (status, _) = m.transition(id, &outsider_cookie, "cancelled").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_request_to_unapproved_provider_rejected() {
    let ctx = TestContext::new().await;

    ctx.create_verified_user("pending-provider@example.com", "sturdy-passw0rd")
        .await;
    let provider_cookie = ctx
        .login("pending-provider@example.com", "sturdy-passw0rd")
        .await;
    let (_, provider) = ctx
        .send_json(request(
            "POST",
            "/providers",
            Some(&provider_cookie),
            Some(json!({
                "category_id": ctx.category_id().await,
                "hourly_rate": 30.0,
                "verification_image_url": "http://localhost:8080/uploads/id.jpg"
            })),
        ))
        .await;

    ctx.create_verified_user("client@example.com", "sturdy-passw0rd")
        .await;
    let client_cookie = ctx.login("client@example.com", "sturdy-passw0rd").await;

    let (status, body) = ctx
        .send_json(request(
            "POST",
            "/service-requests",
            Some(&client_cookie),
            Some(json!({ "provider_id": provider["id"] })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "provider_id");
}

#[tokio::test]
async fn test_review_updates_provider_rating() {
    let m = Marketplace::new().await;
    let request_id = m.completed_engagement().await;

    let (status, review) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({
                "service_request_id": request_id,
                "rating": 5,
                "comment": "Spotless work"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["rating"].as_i64(), Some(5));

    let (_, provider) = m
        .ctx
        .send_json(request(
            "GET",
            &format!("/providers/{}", m.provider_id),
            None,
            None,
        ))
        .await;
    assert_eq!(provider["rating"].as_f64(), Some(5.0));
    assert_eq!(provider["rating_count"].as_i64(), Some(1));

    // A second completed engagement pulls the mean down, one decimal place.
    let second = m.completed_engagement().await;
    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({ "service_request_id": second, "rating": 4 })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, provider) = m
        .ctx
        .send_json(request(
            "GET",
            &format!("/providers/{}", m.provider_id),
            None,
            None,
        ))
        .await;
    assert_eq!(provider["rating"].as_f64(), Some(4.5));
    assert_eq!(provider["rating_count"].as_i64(), Some(2));

    // Public review listing shows both.
    let (status, reviews) = m
        .ctx
        .send_json(request(
            "GET",
            &format!("/providers/{}/reviews", m.provider_id),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_review_rules() {
    let m = Marketplace::new().await;
    let request_id = m.completed_engagement().await;

    // Rating outside 1..=5 fails validation.
    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({ "service_request_id": request_id, "rating": 6 })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Only the client of the engagement may review it.
    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.provider_cookie),
            Some(json!({ "service_request_id": request_id, "rating": 5 })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // One review per engagement.
    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({ "service_request_id": request_id, "rating": 4 })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({ "service_request_id": request_id, "rating": 2 })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Pending engagements cannot be reviewed.
    let pending = m.engage().await;
    let (status, _) = m
        .ctx
        .send_json(request(
            "POST",
            "/reviews",
            Some(&m.client_cookie),
            Some(json!({ "service_request_id": pending["id"], "rating": 5 })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
