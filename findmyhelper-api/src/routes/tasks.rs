/// Task endpoints
///
/// Tasks are client-posted work requests. Only the owning client may mutate
/// or delete one; everyone authenticated can browse open tasks.
///
/// # Endpoints
///
/// - `POST   /tasks` - Create a task (enters `open`)
/// - `GET    /tasks` - Open tasks, or own tasks with `?mine=true`
/// - `GET    /tasks/:id`
/// - `PUT    /tasks/:id` - Owner only
/// - `DELETE /tasks/:id` - Owner only
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use findmyhelper_shared::models::{CreateTask, Task, TaskStatus, UpdateTask};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub category_id: i64,

    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Budget must not be negative"))]
    pub budget: f64,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,
}

/// Task update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub category_id: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Budget must not be negative"))]
    pub budget: Option<f64>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    pub status: Option<TaskStatus>,
}

/// Task listing filter
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// `true` lists the caller's own tasks instead of open ones
    #[serde(default)]
    pub mine: bool,
}

/// Creates a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(ApiError::from_validation)?;

    if state.store.category_by_id(req.category_id).await?.is_none() {
        return Err(ApiError::invalid_field("category_id", "Unknown category"));
    }

    let task = state
        .store
        .create_task(CreateTask {
            client_id: auth.user_id,
            category_id: req.category_id,
            title: req.title,
            description: req.description,
            budget: req.budget,
            location: req.location,
        })
        .await?;

    tracing::info!(task_id = task.id, client_id = auth.user_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists open tasks, or the caller's own with `?mine=true`
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = if query.mine {
        state.store.list_tasks_by_client(auth.user_id).await?
    } else {
        state.store.list_open_tasks().await?
    };
    Ok(Json(tasks))
}

/// Fetches a single task
pub async fn get_task(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(Json(task))
}

/// Updates a task (owner only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the owning client
/// - `409 Conflict`: invalid status transition
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from_validation)?;

    let task = fetch_owned_task(&state, &auth, id).await?;

    if let Some(status) = req.status {
        if !task.status.can_transition_to(status) {
            return Err(ApiError::Conflict(format!(
                "Cannot move task from {} to {}",
                task.status.as_str(),
                status.as_str()
            )));
        }
    }

    if let Some(category_id) = req.category_id {
        if state.store.category_by_id(category_id).await?.is_none() {
            return Err(ApiError::invalid_field("category_id", "Unknown category"));
        }
    }

    let updated = state
        .store
        .update_task(
            id,
            UpdateTask {
                category_id: req.category_id,
                title: req.title,
                description: req.description.map(Some),
                budget: req.budget,
                location: req.location.map(Some),
                status: req.status,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// Deletes a task (owner only)
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    fetch_owned_task(&state, &auth, id).await?;

    state.store.delete_task(id).await?;
    tracing::info!(task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_owned_task(state: &AppState, auth: &AuthContext, id: i64) -> ApiResult<Task> {
    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.client_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the task owner may modify it".to_string(),
        ));
    }

    Ok(task)
}
