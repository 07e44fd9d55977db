/// Task model
///
/// A task is a client-authored work request that providers can browse. Only
/// the owning client may mutate or delete a task.
///
/// # State Machine
///
/// ```text
/// open → in_progress → completed
/// open → cancelled
/// in_progress → cancelled
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('open', 'in_progress', 'completed', 'cancelled');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     client_id BIGINT NOT NULL REFERENCES users(id),
///     category_id BIGINT NOT NULL REFERENCES service_categories(id),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     budget DOUBLE PRECISION NOT NULL,
///     location VARCHAR(255),
///     status task_status NOT NULL DEFAULT 'open',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Posted, accepting engagement
    Open,

    /// A provider is working on it
    InProgress,

    /// Work finished
    Completed,

    /// Withdrawn by the client
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Open, TaskStatus::InProgress) => true,
            (TaskStatus::Open, TaskStatus::Cancelled) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Cancelled) => true,
            _ => false,
        }
    }
}

/// A client-posted work request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// Owning client; the only user allowed to mutate or delete
    pub client_id: i64,

    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Client's budget in the platform currency
    pub budget: f64,

    pub location: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task (always enters `open`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub client_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub budget: f64,
    pub location: Option<String>,
}

/// Input for the owner updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub budget: Option<f64>,
    pub location: Option<Option<String>>,
    pub status: Option<TaskStatus>,
}
