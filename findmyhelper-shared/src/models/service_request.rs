/// Service request model
///
/// A service request is an engagement linking a client and a provider,
/// optionally tied to a posted task. Status transitions are party-scoped:
/// the provider answers a pending request, either party can progress or cancel
/// an accepted one.
///
/// # State Machine
///
/// ```text
/// pending → accepted     (provider)
/// pending → rejected     (provider)
/// pending → cancelled    (client)
/// accepted → in_progress (either party)
/// accepted → cancelled   (either party)
/// in_progress → completed (either party)
/// in_progress → cancelled (either party)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE request_status AS ENUM (
///     'pending', 'accepted', 'rejected', 'in_progress', 'completed', 'cancelled'
/// );
///
/// CREATE TABLE service_requests (
///     id BIGSERIAL PRIMARY KEY,
///     client_id BIGINT NOT NULL REFERENCES users(id),
///     provider_id BIGINT NOT NULL REFERENCES service_providers(id),
///     task_id BIGINT REFERENCES tasks(id),
///     message TEXT,
///     status request_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting the provider's answer
    Pending,

    /// Provider accepted the engagement
    Accepted,

    /// Provider declined (terminal)
    Rejected,

    /// Work underway
    InProgress,

    /// Work finished; reviews become possible
    Completed,

    /// Abandoned by either party (terminal)
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Completed | RequestStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        match (self, target) {
            (RequestStatus::Pending, RequestStatus::Accepted) => true,
            (RequestStatus::Pending, RequestStatus::Rejected) => true,
            (RequestStatus::Pending, RequestStatus::Cancelled) => true,
            (RequestStatus::Accepted, RequestStatus::InProgress) => true,
            (RequestStatus::Accepted, RequestStatus::Cancelled) => true,
            (RequestStatus::InProgress, RequestStatus::Completed) => true,
            (RequestStatus::InProgress, RequestStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// Whether this transition may only be performed by the provider
    pub fn provider_only_transition(target: RequestStatus) -> bool {
        matches!(target, RequestStatus::Accepted | RequestStatus::Rejected)
    }
}

/// A client→provider engagement
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: i64,
    pub client_id: i64,
    pub provider_id: i64,

    /// Optional task this engagement is for
    pub task_id: Option<i64>,

    /// Client's message to the provider
    pub message: Option<String>,

    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a service request (always enters `pending`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub client_id: i64,
    pub provider_id: i64,
    pub task_id: Option<i64>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Accepted));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn test_terminal_states() {
        for terminal in [
            RequestStatus::Rejected,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(RequestStatus::Pending));
            assert!(!terminal.can_transition_to(RequestStatus::InProgress));
        }
    }

    #[test]
    fn test_provider_only_transitions() {
        assert!(RequestStatus::provider_only_transition(RequestStatus::Accepted));
        assert!(RequestStatus::provider_only_transition(RequestStatus::Rejected));
        assert!(!RequestStatus::provider_only_transition(RequestStatus::Cancelled));
        assert!(!RequestStatus::provider_only_transition(RequestStatus::Completed));
    }
}
