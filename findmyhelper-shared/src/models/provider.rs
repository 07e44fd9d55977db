/// Service provider model and approval state machine
///
/// A provider is a one-to-one extension of a user offering paid services. The
/// only structured mutation after creation is the approval transition, which
/// an admin performs at most once:
///
/// ```text
/// pending → approved
/// pending → rejected
/// ```
///
/// Both outcomes are terminal; a rejected provider cannot resubmit.
///
/// Providers created without an identity-verification image skip review
/// entirely and enter the store already `approved` and verified.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE approval_status AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE service_providers (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL UNIQUE REFERENCES users(id),
///     category_id BIGINT NOT NULL REFERENCES service_categories(id),
///     hourly_rate DOUBLE PRECISION NOT NULL,
///     bio TEXT,
///     approval_status approval_status NOT NULL DEFAULT 'pending',
///     is_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     verification_image_url VARCHAR(512),
///     admin_notes TEXT,
///     reviewed_by BIGINT REFERENCES users(id),
///     reviewed_at TIMESTAMPTZ,
///     rating DOUBLE PRECISION NOT NULL DEFAULT 0,
///     rating_count INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a provider application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting admin review
    Pending,

    /// Admin approved the application (terminal)
    Approved,

    /// Admin rejected the application (terminal)
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected are terminal; only pending may transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Rejected)
    }

    pub fn can_transition_to(&self, target: ApprovalStatus) -> bool {
        matches!(
            (self, target),
            (ApprovalStatus::Pending, ApprovalStatus::Approved)
                | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
        )
    }
}

/// Service provider profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceProvider {
    pub id: i64,

    /// Owning user (unique, at most one provider profile per user)
    pub user_id: i64,

    /// Offered service category
    pub category_id: i64,

    /// Hourly rate in the platform currency
    pub hourly_rate: f64,

    pub bio: Option<String>,

    /// Application lifecycle state
    pub approval_status: ApprovalStatus,

    /// Identity verified, either by admin approval or by the no-image shortcut
    pub is_verified: bool,

    /// Identity-verification image (object storage); None triggers auto-approval
    pub verification_image_url: Option<String>,

    /// Reviewer notes; required on rejection
    pub admin_notes: Option<String>,

    /// Admin user who reviewed the application
    pub reviewed_by: Option<i64>,

    /// When the application was reviewed
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Mean review rating, rounded to one decimal place
    pub rating: f64,

    /// Number of reviews behind `rating`
    pub rating_count: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a provider profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProvider {
    pub user_id: i64,
    pub category_id: i64,
    pub hourly_rate: f64,
    pub bio: Option<String>,
    pub verification_image_url: Option<String>,

    /// Initial status; the route layer applies the auto-approval shortcut
    pub approval_status: ApprovalStatus,

    /// Initial verified flag, true only for auto-approved profiles
    pub is_verified: bool,
}

/// Input for a provider editing their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProvider {
    pub category_id: Option<i64>,
    pub hourly_rate: Option<f64>,
    pub bio: Option<Option<String>>,
}

/// An admin's decision on a pending application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReview {
    /// Approved or Rejected (never Pending)
    pub status: ApprovalStatus,

    /// Required non-empty for rejections, optional for approvals
    pub admin_notes: Option<String>,

    /// Admin user performing the review
    pub reviewed_by: i64,
}
