/// Storage abstraction
///
/// A uniform interface over the six marketplace entities plus sessions, with
/// two interchangeable implementations:
///
/// - [`postgres::PgStore`]: sqlx over PostgreSQL (production)
/// - [`memory::MemoryStore`]: maps keyed by synthetic incrementing ids
///   (development and tests; volatile by design)
///
/// Backend selection is explicit configuration, never a silent runtime
/// fallback: `postgres` fails startup when the database is unreachable, and
/// `memory` logs a warning that nothing survives a restart.
///
/// Two operations are more than plain CRUD because they must hold under
/// concurrent requests:
///
/// - [`Store::review_provider`] applies the pending→approved/rejected
///   transition at most once (conditional update in Postgres, single write
///   lock in memory) and returns `Conflict` afterwards.
/// - [`Store::create_review`] inserts the review and recomputes the provider's
///   aggregate rating atomically, so concurrent reviews cannot race the mean.
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{
    CreateCategory, CreateProvider, CreateReview, CreateServiceRequest, CreateSession, CreateTask,
    CreateUser, ProviderReview, RequestStatus, Review, ServiceCategory, ServiceProvider,
    ServiceRequest, Session, Task, UpdateProvider, UpdateTask, UpdateUser, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which backend a store handle talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Error type shared by both store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced row does not exist
    #[error("not found")]
    NotFound,

    /// A uniqueness or state constraint was violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend is unreachable
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return StoreError::Conflict(format!("constraint violation: {}", constraint));
                }
                StoreError::Backend(db_err.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Uniform persistence interface over all entities plus sessions
#[async_trait]
pub trait Store: Send + Sync {
    /// Which backend this store talks to (surfaced by /health)
    fn backend(&self) -> StoreBackend;

    // -- users --

    /// Creates a user; `Conflict` if the email is already registered
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Email lookup, case-insensitive (emails are stored lowercase)
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_verification_token(&self, token: &str)
        -> Result<Option<User>, StoreError>;

    /// Applies non-None fields; `NotFound` if the user does not exist
    async fn update_user(&self, id: i64, data: UpdateUser) -> Result<User, StoreError>;

    // -- categories --

    async fn create_category(&self, data: CreateCategory)
        -> Result<ServiceCategory, StoreError>;
    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError>;
    async fn category_by_id(&self, id: i64) -> Result<Option<ServiceCategory>, StoreError>;

    // -- providers --

    /// Creates a provider profile; `Conflict` if the user already has one
    async fn create_provider(&self, data: CreateProvider)
        -> Result<ServiceProvider, StoreError>;
    async fn provider_by_id(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError>;
    async fn provider_by_user(&self, user_id: i64)
        -> Result<Option<ServiceProvider>, StoreError>;

    /// Approved providers only, optionally filtered by category
    async fn list_approved_providers(
        &self,
        category_id: Option<i64>,
    ) -> Result<Vec<ServiceProvider>, StoreError>;
    async fn list_pending_providers(&self) -> Result<Vec<ServiceProvider>, StoreError>;

    /// Owner profile edits; never touches approval fields
    async fn update_provider(
        &self,
        id: i64,
        data: UpdateProvider,
    ) -> Result<ServiceProvider, StoreError>;

    /// Applies an admin decision to a pending provider
    ///
    /// At-most-once: returns `Conflict` when the provider is no longer
    /// pending, `NotFound` when it does not exist. Stamps `reviewed_by` and
    /// `reviewed_at`, and marks approved providers verified.
    async fn review_provider(
        &self,
        id: i64,
        review: ProviderReview,
    ) -> Result<ServiceProvider, StoreError>;

    // -- tasks --

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError>;
    async fn task_by_id(&self, id: i64) -> Result<Option<Task>, StoreError>;
    async fn list_open_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn list_tasks_by_client(&self, client_id: i64) -> Result<Vec<Task>, StoreError>;
    async fn update_task(&self, id: i64, data: UpdateTask) -> Result<Task, StoreError>;

    /// Returns true when a row was deleted
    async fn delete_task(&self, id: i64) -> Result<bool, StoreError>;

    // -- service requests --

    async fn create_service_request(
        &self,
        data: CreateServiceRequest,
    ) -> Result<ServiceRequest, StoreError>;
    async fn service_request_by_id(&self, id: i64)
        -> Result<Option<ServiceRequest>, StoreError>;
    async fn list_service_requests_for_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError>;
    async fn list_service_requests_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError>;

    /// Sets the status; transition validity is the route layer's concern
    async fn update_service_request_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ServiceRequest, StoreError>;

    // -- reviews --

    /// Inserts a review and recomputes the provider's aggregate rating in one
    /// atomic step
    ///
    /// `Conflict` if the service request already has a review, or if the
    /// review references an unknown service request or provider (the
    /// foreign-key mapping both backends share).
    async fn create_review(&self, data: CreateReview) -> Result<Review, StoreError>;
    async fn list_reviews_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<Review>, StoreError>;

    // -- sessions --

    async fn create_session(&self, data: CreateSession) -> Result<Session, StoreError>;
    async fn session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// Returns true when a session was deleted
    async fn delete_session(&self, token: &str) -> Result<bool, StoreError>;
}

/// Seeds the default category taxonomy when the store has none
///
/// Idempotent: a store that already has categories is left untouched.
pub async fn ensure_default_categories(store: &dyn Store) -> Result<usize, StoreError> {
    let existing = store.list_categories().await?;
    if !existing.is_empty() {
        return Ok(0);
    }

    let defaults = crate::models::default_categories();
    let count = defaults.len();
    for category in defaults {
        store.create_category(category).await?;
    }

    tracing::info!(count, "Seeded default service categories");
    Ok(count)
}
