/// PostgreSQL store implementation
///
/// Thin sqlx layer over the schema in `migrations/`. The two non-CRUD
/// operations lean on the database for their concurrency guarantees:
///
/// - [`PgStore::review_provider`] uses a conditional `UPDATE ... WHERE
///   approval_status = 'pending'`, so exactly one of two racing admin
///   decisions lands and the other sees `Conflict`.
/// - [`PgStore::create_review`] inserts the review and recomputes the
///   provider's aggregate inside one transaction; the `service_request_id`
///   unique constraint rejects duplicate reviews.
use sqlx::postgres::PgPool;

use super::{Store, StoreBackend, StoreError};
use crate::models::{
    ApprovalStatus, CreateCategory, CreateProvider, CreateReview, CreateServiceRequest,
    CreateSession, CreateTask, CreateUser, ProviderReview, RequestStatus, Review, ServiceCategory,
    ServiceProvider, ServiceRequest, Session, Task, UpdateProvider, UpdateTask, UpdateUser, User,
};

const USER_COLUMNS: &str = "id, email, password_hash, auth_provider, full_name, phone, \
     profile_image_url, email_verified, verification_token, is_admin, is_provider, \
     created_at, updated_at";

const PROVIDER_COLUMNS: &str = "id, user_id, category_id, hourly_rate, bio, approval_status, \
     is_verified, verification_image_url, admin_notes, reviewed_by, reviewed_at, \
     rating, rating_count, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, client_id, category_id, title, description, budget, location, status, \
     created_at, updated_at";

const REQUEST_COLUMNS: &str =
    "id, client_id, provider_id, task_id, message, status, created_at, updated_at";

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    // -- users --

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, auth_provider, full_name, phone,
                               email_verified, verification_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.auth_provider)
        .bind(data.full_name)
        .bind(data.phone)
        .bind(data.email_verified)
        .bind(data.verification_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                StoreError::Conflict("email already registered".to_string())
            }
            _ => StoreError::from(e),
        })?;

        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE verification_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> Result<User, StoreError> {
        // Dynamic update: only bind the fields that are present.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${bind_count}"));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${bind_count}"));
        }
        if data.profile_image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", profile_image_url = ${bind_count}"));
        }
        if data.email_verified.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email_verified = ${bind_count}"));
        }
        if data.verification_token.is_some() {
            bind_count += 1;
            query.push_str(&format!(", verification_token = ${bind_count}"));
        }
        if data.is_admin.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_admin = ${bind_count}"));
        }
        if data.is_provider.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_provider = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(profile_image_url) = data.profile_image_url {
            q = q.bind(profile_image_url);
        }
        if let Some(email_verified) = data.email_verified {
            q = q.bind(email_verified);
        }
        if let Some(verification_token) = data.verification_token {
            q = q.bind(verification_token);
        }
        if let Some(is_admin) = data.is_admin {
            q = q.bind(is_admin);
        }
        if let Some(is_provider) = data.is_provider {
            q = q.bind(is_provider);
        }

        q.fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    // -- categories --

    async fn create_category(
        &self,
        data: CreateCategory,
    ) -> Result<ServiceCategory, StoreError> {
        let category = sqlx::query_as::<_, ServiceCategory>(
            r#"
            INSERT INTO service_categories (name, description, icon)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, icon, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("service_categories_name_key") =>
            {
                StoreError::Conflict("category name exists".to_string())
            }
            _ => StoreError::from(e),
        })?;

        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError> {
        let categories = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name, description, icon, created_at FROM service_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn category_by_id(&self, id: i64) -> Result<Option<ServiceCategory>, StoreError> {
        let category = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name, description, icon, created_at FROM service_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    // -- providers --

    async fn create_provider(
        &self,
        data: CreateProvider,
    ) -> Result<ServiceProvider, StoreError> {
        let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            INSERT INTO service_providers
                (user_id, category_id, hourly_rate, bio, verification_image_url,
                 approval_status, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.hourly_rate)
        .bind(data.bio)
        .bind(data.verification_image_url)
        .bind(data.approval_status)
        .bind(data.is_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("service_providers_user_id_key") =>
            {
                StoreError::Conflict("user already has a provider profile".to_string())
            }
            _ => StoreError::from(e),
        })?;

        Ok(provider)
    }

    async fn provider_by_id(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError> {
        let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    async fn provider_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<ServiceProvider>, StoreError> {
        let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    async fn list_approved_providers(
        &self,
        category_id: Option<i64>,
    ) -> Result<Vec<ServiceProvider>, StoreError> {
        let providers = match category_id {
            Some(category_id) => {
                sqlx::query_as::<_, ServiceProvider>(&format!(
                    r#"
                    SELECT {PROVIDER_COLUMNS} FROM service_providers
                    WHERE approval_status = 'approved' AND category_id = $1
                    ORDER BY id DESC
                    "#
                ))
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ServiceProvider>(&format!(
                    r#"
                    SELECT {PROVIDER_COLUMNS} FROM service_providers
                    WHERE approval_status = 'approved'
                    ORDER BY id DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(providers)
    }

    async fn list_pending_providers(&self) -> Result<Vec<ServiceProvider>, StoreError> {
        let providers = sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            SELECT {PROVIDER_COLUMNS} FROM service_providers
            WHERE approval_status = 'pending'
            ORDER BY id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    async fn update_provider(
        &self,
        id: i64,
        data: UpdateProvider,
    ) -> Result<ServiceProvider, StoreError> {
        let mut query = String::from("UPDATE service_providers SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.category_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_id = ${bind_count}"));
        }
        if data.hourly_rate.is_some() {
            bind_count += 1;
            query.push_str(&format!(", hourly_rate = ${bind_count}"));
        }
        if data.bio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bio = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROVIDER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, ServiceProvider>(&query).bind(id);

        if let Some(category_id) = data.category_id {
            q = q.bind(category_id);
        }
        if let Some(hourly_rate) = data.hourly_rate {
            q = q.bind(hourly_rate);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }

        q.fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn review_provider(
        &self,
        id: i64,
        review: ProviderReview,
    ) -> Result<ServiceProvider, StoreError> {
        // Conditional update: the WHERE clause only matches a pending row, so
        // a second concurrent decision updates nothing and falls through to
        // the conflict check below.
        let approved = review.status == ApprovalStatus::Approved;

        let provider = sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            UPDATE service_providers
            SET approval_status = $2,
                is_verified = $3,
                admin_notes = $4,
                reviewed_by = $5,
                reviewed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND approval_status = 'pending'
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(review.status)
        .bind(approved)
        .bind(review.admin_notes)
        .bind(review.reviewed_by)
        .fetch_optional(&self.pool)
        .await?;

        match provider {
            Some(provider) => Ok(provider),
            None => {
                let existing = self.provider_by_id(id).await?;
                match existing {
                    Some(p) => Err(StoreError::Conflict(format!(
                        "provider is already {}",
                        p.approval_status.as_str()
                    ))),
                    None => Err(StoreError::NotFound),
                }
            }
        }
    }

    // -- tasks --

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (client_id, category_id, title, description, budget, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.client_id)
        .bind(data.category_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.budget)
        .bind(data.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn task_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_open_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE status = 'open' ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn list_tasks_by_client(&self, client_id: i64) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE client_id = $1 ORDER BY id DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> Result<Task, StoreError> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.category_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_id = ${bind_count}"));
        }
        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${bind_count}"));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }
        if data.budget.is_some() {
            bind_count += 1;
            query.push_str(&format!(", budget = ${bind_count}"));
        }
        if data.location.is_some() {
            bind_count += 1;
            query.push_str(&format!(", location = ${bind_count}"));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(category_id) = data.category_id {
            q = q.bind(category_id);
        }
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(budget) = data.budget {
            q = q.bind(budget);
        }
        if let Some(location) = data.location {
            q = q.bind(location);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -- service requests --

    async fn create_service_request(
        &self,
        data: CreateServiceRequest,
    ) -> Result<ServiceRequest, StoreError> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            INSERT INTO service_requests (client_id, provider_id, task_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(data.client_id)
        .bind(data.provider_id)
        .bind(data.task_id)
        .bind(data.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn service_request_by_id(
        &self,
        id: i64,
    ) -> Result<Option<ServiceRequest>, StoreError> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_service_requests_for_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let requests = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE client_id = $1 ORDER BY id DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_service_requests_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let requests = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE provider_id = $1 ORDER BY id DESC"
        ))
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn update_service_request_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ServiceRequest, StoreError> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        request.ok_or(StoreError::NotFound)
    }

    // -- reviews --

    async fn create_review(&self, data: CreateReview) -> Result<Review, StoreError> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (service_request_id, client_id, provider_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_request_id, client_id, provider_id, rating, comment, created_at
            "#,
        )
        .bind(data.service_request_id)
        .bind(data.client_id)
        .bind(data.provider_id)
        .bind(data.rating)
        .bind(data.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("reviews_service_request_id_key") =>
            {
                StoreError::Conflict("service request already reviewed".to_string())
            }
            _ => StoreError::from(e),
        })?;

        // Aggregate from the reviews table inside the same transaction so the
        // stored mean always reflects the review just inserted.
        let result = sqlx::query(
            r#"
            UPDATE service_providers p
            SET rating = ROUND(agg.mean_rating, 1)::double precision,
                rating_count = agg.review_count,
                updated_at = NOW()
            FROM (
                SELECT AVG(rating) AS mean_rating, COUNT(*)::int AS review_count
                FROM reviews
                WHERE provider_id = $1
            ) agg
            WHERE p.id = $1
            "#,
        )
        .bind(data.provider_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        Ok(review)
    }

    async fn list_reviews_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, service_request_id, client_id, provider_id, rating, comment, created_at
            FROM reviews
            WHERE provider_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    // -- sessions --

    async fn create_session(&self, data: CreateSession) -> Result<Session, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, user_id, created_at, expires_at
            "#,
        )
        .bind(data.token)
        .bind(data.user_id)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, token, user_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
