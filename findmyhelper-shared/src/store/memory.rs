/// In-memory store implementation
///
/// Maps keyed by synthetic incrementing ids behind a single async RwLock.
/// Multi-step mutations (approval transitions, review + rating recompute) run
/// under one write-lock acquisition, which gives them the same atomicity the
/// Postgres implementation gets from transactions.
///
/// This backend is volatile: every restart loses all data. It exists for
/// development and tests, and selecting it logs a warning at startup.
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreBackend, StoreError};
use crate::models::{
    round_rating, ApprovalStatus, CreateCategory, CreateProvider, CreateReview,
    CreateServiceRequest, CreateSession, CreateTask, CreateUser, ProviderReview, RequestStatus,
    Review, ServiceCategory, ServiceProvider, ServiceRequest, Session, Task, TaskStatus,
    UpdateProvider, UpdateTask, UpdateUser, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    categories: HashMap<i64, ServiceCategory>,
    providers: HashMap<i64, ServiceProvider>,
    tasks: HashMap<i64, Task>,
    service_requests: HashMap<i64, ServiceRequest>,
    reviews: HashMap<i64, Review>,
    sessions: HashMap<i64, Session>,
    next_id: HashMap<&'static str, i64>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.next_id.entry(table).or_insert(0);
        *id += 1;
        *id
    }
}

/// Volatile store backed by in-process maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    // -- users --

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let id = tables.next_id("users");
        let user = User {
            id,
            email: data.email,
            password_hash: data.password_hash,
            auth_provider: data.auth_provider,
            full_name: data.full_name,
            phone: data.phone,
            profile_image_url: None,
            email_verified: data.email_verified,
            verification_token: data.verification_token,
            is_admin: false,
            is_provider: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn user_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(full_name) = data.full_name {
            user.full_name = full_name;
        }
        if let Some(phone) = data.phone {
            user.phone = phone;
        }
        if let Some(profile_image_url) = data.profile_image_url {
            user.profile_image_url = profile_image_url;
        }
        if let Some(email_verified) = data.email_verified {
            user.email_verified = email_verified;
        }
        if let Some(verification_token) = data.verification_token {
            user.verification_token = verification_token;
        }
        if let Some(is_admin) = data.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(is_provider) = data.is_provider {
            user.is_provider = is_provider;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    // -- categories --

    async fn create_category(
        &self,
        data: CreateCategory,
    ) -> Result<ServiceCategory, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.categories.values().any(|c| c.name == data.name) {
            return Err(StoreError::Conflict("category name exists".to_string()));
        }

        let id = tables.next_id("service_categories");
        let category = ServiceCategory {
            id,
            name: data.name,
            description: data.description,
            icon: data.icon,
            created_at: Utc::now(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, StoreError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<_> = tables.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn category_by_id(&self, id: i64) -> Result<Option<ServiceCategory>, StoreError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    // -- providers --

    async fn create_provider(
        &self,
        data: CreateProvider,
    ) -> Result<ServiceProvider, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .providers
            .values()
            .any(|p| p.user_id == data.user_id)
        {
            return Err(StoreError::Conflict(
                "user already has a provider profile".to_string(),
            ));
        }

        let now = Utc::now();
        let id = tables.next_id("service_providers");
        let provider = ServiceProvider {
            id,
            user_id: data.user_id,
            category_id: data.category_id,
            hourly_rate: data.hourly_rate,
            bio: data.bio,
            approval_status: data.approval_status,
            is_verified: data.is_verified,
            verification_image_url: data.verification_image_url,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            rating: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.providers.insert(id, provider.clone());
        Ok(provider)
    }

    async fn provider_by_id(&self, id: i64) -> Result<Option<ServiceProvider>, StoreError> {
        Ok(self.tables.read().await.providers.get(&id).cloned())
    }

    async fn provider_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<ServiceProvider>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .providers
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list_approved_providers(
        &self,
        category_id: Option<i64>,
    ) -> Result<Vec<ServiceProvider>, StoreError> {
        let tables = self.tables.read().await;
        let mut providers: Vec<_> = tables
            .providers
            .values()
            .filter(|p| p.approval_status == ApprovalStatus::Approved)
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .cloned()
            .collect();
        providers.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(providers)
    }

    async fn list_pending_providers(&self) -> Result<Vec<ServiceProvider>, StoreError> {
        let tables = self.tables.read().await;
        let mut providers: Vec<_> = tables
            .providers
            .values()
            .filter(|p| p.approval_status == ApprovalStatus::Pending)
            .cloned()
            .collect();
        providers.sort_by_key(|p| p.id);
        Ok(providers)
    }

    async fn update_provider(
        &self,
        id: i64,
        data: UpdateProvider,
    ) -> Result<ServiceProvider, StoreError> {
        let mut tables = self.tables.write().await;
        let provider = tables.providers.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(category_id) = data.category_id {
            provider.category_id = category_id;
        }
        if let Some(hourly_rate) = data.hourly_rate {
            provider.hourly_rate = hourly_rate;
        }
        if let Some(bio) = data.bio {
            provider.bio = bio;
        }
        provider.updated_at = Utc::now();

        Ok(provider.clone())
    }

    async fn review_provider(
        &self,
        id: i64,
        review: ProviderReview,
    ) -> Result<ServiceProvider, StoreError> {
        let mut tables = self.tables.write().await;
        let provider = tables.providers.get_mut(&id).ok_or(StoreError::NotFound)?;

        if !provider.approval_status.can_transition_to(review.status) {
            return Err(StoreError::Conflict(format!(
                "provider is already {}",
                provider.approval_status.as_str()
            )));
        }

        provider.approval_status = review.status;
        provider.is_verified = review.status == ApprovalStatus::Approved;
        provider.admin_notes = review.admin_notes;
        provider.reviewed_by = Some(review.reviewed_by);
        provider.reviewed_at = Some(Utc::now());
        provider.updated_at = Utc::now();

        Ok(provider.clone())
    }

    // -- tasks --

    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let id = tables.next_id("tasks");
        let task = Task {
            id,
            client_id: data.client_id,
            category_id: data.category_id,
            title: data.title,
            description: data.description,
            budget: data.budget,
            location: data.location,
            status: TaskStatus::Open,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn task_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list_open_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<_> = tables
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Open)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tasks)
    }

    async fn list_tasks_by_client(&self, client_id: i64) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<_> = tables
            .tasks
            .values()
            .filter(|t| t.client_id == client_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tasks)
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = tables.tasks.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(category_id) = data.category_id {
            task.category_id = category_id;
        }
        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(budget) = data.budget {
            task.budget = budget;
        }
        if let Some(location) = data.location {
            task.location = location;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }

    // -- service requests --

    async fn create_service_request(
        &self,
        data: CreateServiceRequest,
    ) -> Result<ServiceRequest, StoreError> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let id = tables.next_id("service_requests");
        let request = ServiceRequest {
            id,
            client_id: data.client_id,
            provider_id: data.provider_id,
            task_id: data.task_id,
            message: data.message,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.service_requests.insert(id, request.clone());
        Ok(request)
    }

    async fn service_request_by_id(
        &self,
        id: i64,
    ) -> Result<Option<ServiceRequest>, StoreError> {
        Ok(self.tables.read().await.service_requests.get(&id).cloned())
    }

    async fn list_service_requests_for_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<_> = tables
            .service_requests
            .values()
            .filter(|r| r.client_id == client_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    async fn list_service_requests_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<_> = tables
            .service_requests
            .values()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    async fn update_service_request_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ServiceRequest, StoreError> {
        let mut tables = self.tables.write().await;
        let request = tables
            .service_requests
            .get_mut(&id)
            .ok_or(StoreError::NotFound)?;

        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    // -- reviews --

    async fn create_review(&self, data: CreateReview) -> Result<Review, StoreError> {
        // Insert and rating recompute under one write lock so concurrent
        // reviews cannot race the aggregate.
        let mut tables = self.tables.write().await;

        if tables
            .reviews
            .values()
            .any(|r| r.service_request_id == data.service_request_id)
        {
            return Err(StoreError::Conflict(
                "service request already reviewed".to_string(),
            ));
        }
        // Dangling references map to Conflict, matching the foreign-key
        // constraint mapping of the Postgres backend.
        if !tables
            .service_requests
            .contains_key(&data.service_request_id)
        {
            return Err(StoreError::Conflict(
                "review references an unknown service request".to_string(),
            ));
        }
        if !tables.providers.contains_key(&data.provider_id) {
            return Err(StoreError::Conflict(
                "review references an unknown provider".to_string(),
            ));
        }

        let id = tables.next_id("reviews");
        let review = Review {
            id,
            service_request_id: data.service_request_id,
            client_id: data.client_id,
            provider_id: data.provider_id,
            rating: data.rating,
            comment: data.comment,
            created_at: Utc::now(),
        };
        tables.reviews.insert(id, review.clone());

        let (sum, count) = tables
            .reviews
            .values()
            .filter(|r| r.provider_id == data.provider_id)
            .fold((0i64, 0i64), |(sum, count), r| {
                (sum + r.rating as i64, count + 1)
            });

        let provider = tables
            .providers
            .get_mut(&data.provider_id)
            .ok_or(StoreError::NotFound)?;
        provider.rating = round_rating(sum as f64 / count as f64);
        provider.rating_count = count as i32;
        provider.updated_at = Utc::now();

        Ok(review)
    }

    async fn list_reviews_for_provider(
        &self,
        provider_id: i64,
    ) -> Result<Vec<Review>, StoreError> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<_> = tables
            .reviews
            .values()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(reviews)
    }

    // -- sessions --

    async fn create_session(&self, data: CreateSession) -> Result<Session, StoreError> {
        let mut tables = self.tables.write().await;

        let id = tables.next_id("sessions");
        let session = Session {
            id,
            token: data.token,
            user_id: data.user_id,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables
            .sessions
            .values()
            .find(|s| s.token == token)
            .map(|s| s.id);

        match id {
            Some(id) => {
                tables.sessions.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
