/// Application state and router builder
///
/// # Route Map
///
/// ```text
/// /
/// ├── GET  /health                          # public
/// ├── POST /register                        # public, local accounts
/// ├── POST /login                           # public, local or federated
/// ├── GET  /verify-email?token=             # public
/// ├── POST /logout                          # session
/// ├── GET  /categories                      # public
/// ├── GET  /user          PUT /user         # session
/// ├── GET  /providers                       # public, approved only
/// ├── POST /providers                       # session
/// ├── GET  /providers/:id                   # public
/// ├── PUT  /providers/:id                   # session, owner only
/// ├── GET  /providers/:id/reviews           # public
/// ├── POST /tasks         GET /tasks        # session
/// ├── GET/PUT/DELETE /tasks/:id             # session, owner only
/// ├── POST /service-requests  GET /service-requests   # session
/// ├── PUT  /service-requests/:id            # session, party-scoped
/// ├── POST /reviews                         # session
/// ├── POST /upload/profile-picture          # session, multipart
/// ├── POST /upload/id-verification          # session, multipart
/// └── /admin                                # session + is_admin
///     ├── GET  /pending-providers
///     ├── POST /providers/:id/approve
///     └── POST /providers/:id/reject
/// ```
///
/// Authentication is extractor-based (`AuthContext` / `AdminContext`), so
/// public and authenticated methods can share a path.
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use findmyhelper_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config, middleware::security::SecurityHeadersLayer, notify::Notifier,
    services::object_store::ObjectStore,
};

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; everything inside is Arc.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Transactional email dispatcher
    pub notifier: Notifier,

    /// Image upload target
    pub objects: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        config: Config,
        notifier: Notifier,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            notifier,
            objects,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let admin_routes = Router::new()
        .route("/pending-providers", get(routes::admin::pending_providers))
        .route("/providers/:id/approve", post(routes::admin::approve_provider))
        .route("/providers/:id/reject", post(routes::admin::reject_provider));

    let api = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/verify-email", get(routes::auth::verify_email))
        .route("/categories", get(routes::categories::list_categories))
        .route("/user", get(routes::users::get_me).put(routes::users::update_me))
        .route(
            "/providers",
            get(routes::providers::list_providers).post(routes::providers::create_provider),
        )
        .route(
            "/providers/:id",
            get(routes::providers::get_provider).put(routes::providers::update_provider),
        )
        .route("/providers/:id/reviews", get(routes::reviews::list_provider_reviews))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/service-requests",
            get(routes::service_requests::list_service_requests)
                .post(routes::service_requests::create_service_request),
        )
        .route(
            "/service-requests/:id",
            put(routes::service_requests::update_service_request),
        )
        .route("/reviews", post(routes::reviews::create_review))
        .route(
            "/upload/profile-picture",
            post(routes::uploads::upload_profile_picture),
        )
        .route(
            "/upload/id-verification",
            post(routes::uploads::upload_id_verification),
        )
        .nest("/admin", admin_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    api.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .layer(cors)
    .layer(SecurityHeadersLayer::new(state.config.api.production))
    .with_state(state)
}
