/// Authentication endpoints
///
/// Two login paths share `POST /login`: local email/password and federated
/// identity tokens. Both end by creating a Session row and setting the
/// HttpOnly session cookie.
///
/// # Endpoints
///
/// - `POST /register` - Local registration; sends a verification email
/// - `POST /login` - Local (`email` + `password`) or federated (`id_token`)
/// - `GET  /verify-email?token=` - Completes local email verification
/// - `POST /logout` - Deletes the session and clears the cookie
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use findmyhelper_shared::{
    auth::{identity, password, token},
    models::{CreateSession, CreateUser, UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{removal_cookie, session_cookie, AuthContext},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked against the strength rule)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,

    /// Optional contact phone
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
}

/// Login request: local credentials or a federated identity token
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginRequest {
    Local { email: String, password: String },
    Federated { id_token: String },
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
}

/// Register a new local account
///
/// Stores an Argon2id hash and a random verification token, then emails the
/// verification link. Login stays blocked with 403 until the link is opened.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation or password strength failed
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.password)
        .map_err(|reason| ApiError::invalid_field("password", &reason))?;

    let password_hash = password::hash_password(&req.password)?;
    let verification_token = token::generate_token();

    let user = state
        .store
        .create_user(CreateUser {
            email: req.email.to_lowercase(),
            password_hash: Some(password_hash),
            auth_provider: None,
            full_name: req.full_name,
            phone: req.phone,
            email_verified: false,
            verification_token: Some(verification_token.clone()),
        })
        .await?;

    // Best-effort: a failed send is logged inside the notifier.
    state.notifier.send_verification(&user, &verification_token).await;

    tracing::info!(user_id = user.id, "Registered new local account");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with local credentials or a federated identity token
///
/// # Errors
///
/// - `401 Unauthorized`: bad credentials or invalid identity token
/// - `403 Forbidden`: unverified email, or password login on a federated account
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let user = match req {
        LoginRequest::Local { email, password } => login_local(&state, &email, &password).await?,
        LoginRequest::Federated { id_token } => login_federated(&state, &id_token).await?,
    };

    let session_token = token::generate_token();
    state
        .store
        .create_session(CreateSession {
            token: session_token.clone(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::hours(state.config.session.ttl_hours),
        })
        .await?;

    let cookie = session_cookie(
        session_token,
        state.config.session.ttl_hours,
        state.config.api.production,
    );

    tracing::info!(user_id = user.id, "User logged in");
    Ok((jar.add(cookie), Json(LoginResponse { user })))
}

async fn login_local(state: &AppState, email: &str, password: &str) -> ApiResult<User> {
    let user = state
        .store
        .user_by_email(&email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if user.is_federated() {
        return Err(ApiError::Forbidden(
            "This account uses federated login".to_string(),
        ));
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(password, hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.email_verified {
        return Err(ApiError::Forbidden(
            "Email address not verified".to_string(),
        ));
    }

    Ok(user)
}

async fn login_federated(state: &AppState, id_token: &str) -> ApiResult<User> {
    let identity_config = state.config.identity.as_ref().ok_or_else(|| {
        ApiError::BadRequest("Federated login is not enabled".to_string())
    })?;

    let claims = identity::verify_identity_token(id_token, identity_config)?;
    let email = claims.email.to_lowercase();

    if let Some(user) = state.store.user_by_email(&email).await? {
        if !user.is_federated() {
            return Err(ApiError::Conflict(
                "A local account already exists for this email".to_string(),
            ));
        }
        return Ok(user);
    }

    // First federated login: create the local user from the token claims.
    let user = state
        .store
        .create_user(CreateUser {
            email,
            password_hash: None,
            auth_provider: Some(claims.iss.clone()),
            full_name: claims.name,
            phone: None,
            email_verified: true,
            verification_token: None,
        })
        .await?;

    tracing::info!(user_id = user.id, issuer = %claims.iss, "Created federated account");
    Ok(user)
}

/// Email verification query
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Completes local email verification
///
/// # Errors
///
/// - `404 Not Found`: unknown or already-consumed token
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = state
        .store
        .user_by_verification_token(&query.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Unknown verification token".to_string()))?;

    state
        .store
        .update_user(
            user.id,
            UpdateUser {
                email_verified: Some(true),
                verification_token: Some(None),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(user_id = user.id, "Email verified");
    Ok(Json(json!({ "message": "Email verified" })))
}

/// Deletes the session and clears the cookie
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    state.store.delete_session(&auth.session_token).await?;
    Ok((
        jar.add(removal_cookie()),
        Json(json!({ "message": "Logged out" })),
    ))
}
