/// User model
///
/// Users are the single account type in FindMyHelper. Role flags distinguish
/// clients from providers and admins:
/// - `is_provider`: the user has created a `ServiceProvider` profile
/// - `is_admin`: the user may review provider applications
///
/// Accounts are never hard-deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     auth_provider VARCHAR(50),
///     full_name VARCHAR(255),
///     phone VARCHAR(50),
///     profile_image_url VARCHAR(512),
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     verification_token VARCHAR(64),
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     is_provider BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account
///
/// Local accounts carry an Argon2id `password_hash` and `auth_provider = None`.
/// Federated accounts carry `auth_provider = Some(provider)` and no password
/// hash; they authenticate by presenting an identity token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    /// Email address, stored lowercase, unique across all users
    pub email: String,

    /// Argon2id password hash (None for federated accounts)
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// External identity provider marker (None for local accounts)
    pub auth_provider: Option<String>,

    /// Display name
    pub full_name: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Profile picture URL (object storage)
    pub profile_image_url: Option<String>,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Pending email-verification token (cleared once verified)
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,

    /// Whether the user may review provider applications
    pub is_admin: bool,

    /// Whether the user has a provider profile
    pub is_provider: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account authenticates through an external identity provider
    pub fn is_federated(&self) -> bool {
        self.auth_provider.is_some()
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (caller must lowercase)
    pub email: String,

    /// Argon2id hash, never a plaintext password (None for federated accounts)
    pub password_hash: Option<String>,

    /// External identity provider marker
    pub auth_provider: Option<String>,

    pub full_name: Option<String>,
    pub phone: Option<String>,

    /// Whether the email is already verified (federated accounts arrive verified)
    pub email_verified: bool,

    /// Email-verification token for local accounts
    pub verification_token: Option<String>,
}

/// Input for updating an existing user
///
/// Only non-None fields are applied. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub profile_image_url: Option<Option<String>>,
    pub email_verified: Option<bool>,
    pub verification_token: Option<Option<String>>,
    pub is_admin: Option<bool>,
    pub is_provider: Option<bool>,
}
