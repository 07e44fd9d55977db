/// Session model
///
/// Sessions back the cookie-based auth layer. The opaque `token` travels in an
/// HttpOnly cookie; the row lives in whichever store backend is active, so
/// sessions survive restarts only on the relational backend.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id BIGSERIAL PRIMARY KEY,
///     token VARCHAR(64) NOT NULL UNIQUE,
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-side login session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,

    /// Opaque random token carried by the session cookie
    pub token: String,

    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Input for creating a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}
