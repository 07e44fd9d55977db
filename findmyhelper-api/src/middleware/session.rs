/// Session cookie authentication
///
/// Handlers opt into authentication by taking an [`AuthContext`] argument:
/// the extractor resolves the `fmh_session` cookie to a Session row in the
/// store, rejects missing or expired sessions with 401, and exposes the
/// caller's role flags. Admin handlers take [`AdminContext`], which adds a
/// 403 gate on top.
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{app::AppState, error::ApiError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "fmh_session";

/// Identity of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub is_admin: bool,
    pub is_provider: bool,

    /// Token backing this session, used by logout
    pub session_token: String,
}

/// Builds the session cookie for a fresh login
pub fn session_cookie(token: String, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(time::Duration::hours(ttl_hours));
    cookie
}

/// Builds an expired cookie that clears the session on the client
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized("Missing session cookie".to_string()))?;

        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::Unauthorized("Missing session cookie".to_string()))?;

        let session = state
            .store
            .session_by_token(&token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        if session.is_expired() {
            // Expired rows are garbage; drop eagerly.
            let _ = state.store.delete_session(&token).await;
            return Err(ApiError::Unauthorized("Session expired".to_string()));
        }

        let user = state
            .store
            .user_by_id(session.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        Ok(AuthContext {
            user_id: user.id,
            is_admin: user.is_admin,
            is_provider: user.is_provider,
            session_token: token,
        })
    }
}

/// Authenticated caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if !auth.is_admin {
            return Err(ApiError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }
        Ok(AdminContext(auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), 24, false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_removal_cookie_is_empty_and_expired() {
        let cookie = removal_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
