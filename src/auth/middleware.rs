//! Authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::db as auth_db;
use super::{SESSION_COOKIE_NAME, token_digest};
use crate::config;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated request context. Add as a handler parameter to require a
/// signed-in user; rejects with 401 otherwise. The user id here is the only
/// identity the store layer ever sees.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let token = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or(AppError::Unauthorized)?;

        let now = Utc::now();
        let conn = db::try_lock(&state.db)?;

        // Piggyback expired-session cleanup on a fraction of requests
        if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
            if let Err(e) = auth_db::cleanup_expired_sessions(&conn, now) {
                tracing::warn!("failed to clean up expired sessions: {}", e);
            }
        }

        let (user_id, username) = auth_db::get_session_user(&conn, &token_digest(&token), now)?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthContext { user_id, username })
    }
}
