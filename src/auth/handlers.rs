//! Register, login, and logout handlers.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::db as auth_db;
use super::{SESSION_COOKIE_NAME, generate_session_token, password, token_digest};
use crate::config;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<CredentialsForm>,
) -> Result<impl IntoResponse, AppError> {
    let username = form.username.trim();
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(AppError::BadRequest("username must be 1-64 characters".to_string()));
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = password::hash_password(&form.password)?;
    let now = Utc::now();

    let conn = db::try_lock(&state.db)?;
    let user_id = auth_db::create_user(&conn, username, &password_hash, now)?;

    let token = generate_session_token();
    auth_db::create_session(&conn, user_id, &token_digest(&token), config::SESSION_TTL_HOURS, now)?;
    drop(conn);

    tracing::info!("registered user {}", username);

    let response = UserResponse {
        user_id,
        username: username.to_string(),
    };
    Ok((jar.add(session_cookie(token)), Json(response)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<CredentialsForm>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let conn = db::try_lock(&state.db)?;

    let Some((user_id, stored_hash)) = auth_db::get_user_by_username(&conn, form.username.trim())?
    else {
        // Same failure as a bad password: don't reveal which usernames exist
        return Err(AppError::Unauthorized);
    };

    if !password::verify_password(&form.password, &stored_hash) {
        return Err(AppError::Unauthorized);
    }

    if let Err(e) = auth_db::update_last_login(&conn, user_id, now) {
        tracing::warn!("failed to update last login for user {}: {}", user_id, e);
    }

    let token = generate_session_token();
    auth_db::create_session(&conn, user_id, &token_digest(&token), config::SESSION_TTL_HOURS, now)?;
    drop(conn);

    let response = UserResponse {
        user_id,
        username: form.username.trim().to_string(),
    };
    Ok((jar.add(session_cookie(token)), Json(response)))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        let conn = db::try_lock(&state.db)?;
        auth_db::delete_session(&conn, &token_digest(cookie.value()))?;
    }

    let removal = Cookie::build((SESSION_COOKIE_NAME, "")).path("/");
    Ok((jar.remove(removal), Json(serde_json::json!({ "ok": true }))))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .build()
}
