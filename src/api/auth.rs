//! Registration, login, and profile handlers.

use super::{authenticate, success, ApiError, ApiState};
use crate::auth::{hash_password, issue_token, verify_password};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use wagon_core::error::WagonError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn validate_email(email: &str) -> Result<(), WagonError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.starts_with('@') {
        return Err(WagonError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_email(&req.email)?;
    if req.password.len() < 8 {
        return Err(WagonError::Validation(
            "password must be at least 8 characters".into(),
        )
        .into());
    }
    if req.name.trim().is_empty() {
        return Err(WagonError::Validation("name must not be empty".into()).into());
    }

    let email = req.email.trim().to_lowercase();
    let hash = hash_password(&req.password)?;
    let user = state.store.create_user(&email, &hash, req.name.trim()).await?;
    let token = issue_token(&state.auth, &user.id, &user.email)?;

    info!("registered user {}", user.email);
    Ok(success(json!({"user": user, "token": token})))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| WagonError::Auth("invalid email or password".into()))?;

    let token = issue_token(&state.auth, &user.id, &user.email)?;
    Ok(success(json!({"user": user, "token": token})))
}

/// `GET /api/auth/profile`
pub async fn profile(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    let claims = authenticate(&headers, &state.auth)?;
    let user = state.store.get_user(&claims.sub).await?;
    Ok(success(json!({"user": user})))
}
