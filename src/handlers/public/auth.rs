use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::database::models::profile::ProfileError;
use crate::error::ApiError;
use crate::services::ProfileService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - create an account and hand back a session token.
/// The profile starts with `onboarding_complete = false`; protected content
/// routes stay closed until onboarding finishes.
pub async fn register(Json(payload): Json<RegisterRequest>) -> Result<Json<Value>, ApiError> {
    if payload.password.len() < 8 {
        return Err(ApiError::validation_error(
            "Password must be at least 8 characters",
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let service = ProfileService::new().await?;
    let profile = service.register(&payload.email, &password_hash).await?;

    let token = auth::generate_jwt(&Claims::new(profile.id, profile.email.clone()))?;
    Ok(Json(json!({
        "success": true,
        "data": { "token": token, "profile": profile }
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - verify credentials and issue a JWT.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|e| match e {
            ProfileError::Validation(msg) => ApiError::unauthorized(msg),
            other => other.into(),
        })?;

    let token = auth::generate_jwt(&Claims::new(profile.id, profile.email.clone()))?;
    Ok(Json(json!({
        "success": true,
        "data": { "token": token, "profile": profile }
    })))
}
