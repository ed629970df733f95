use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::profile_service::{
    IndividualOnboarding, OrganizationOnboarding, SettingsUpdate,
};
use crate::services::ProfileService;

/// GET /api/auth/whoami - the caller's decoded profile.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.load(user.id).await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// POST /api/profile/onboarding/individual - finish onboarding as an
/// individual: populate the individual cluster, assign the slug, open the
/// protected surfaces.
pub async fn onboard_individual(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<IndividualOnboarding>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service
        .complete_individual_onboarding(user.id, payload)
        .await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// POST /api/profile/onboarding/organization - finish onboarding as an
/// organization of the declared type.
pub async fn onboard_organization(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<OrganizationOnboarding>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service
        .complete_organization_onboarding(user.id, payload)
        .await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PUT /api/profile/settings - apply settings changes; a display-name change
/// recomputes the public slug.
pub async fn update_settings(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.update_settings(user.id, payload).await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}
