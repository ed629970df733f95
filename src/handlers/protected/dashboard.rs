use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::content::listing::owned_content_feed;
use crate::content::registry::{creatable_types, ContentType};
use crate::database::manager::DatabaseManager;
use crate::database::store::PgContentStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::ProfileService;

/// GET /api/dashboard/content - the caller's content across every table
/// their role publishes to, merged newest-first. Partial results carry a
/// `failed_sources` list instead of failing outright.
pub async fn my_content(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.require_complete(user.id).await?;

    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);
    let feed = owned_content_feed(&store, &profile).await?;

    Ok(Json(json!({ "success": true, "data": feed })))
}

/// GET /api/dashboard/creatable-types - the labels this profile's creation
/// UI should offer. The same registry gates the server-side submission path,
/// so the list here is advisory, not a security boundary.
pub async fn creatable(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.require_complete(user.id).await?;

    let role = profile.role.ok_or_else(|| {
        ApiError::forbidden("Complete onboarding before continuing")
    })?;

    let labels: Vec<&'static str> = creatable_types(role, profile.organization_subtype())
        .iter()
        .map(ContentType::label)
        .collect();

    Ok(Json(json!({ "success": true, "data": labels })))
}
