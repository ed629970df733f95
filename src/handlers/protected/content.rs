use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::content::ownership::delete_content;
use crate::content::submission::{create_content, update_content};
use crate::database::manager::DatabaseManager;
use crate::database::store::PgContentStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::ProfileService;

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    /// Human-facing content-type label ("Job", "Heritage Site", ...).
    #[serde(alias = "opportunity_type")]
    pub content_type: String,
    /// Flat form fields, as collected by the creation wizard.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// POST /api/content - normalize a submission and insert it into the table
/// behind its declared type. One row in on success, nothing on failure.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubmissionRequest>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.require_complete(user.id).await?;

    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);
    let id = create_content(&store, &profile, &payload.content_type, &payload.fields).await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// PUT /api/content/:label/:id - edit an owned row through the same
/// normalization path used at creation.
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path((label, id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.require_complete(user.id).await?;

    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);
    update_content(&store, &profile, &label, id, &payload.fields).await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}

/// DELETE /api/content/:label/:id - ownership-checked hard delete.
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path((label, id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);
    delete_content(&store, user.id, &label, id).await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}
