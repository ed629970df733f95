use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::content::registry::ContentType;
use crate::database::manager::DatabaseManager;
use crate::database::models::profile::Role;
use crate::database::store::{ContentStore, PgContentStore};
use crate::error::ApiError;
use crate::services::ProfileService;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Filter by profile role (individual, company, university, ...).
    pub role: Option<String>,
}

/// GET /directory/profiles - completed profiles, newest first.
pub async fn list_profiles(
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let role_filter = query
        .role
        .as_deref()
        .map(Role::from_str)
        .transpose()
        .map_err(|_| ApiError::validation_error("Unknown role filter"))?;

    let service = ProfileService::new().await?;
    let profiles = service.list_public(role_filter).await?;
    Ok(Json(json!({ "success": true, "data": profiles })))
}

/// GET /directory/profiles/:slug - one public profile.
pub async fn profile_by_slug(Path(slug): Path<String>) -> Result<Json<Value>, ApiError> {
    let service = ProfileService::new().await?;
    let profile = service.find_by_slug(&slug).await?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// GET /directory/content/:label - public listing for one content kind,
/// newest first. Unknown labels are rejected before any query runs.
pub async fn list_content(Path(label): Path<String>) -> Result<Json<Value>, ApiError> {
    let content_type = ContentType::from_label(&label)?;

    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);
    let rows = store
        .select_where(content_type.table(), &[], &[], Some("created_at"))
        .await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}

/// GET /directory/content/:label/:key - one item, addressed by UUID or, for
/// slug-bearing kinds, by slug.
pub async fn content_detail(
    Path((label, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let content_type = ContentType::from_label(&label)?;

    let pool = DatabaseManager::pool().await?;
    let store = PgContentStore::new(pool);

    let row = match Uuid::parse_str(&key) {
        Ok(id) => store.select_by_id(content_type.table(), id, &[]).await?,
        Err(_) if content_type.has_slug() => store
            .select_where(
                content_type.table(),
                &[("slug", Value::String(key))],
                &[],
                None,
            )
            .await?
            .into_iter()
            .next(),
        Err(_) => None,
    };

    match row {
        Some(row) => Ok(Json(json!({ "success": true, "data": row }))),
        None => Err(ApiError::not_found("Content not found")),
    }
}
