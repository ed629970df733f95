use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::storage::{object_key, HttpObjectStorage, ObjectStorage};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Target bucket; defaults to the configured upload bucket.
    pub bucket: Option<String>,
    /// Original filename; only its extension survives into the object key.
    pub filename: String,
}

/// POST /api/uploads - push raw bytes to the object store and return the
/// public URL. The application keeps only that URL; if the surrounding form
/// is abandoned the object is simply orphaned.
pub async fn upload(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation_error("Upload body is empty"));
    }
    let max = config::config().api.max_request_size_bytes;
    if body.len() > max {
        return Err(ApiError::validation_error(format!(
            "Upload exceeds the {} byte limit",
            max
        )));
    }

    let bucket = query
        .bucket
        .unwrap_or_else(|| config::config().storage.default_bucket.clone());
    if bucket.is_empty() || !bucket.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ApiError::validation_error("Invalid bucket name"));
    }

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let key = object_key(user.id, &query.filename);
    let storage = HttpObjectStorage::new();
    let url = storage
        .upload(&bucket, &key, body.to_vec(), content_type)
        .await?;

    tracing::info!(user_id = %user.id, bucket, key, "upload stored");
    Ok(Json(json!({ "success": true, "data": { "url": url } })))
}
