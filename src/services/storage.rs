use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;

/// Errors from the object-storage boundary. The file is discarded on
/// failure; nothing is retried and nothing partial is kept.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Object storage not configured")]
    NotConfigured,

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Upload rejected by storage: {0}")]
    Rejected(String),
}

/// Object-storage boundary: push bytes, get back a public URL. The
/// application never stores raw bytes, only the returned URL string.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError>;
}

/// reqwest-backed implementation speaking to an S3-style HTTP storage
/// endpoint with a bearer service key.
pub struct HttpObjectStorage {
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let storage = &config::config().storage;
        if storage.endpoint.is_empty() {
            return Err(UploadError::NotConfigured);
        }

        let url = format!("{}/{}/{}", storage.endpoint, bucket, path);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&storage.service_key)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(format!("{}/{}/{}", storage.public_base, bucket, path))
    }
}

/// Stable object key for an upload: a short fingerprint of the uploader and
/// filename, keeping the original extension so content types stay guessable.
pub fn object_key(user_id: Uuid, filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(filename.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("{}.{}", &digest[..16], ext.to_lowercase())
        }
        _ => digest[..16].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_keep_safe_extensions() {
        let user = Uuid::new_v4();
        let key = object_key(user, "resume.PDF");
        assert!(key.ends_with(".pdf"));
        assert_eq!(key.len(), 16 + 4);

        let no_ext = object_key(user, "README");
        assert_eq!(no_ext.len(), 16);

        let hostile = object_key(user, "x.p/../df");
        assert!(!hostile.contains('/'));
    }

    #[test]
    fn object_keys_do_not_collide_for_repeat_uploads() {
        let user = Uuid::new_v4();
        assert_ne!(object_key(user, "logo.png"), object_key(user, "logo.png"));
    }
}
