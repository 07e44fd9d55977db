/// Object storage uploads
///
/// Uploaded images (profile pictures, identity-verification documents) go to
/// an external object store over its HTTP API. Keys are uuid-based so uploads
/// never collide; the returned public URL is what gets persisted on the user
/// or provider row.
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::config::ObjectStoreConfig;

/// Error type for object storage operations
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("upload request failed: {0}")]
    Request(String),

    #[error("object store returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Upload abstraction over the object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the bytes under a fresh key and returns the public URL
    async fn put(
        &self,
        prefix: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, ObjectStoreError>;
}

/// Builds an object key under a prefix, preserving a sensible extension
fn object_key(prefix: &str, content_type: &str) -> String {
    let ext = match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    };
    format!("{}/{}.{}", prefix, Uuid::new_v4(), ext)
}

/// Uploads through the store's HTTP API
pub struct HttpObjectStore {
    client: reqwest::Client,
    config: ObjectStoreConfig,
}

impl HttpObjectStore {
    pub fn new(config: ObjectStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        prefix: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, ObjectStoreError> {
        let key = object_key(prefix, content_type);
        let url = format!("{}/{}/{}", self.config.base_url, self.config.bucket, key);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Provider { status, body });
        }

        Ok(url)
    }
}

/// Returns placeholder URLs without storing anything
///
/// Used when no object store is configured and in tests.
pub struct LocalObjectStore {
    base_url: String,
}

impl LocalObjectStore {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        prefix: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, ObjectStoreError> {
        let key = object_key(prefix, content_type);
        tracing::info!(
            key = %key,
            bytes = data.len(),
            "Object store not configured; returning placeholder URL"
        );
        Ok(format!("{}/uploads/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_extension() {
        assert!(object_key("profiles", "image/png").ends_with(".png"));
        assert!(object_key("profiles", "image/jpeg").ends_with(".jpg"));
        assert!(object_key("id-docs", "application/octet-stream").ends_with(".jpg"));
        assert!(object_key("id-docs", "image/webp").starts_with("id-docs/"));
    }

    #[tokio::test]
    async fn test_local_store_returns_url_under_base() {
        let store = LocalObjectStore::new("http://localhost:8080".to_string());
        let url = store
            .put("profiles", "image/png", Bytes::from_static(b"img"))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/profiles/"));
    }
}
