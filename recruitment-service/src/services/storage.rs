use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;

/// What kind of file is being stored; drives the hosting folder and the
/// content-type checks done by handlers before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Document,
}

impl AssetKind {
    pub fn folder(&self) -> &'static str {
        match self {
            AssetKind::Image => "images",
            AssetKind::Document => "documents",
        }
    }
}

/// Result of a successful upload: the public URL plus the handle needed for
/// deletion.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        kind: AssetKind,
    ) -> Result<UploadedAsset, AppError>;

    async fn delete(&self, public_id: &str) -> Result<(), AppError>;
}

/// Disk-backed storage for development. Files land under
/// `{base_path}/{kind}/{uuid}-{filename}` and are served from
/// `{public_base_url}`.
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: String,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        kind: AssetKind,
    ) -> Result<UploadedAsset, AppError> {
        let safe_name: String = filename
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        let key = format!("{}/{}-{}", kind.folder(), Uuid::new_v4(), safe_name);

        let path = self.base_path.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;

        Ok(UploadedAsset {
            url: format!("{}/{}", self.public_base_url, key),
            public_id: key,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        // The key came from upload; never follow a path that escapes the root.
        if public_id.contains("..") {
            return Err(AppError::StorageError(format!(
                "refusing to delete suspicious key: {public_id}"
            )));
        }
        let path = self.base_path.join(public_id);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

/// HTTP-backed media host used in production. Uploads POST multipart to
/// `{base_url}/upload`; deletes go to `{base_url}/assets/{public_id}`.
pub struct RemoteStorage {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

#[derive(serde::Deserialize)]
struct RemoteUploadResponse {
    url: String,
    public_id: String,
}

impl RemoteStorage {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }
}

#[async_trait]
impl ObjectStorage for RemoteStorage {
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        kind: AssetKind,
    ) -> Result<UploadedAsset, AppError> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", kind.folder())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(format!(
                "upload rejected with status {}",
                response.status()
            )));
        }

        let body: RemoteUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("unexpected upload response: {e}")))?;

        Ok(UploadedAsset {
            url: body.url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(format!("{}/assets/{}", self.base_url, public_id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("delete request failed: {e}")))?;

        // Already-gone assets are not an error worth failing the request for.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::StorageError(format!(
                "delete rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Picks the storage backend from config.
pub async fn build_storage(
    config: &StorageConfig,
) -> Result<std::sync::Arc<dyn ObjectStorage>, AppError> {
    use crate::config::StorageBackend;
    match config.backend {
        StorageBackend::Local => {
            let path = config.local_path.clone().unwrap_or_else(|| "storage".to_string());
            let base_url = config
                .public_base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:8080/storage".to_string());
            Ok(std::sync::Arc::new(LocalStorage::new(path, base_url).await?))
        }
        StorageBackend::Remote => {
            let base_url = config.remote_base_url.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "remote storage backend requires a base URL"
                ))
            })?;
            let token = config.remote_api_token.clone().unwrap_or_default();
            Ok(std::sync::Arc::new(RemoteStorage::new(base_url, token)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_storage_upload_and_delete() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&dir, "http://localhost:8080/media".to_string())
            .await
            .unwrap();

        let asset = storage
            .upload(b"fake image bytes".to_vec(), "photo.jpg", AssetKind::Image)
            .await
            .unwrap();
        assert!(asset.url.starts_with("http://localhost:8080/media/images/"));
        assert!(dir.join(&asset.public_id).exists());

        storage.delete(&asset.public_id).await.unwrap();
        assert!(!dir.join(&asset.public_id).exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn local_storage_rejects_path_traversal() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&dir, "http://localhost".to_string())
            .await
            .unwrap();
        assert!(storage.delete("../outside").await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[test]
    fn filenames_are_sanitized_into_keys() {
        // exercised indirectly through upload; the mapping itself is simple
        let kind = AssetKind::Document;
        assert_eq!(kind.folder(), "documents");
    }
}
