//! Local filesystem storage backend (development and tests).

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::traits::{
    ObjectStorage, PushOptions, StorageBackend, StorageError, StorageResult, StoredObject,
};
use lingora_core::models::ResourceKind;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a storage id to a filesystem path, rejecting ids that could
    /// escape the base directory.
    fn id_to_path(&self, storage_id: &str) -> StorageResult<PathBuf> {
        if storage_id.contains("..") || storage_id.starts_with('/') {
            return Err(StorageError::InvalidId(
                "Storage id contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_id))
    }

    fn extension_of(filename: &str) -> Option<String> {
        std::path::Path::new(filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    #[tracing::instrument(skip(self, data), fields(storage.backend = "local"))]
    async fn push(&self, options: &PushOptions, data: Vec<u8>) -> StorageResult<StoredObject> {
        let extension = Self::extension_of(&options.filename);
        let storage_id = match &extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.id_to_path(&storage_id)?;
        fs::write(&path, &data)
            .await
            .map_err(|e| StorageError::PushFailed(format!("{}: {}", path.display(), e)))?;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), storage_id);
        tracing::debug!(storage_id = %storage_id, bytes = data.len(), "Stored object locally");

        Ok(StoredObject {
            storage_id,
            secure_url: url.clone(),
            url,
            format: extension,
            width: None,
            height: None,
            duration_seconds: None,
            // The local backend never generates renditions.
            derived: Vec::new(),
        })
    }

    #[tracing::instrument(skip(self), fields(storage.backend = "local"))]
    async fn remove(&self, storage_id: &str, _kind: ResourceKind) -> StorageResult<()> {
        let path = self.id_to_path(storage_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_id.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_id: &str) -> StorageResult<bool> {
        let path = self.id_to_path(storage_id)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_options(filename: &str) -> PushOptions {
        PushOptions {
            filename: filename.to_string(),
            content_type: "image/png".to_string(),
            kind: ResourceKind::Image,
            eager_renditions: false,
        }
    }

    #[tokio::test]
    async fn push_then_exists_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap();

        let stored = storage
            .push(&image_options("hero.png"), b"png-bytes".to_vec())
            .await
            .unwrap();
        assert!(stored.storage_id.ends_with(".png"));
        assert!(stored.url.starts_with("http://localhost:3000/media/"));
        assert_eq!(stored.url, stored.secure_url);
        assert!(storage.exists(&stored.storage_id).await.unwrap());

        storage
            .remove(&stored.storage_id, ResourceKind::Image)
            .await
            .unwrap();
        assert!(!storage.exists(&stored.storage_id).await.unwrap());
    }

    #[tokio::test]
    async fn remove_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap();

        let err = storage
            .remove("no-such-object.png", ResourceKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_traversal_storage_ids() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap();

        let err = storage.exists("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidId(_)));
    }
}
