//! Two-phase upload pipeline.
//!
//! An upload moves through three states: validated ([`PendingUpload`]),
//! pushed to the storage collaborator ([`PushedUpload`]), and recorded in the
//! media ledger ([`MediaAsset`]). Validation runs entirely in-process; a
//! rejected file never reaches storage. A ledger row is only written after
//! the push succeeded, so a row without a physical object cannot exist.

use std::sync::Arc;

use lingora_core::models::{infer_category, AssetCategory, MediaAsset, ResourceKind};
use lingora_core::validation::{validate_upload, UploadProfile, MAX_FILES_PER_BATCH};
use lingora_core::AppError;
use lingora_db::MediaAssetRepository;
use lingora_storage::{ObjectStorage, PushOptions, StoredObject};

/// One file of an upload request, as received from the transport layer.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Multipart field name; feeds category inference.
    pub field_name: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    /// Explicit category, overriding inference.
    pub category: Option<AssetCategory>,
    pub profile: UploadProfile,
    pub uploaded_by: Option<String>,
    pub eager_renditions: bool,
}

/// An upload that passed validation but has not touched storage yet.
pub struct PendingUpload {
    request: UploadRequest,
    kind: ResourceKind,
    category: AssetCategory,
}

impl PendingUpload {
    /// Validate MIME type, size ceiling, and emptiness for the request's
    /// profile, and settle the browsing category. No I/O happens here.
    pub fn validate(request: UploadRequest) -> Result<Self, AppError> {
        let kind = validate_upload(request.profile, &request.content_type, request.data.len())?;
        let category = infer_category(request.category, &request.field_name, &request.filename);
        Ok(Self {
            request,
            kind,
            category,
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    /// Push the bytes to the storage collaborator. On failure nothing has
    /// been recorded and the whole upload reports the storage error.
    pub async fn push(self, storage: &dyn ObjectStorage) -> Result<PushedUpload, AppError> {
        let options = PushOptions {
            filename: self.request.filename.clone(),
            content_type: self.request.content_type.clone(),
            kind: self.kind,
            eager_renditions: self.request.eager_renditions,
        };
        let size_bytes = self.request.data.len() as i64;
        let stored = storage
            .push(&options, self.request.data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(PushedUpload {
            stored,
            mime_type: self.request.content_type,
            size_bytes,
            kind: self.kind,
            category: self.category,
            uploaded_by: self.request.uploaded_by,
        })
    }
}

/// An upload the storage collaborator has accepted but the ledger has not
/// recorded yet.
#[derive(Debug)]
pub struct PushedUpload {
    stored: StoredObject,
    mime_type: String,
    size_bytes: i64,
    kind: ResourceKind,
    category: AssetCategory,
    uploaded_by: Option<String>,
}

impl PushedUpload {
    pub fn storage_id(&self) -> &str {
        &self.stored.storage_id
    }

    /// Write the ledger row. If this fails the pushed object is orphaned in
    /// storage; that is the accepted inconsistency, surfaced to the caller
    /// as the recording error.
    pub async fn record(self, media: &MediaAssetRepository) -> Result<MediaAsset, AppError> {
        media
            .record_pushed(
                &self.stored,
                &self.mime_type,
                self.size_bytes,
                self.kind,
                self.category,
                self.uploaded_by.as_deref(),
            )
            .await
    }
}

/// Per-file outcome of a batch upload. One file failing does not abort the
/// files after it.
#[derive(Debug)]
pub struct BatchUploadOutcome {
    pub filename: String,
    pub result: Result<MediaAsset, AppError>,
}

/// Upload orchestration facade over storage and the media ledger.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    media: MediaAssetRepository,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, media: MediaAssetRepository) -> Self {
        Self { storage, media }
    }

    /// Run one file through validate, push, record.
    #[tracing::instrument(skip(self, request), fields(upload.filename = %request.filename, upload.size = request.data.len()))]
    pub async fn upload_one(&self, request: UploadRequest) -> Result<MediaAsset, AppError> {
        let pending = PendingUpload::validate(request)?;
        let pushed = pending.push(self.storage.as_ref()).await?;
        let asset = pushed.record(&self.media).await?;
        tracing::info!(
            asset_id = %asset.id,
            storage_id = %asset.storage_id,
            category = %asset.category,
            "Upload recorded"
        );
        Ok(asset)
    }

    /// Upload a batch sequentially with per-file outcomes. An oversized batch
    /// is rejected as a whole before any file is processed.
    #[tracing::instrument(skip(self, requests), fields(upload.batch_size = requests.len()))]
    pub async fn upload_many(
        &self,
        requests: Vec<UploadRequest>,
    ) -> Result<Vec<BatchUploadOutcome>, AppError> {
        if requests.len() > MAX_FILES_PER_BATCH {
            return Err(AppError::Validation(format!(
                "Batch of {} files exceeds the limit of {}",
                requests.len(),
                MAX_FILES_PER_BATCH
            )));
        }

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let filename = request.filename.clone();
            let result = self.upload_one(request).await;
            if let Err(e) = &result {
                tracing::warn!(filename = %filename, error = %e, "Batch file failed");
            }
            outcomes.push(BatchUploadOutcome { filename, result });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lingora_storage::{StorageBackend, StorageError, StorageResult};

    struct CountingStorage {
        pushes: AtomicUsize,
        fail_push: bool,
    }

    impl CountingStorage {
        fn new(fail_push: bool) -> Self {
            Self {
                pushes: AtomicUsize::new(0),
                fail_push,
            }
        }
    }

    #[async_trait]
    impl ObjectStorage for CountingStorage {
        async fn push(
            &self,
            options: &PushOptions,
            _data: Vec<u8>,
        ) -> StorageResult<StoredObject> {
            self.pushes.fetch_add(1, Ordering::SeqCst);
            if self.fail_push {
                return Err(StorageError::PushFailed("backend down".to_string()));
            }
            Ok(StoredObject {
                storage_id: format!("obj/{}", options.filename),
                url: format!("http://cdn.example/{}", options.filename),
                secure_url: format!("https://cdn.example/{}", options.filename),
                format: None,
                width: None,
                height: None,
                duration_seconds: None,
                derived: Vec::new(),
            })
        }

        async fn remove(&self, _storage_id: &str, _kind: ResourceKind) -> StorageResult<()> {
            Ok(())
        }

        async fn exists(&self, _storage_id: &str) -> StorageResult<bool> {
            Ok(true)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Remote
        }
    }

    fn request(content_type: &str, size: usize, profile: UploadProfile) -> UploadRequest {
        UploadRequest {
            field_name: "file".to_string(),
            filename: "upload.bin".to_string(),
            content_type: content_type.to_string(),
            data: vec![0u8; size],
            category: None,
            profile,
            uploaded_by: None,
            eager_renditions: false,
        }
    }

    #[tokio::test]
    async fn rejected_file_never_reaches_storage() {
        let storage = CountingStorage::new(false);

        let err = match PendingUpload::validate(request("application/pdf", 1024, UploadProfile::General)) {
            Err(e) => e,
            Ok(_) => panic!("expected validation rejection"),
        };
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(storage.pushes.load(Ordering::SeqCst), 0);

        let err = match PendingUpload::validate(request(
            "image/png",
            6 * 1024 * 1024,
            UploadProfile::Logo,
        )) {
            Err(e) => e,
            Ok(_) => panic!("expected size rejection"),
        };
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(storage.pushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn push_failure_surfaces_as_storage_error() {
        let storage = CountingStorage::new(true);
        let pending =
            PendingUpload::validate(request("image/png", 1024, UploadProfile::General)).unwrap();
        let err = pending.push(&storage).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(storage.pushes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_push_carries_storage_identity() {
        let storage = CountingStorage::new(false);
        let mut req = request("video/mp4", 2048, UploadProfile::General);
        req.filename = "hero_clip.mp4".to_string();
        let pending = PendingUpload::validate(req).unwrap();
        assert_eq!(pending.kind(), ResourceKind::Video);
        assert_eq!(pending.category(), AssetCategory::HeroVideo);

        let pushed = pending.push(&storage).await.unwrap();
        assert_eq!(pushed.storage_id(), "obj/hero_clip.mp4");
    }

    // A lazy pool never connects unless a query runs; these tests prove the
    // service rejects bad input before touching storage or the database.
    fn lazy_service(storage: Arc<CountingStorage>) -> UploadService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap();
        UploadService::new(storage.clone(), MediaAssetRepository::new(pool, storage))
    }

    #[tokio::test]
    async fn service_rejects_before_any_storage_call() {
        let storage = Arc::new(CountingStorage::new(false));
        let service = lazy_service(storage.clone());

        let err = service
            .upload_one(request("application/pdf", 1024, UploadProfile::General))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(storage.pushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_batch_rejected_wholesale() {
        let storage = Arc::new(CountingStorage::new(false));
        let service = lazy_service(storage.clone());

        let requests: Vec<_> = (0..MAX_FILES_PER_BATCH + 1)
            .map(|_| request("image/png", 512, UploadProfile::General))
            .collect();
        let err = service.upload_many(requests).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(storage.pushes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn explicit_category_survives_validation() {
        let mut req = request("image/png", 512, UploadProfile::General);
        req.category = Some(AssetCategory::TeamPhoto);
        req.filename = "hero.png".to_string();
        let pending = PendingUpload::validate(req).unwrap();
        assert_eq!(pending.category(), AssetCategory::TeamPhoto);
    }
}
