//! RegistryService — the carousel asset registry.
//!
//! Tracks which promotional images are registered for the homepage
//! carousel. Blobs and the single JSON index document both live in one
//! [`StorageBackend`]; every operation is a full read-modify-write of the
//! index with no fine-grained locking. That is deliberate: this is
//! low-concurrency admin tooling, and two racing writers simply last-win
//! on the index document. An etag compare-and-swap on the index write is
//! the upgrade path if that ever stops being acceptable.

use crate::backend::{BackendError, StorageBackend, StoredLocation};
use crate::models::asset::{
    AssetEntry, AssetStatus, INDEX_KEY, STORED_NAME_PREFIX, content_type_for, extension_allowed,
    generate_stored_name, sentinel_expiry,
};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("asset `{0}` not found in the carousel index")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("carousel index is corrupt: {0}")]
    CorruptIndex(#[from] serde_json::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result of an upload batch. Per-file rejections are reported here
/// rather than failing the batch; a backend failure still aborts it.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub uploaded: usize,
    pub failures: Vec<UploadFailure>,
    pub entries: Vec<AssetEntry>,
}

#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CleanOutcome {
    pub removed_expired: usize,
    pub removed_duplicates: usize,
    pub remaining: usize,
}

/// One index entry as reported to the admin surface, with derived status.
#[derive(Debug, Serialize)]
pub struct AssetView {
    pub filename: String,
    pub expires: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: AssetStatus,
}

/// One active entry as handed to the public rendering surface.
#[derive(Debug, Serialize)]
pub struct PublicAsset {
    pub filename: String,
    pub display_url: String,
    pub expires: NaiveDate,
}

/// Orchestrates Upload, Delete, Clean, Regenerate and List over one
/// storage backend and the index document it holds.
#[derive(Clone)]
pub struct RegistryService {
    /// The single backend holding both blobs and the index document.
    pub backend: Arc<dyn StorageBackend>,
}

impl RegistryService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Read the index document, defaulting to empty when absent.
    async fn read_index(&self) -> RegistryResult<Vec<AssetEntry>> {
        match self.backend.get(INDEX_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Write the index back as one whole document.
    async fn write_index(&self, entries: &[AssetEntry]) -> RegistryResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        self.backend
            .put(INDEX_KEY, Bytes::from(bytes), "application/json")
            .await?;
        Ok(())
    }

    /// Best-effort blob removal. Index consistency outranks storage
    /// tidiness, so a failed delete is logged and skipped, never escalated.
    async fn discard_blob(&self, key: &str, reason: &str) {
        match self.backend.delete(key).await {
            Ok(()) => debug!(key, reason, "removed carousel blob"),
            Err(err) => warn!(
                key,
                reason,
                error = %err,
                "failed to remove carousel blob, index entry dropped anyway"
            ),
        }
    }

    /// Register a batch of already-validated uploads under one expiry date.
    ///
    /// The whole batch is rejected before any blob write when it is empty
    /// or `expires` is not strictly after today. Individual files with a
    /// disallowed extension are skipped and reported per file. When at
    /// least one file succeeded, the index is sorted by stored name and
    /// written back once.
    pub async fn upload(
        &self,
        files: Vec<(String, Bytes)>,
        expires: NaiveDate,
    ) -> RegistryResult<UploadOutcome> {
        let today = Utc::now().date_naive();
        if files.is_empty() {
            return Err(RegistryError::Validation("upload batch is empty".into()));
        }
        if expires <= today {
            return Err(RegistryError::Validation(format!(
                "expiry date {expires} must be after today"
            )));
        }

        let mut index = self.read_index().await?;
        let mut failures = Vec::new();
        let mut created = Vec::new();
        for (original, bytes) in files {
            if !extension_allowed(&original) {
                failures.push(UploadFailure {
                    reason: format!("`{original}` is not an allowed image format"),
                    filename: original,
                });
                continue;
            }
            let stored_name = generate_stored_name(&original);
            let location = self
                .backend
                .put(&stored_name, bytes, content_type_for(&stored_name))
                .await?;
            let entry = AssetEntry {
                filename: stored_name,
                expires,
                url: location.url,
            };
            index.push(entry.clone());
            created.push(entry);
        }

        if !created.is_empty() {
            index.sort_by(|a, b| a.filename.cmp(&b.filename));
            self.write_index(&index).await?;
        }

        info!(
            uploaded = created.len(),
            failed = failures.len(),
            "processed carousel upload batch"
        );
        Ok(UploadOutcome {
            uploaded: created.len(),
            failures,
            entries: created,
        })
    }

    /// Reconcile the index: drop duplicate and expired entries.
    ///
    /// One pass in insertion order. The first entry seen for a given
    /// original name wins; later entries with the same original name are
    /// removed as duplicates regardless of their own expiry. Entries past
    /// their expiry are removed as expired. Blob deletes are best-effort;
    /// the reduced index is written back in a single write. Idempotent.
    pub async fn clean(&self) -> RegistryResult<CleanOutcome> {
        let today = Utc::now().date_naive();
        let index = self.read_index().await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::new();
        let mut removed_expired = 0;
        let mut removed_duplicates = 0;
        for entry in index {
            if seen.contains(entry.original_name()) {
                removed_duplicates += 1;
                self.discard_blob(&entry.filename, "duplicate").await;
                continue;
            }
            if entry.expires < today {
                removed_expired += 1;
                self.discard_blob(&entry.filename, "expired").await;
                continue;
            }
            seen.insert(entry.original_name().to_string());
            kept.push(entry);
        }

        self.write_index(&kept).await?;
        info!(
            removed_expired,
            removed_duplicates,
            remaining = kept.len(),
            "cleaned carousel index"
        );
        Ok(CleanOutcome {
            removed_expired,
            removed_duplicates,
            remaining: kept.len(),
        })
    }

    /// Rebuild the index from backend reality, discarding the current one.
    ///
    /// Lists the backend under the carousel prefix, keeps objects with an
    /// allowed image extension, and writes a fresh index giving every
    /// entry the far-future sentinel expiry (prior expirations are lost by
    /// design; this is a recovery operation). Never deletes blobs.
    pub async fn regenerate(&self) -> RegistryResult<Vec<AssetEntry>> {
        let listed = self.backend.list(STORED_NAME_PREFIX).await?;
        let mut entries: Vec<AssetEntry> = listed
            .into_iter()
            .filter(|location| location.key != INDEX_KEY && extension_allowed(&location.key))
            .map(|StoredLocation { key, url }| AssetEntry {
                filename: key,
                expires: sentinel_expiry(),
                url,
            })
            .collect();
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));

        self.write_index(&entries).await?;
        info!(entries = entries.len(), "regenerated carousel index");
        Ok(entries)
    }

    /// All entries with derived status, newest expiry first. Read-only;
    /// expired entries are reported, not hidden.
    pub async fn list(&self) -> RegistryResult<Vec<AssetView>> {
        let today = Utc::now().date_naive();
        let mut index = self.read_index().await?;
        index.sort_by(|a, b| b.expires.cmp(&a.expires));
        Ok(index
            .into_iter()
            .map(|entry| {
                let status = entry.status(today);
                AssetView {
                    filename: entry.filename,
                    expires: entry.expires,
                    url: entry.url,
                    status,
                }
            })
            .collect())
    }

    /// Active-only entries for homepage rendering. The display URL is the
    /// backend-provided one when present, else this service's own image
    /// route for the local backend.
    pub async fn list_active(&self) -> RegistryResult<Vec<PublicAsset>> {
        let today = Utc::now().date_naive();
        let mut active: Vec<AssetEntry> = self
            .read_index()
            .await?
            .into_iter()
            .filter(|entry| entry.is_active(today))
            .collect();
        active.sort_by(|a, b| b.expires.cmp(&a.expires));
        Ok(active
            .into_iter()
            .map(|entry| PublicAsset {
                display_url: entry
                    .url
                    .clone()
                    .unwrap_or_else(|| format!("/carousel/{}", entry.filename)),
                filename: entry.filename,
                expires: entry.expires,
            })
            .collect())
    }

    /// Remove one entry by stored name and best-effort delete its blob.
    pub async fn delete(&self, stored_name: &str) -> RegistryResult<()> {
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|entry| entry.filename != stored_name);
        if index.len() == before {
            return Err(RegistryError::NotFound(stored_name.to_string()));
        }

        self.discard_blob(stored_name, "deleted").await;
        self.write_index(&index).await?;
        info!(stored_name, "deleted carousel asset");
        Ok(())
    }

    /// Fetch image bytes for the local display route.
    ///
    /// Only carousel images are reachable here: the key must carry the
    /// carousel prefix and an allowed image extension, which also keeps
    /// the index document and stray probe objects unservable.
    pub async fn fetch_image(&self, stored_name: &str) -> RegistryResult<Option<Bytes>> {
        if !stored_name.starts_with(STORED_NAME_PREFIX) || !extension_allowed(stored_name) {
            return Ok(None);
        }
        Ok(self.backend.get(stored_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use chrono::Days;

    fn service() -> (tempfile::TempDir, RegistryService) {
        let dir = tempfile::tempdir().unwrap();
        let service = RegistryService::new(Arc::new(LocalBackend::new(dir.path())));
        (dir, service)
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn entry(filename: &str, expires: NaiveDate) -> AssetEntry {
        AssetEntry {
            filename: filename.to_string(),
            expires,
            url: None,
        }
    }

    /// Write crafted entries (and matching blobs) straight into the backend.
    async fn seed(service: &RegistryService, entries: &[AssetEntry]) {
        for entry in entries {
            service
                .backend
                .put(&entry.filename, Bytes::from_static(b"img"), "image/jpeg")
                .await
                .unwrap();
        }
        service.write_index(entries).await.unwrap();
    }

    #[tokio::test]
    async fn upload_rejects_expiry_not_after_today() {
        let (_dir, service) = service();
        let files = vec![("a.jpg".to_string(), Bytes::from_static(b"img"))];

        let err = service.upload(files.clone(), today()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        // Nothing was written, not even the index.
        assert!(service.read_index().await.unwrap().is_empty());

        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let outcome = service.upload(files, tomorrow).await.unwrap();
        assert_eq!(outcome.uploaded, 1);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_empty_batch() {
        let (_dir, service) = service();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let err = service.upload(Vec::new(), tomorrow).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_batch_with_bad_extension_is_partial_success() {
        let (_dir, service) = service();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let files = vec![
            ("one.jpg".to_string(), Bytes::from_static(b"1")),
            ("two.txt".to_string(), Bytes::from_static(b"2")),
            ("three.png".to_string(), Bytes::from_static(b"3")),
        ];

        let outcome = service.upload(files, tomorrow).await.unwrap();
        assert_eq!(outcome.uploaded, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].filename, "two.txt");
        assert!(outcome.failures[0].reason.contains("two.txt"));

        let index = service.read_index().await.unwrap();
        assert_eq!(index.len(), 2);
        // Index is sorted by stored name and every entry's blob exists.
        assert!(index.windows(2).all(|w| w[0].filename <= w[1].filename));
        for entry in &index {
            assert!(service.backend.get(&entry.filename).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn clean_removes_expired_and_duplicate_entries() {
        let (_dir, service) = service();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let future = today().checked_add_days(Days::new(30)).unwrap();
        seed(
            &service,
            &[
                entry("carousel_t1_hero.jpg", future),
                entry("carousel_t2_hero.jpg", future),
                entry("carousel_t3_old.jpg", yesterday),
                entry("carousel_t4_promo.png", future),
            ],
        )
        .await;

        let outcome = service.clean().await.unwrap();
        assert_eq!(outcome.removed_expired, 1);
        assert_eq!(outcome.removed_duplicates, 1);
        assert_eq!(outcome.remaining, 2);

        let index = service.read_index().await.unwrap();
        let names: Vec<&str> = index.iter().map(|e| e.original_name()).collect();
        assert_eq!(names, ["hero.jpg", "promo.png"]);
        assert!(index.iter().all(|e| e.expires >= today()));
        // Removed blobs are gone, kept blobs remain.
        assert!(service.backend.get("carousel_t2_hero.jpg").await.unwrap().is_none());
        assert!(service.backend.get("carousel_t3_old.jpg").await.unwrap().is_none());
        assert!(service.backend.get("carousel_t1_hero.jpg").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clean_is_idempotent() {
        let (_dir, service) = service();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let future = today().checked_add_days(Days::new(7)).unwrap();
        seed(
            &service,
            &[
                entry("carousel_t1_a.jpg", future),
                entry("carousel_t2_a.jpg", future),
                entry("carousel_t3_b.jpg", yesterday),
            ],
        )
        .await;

        service.clean().await.unwrap();
        let second = service.clean().await.unwrap();
        assert_eq!(second.removed_expired, 0);
        assert_eq!(second.removed_duplicates, 0);
        assert_eq!(second.remaining, 1);
    }

    #[tokio::test]
    async fn clean_first_seen_wins_and_reports_duplicate_not_expired() {
        let (_dir, service) = service();
        // A first with a far-future expiry, then B already expired but
        // sharing A's original name. B must go as a duplicate.
        seed(
            &service,
            &[
                entry("1_photo.jpg", NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()),
                entry("2_photo.jpg", NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()),
            ],
        )
        .await;

        let outcome = service.clean().await.unwrap();
        assert_eq!(outcome.removed_duplicates, 1);
        assert_eq!(outcome.removed_expired, 0);

        let index = service.read_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].filename, "1_photo.jpg");
    }

    #[tokio::test]
    async fn regenerate_rebuilds_from_backend_reality() {
        let (_dir, service) = service();
        // A stale index pointing at nothing.
        service
            .write_index(&[entry("carousel_gone_x.jpg", today())])
            .await
            .unwrap();
        // Actual backend contents: two images, one non-image, plus the
        // index document itself.
        for key in ["carousel_t1_a.jpg", "carousel_t2_b.png", "carousel_t3_notes.txt"] {
            service
                .backend
                .put(key, Bytes::from_static(b"img"), "application/octet-stream")
                .await
                .unwrap();
        }

        let entries = service.regenerate().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "carousel_t1_a.jpg");
        assert_eq!(entries[1].filename, "carousel_t2_b.png");
        assert!(entries.iter().all(|e| e.expires == sentinel_expiry()));

        // Regenerate never deletes blobs.
        assert!(
            service
                .backend
                .get("carousel_t3_notes.txt")
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(service.read_index().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_on_absent_index_is_empty() {
        let (_dir, service) = service();
        assert!(service.list().await.unwrap().is_empty());
        assert!(service.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_reports_expired_entries_with_status() {
        let (_dir, service) = service();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let future = today().checked_add_days(Days::new(3)).unwrap();
        seed(
            &service,
            &[
                entry("carousel_t1_old.jpg", yesterday),
                entry("carousel_t2_new.jpg", future),
            ],
        )
        .await;

        let views = service.list().await.unwrap();
        assert_eq!(views.len(), 2);
        // Newest expiry first.
        assert_eq!(views[0].filename, "carousel_t2_new.jpg");
        assert_eq!(views[0].status, AssetStatus::Active { days_remaining: 3 });
        assert_eq!(views[1].status, AssetStatus::Expired);

        // The public surface hides the expired entry instead.
        let public = service.list_active().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].display_url, "/carousel/carousel_t2_new.jpg");
    }

    #[tokio::test]
    async fn public_listing_prefers_backend_url() {
        let (_dir, service) = service();
        let future = today().checked_add_days(Days::new(3)).unwrap();
        let mut remote = entry("carousel_t1_a.jpg", future);
        remote.url = Some("https://cdn.example.com/carousel_t1_a.jpg".into());
        seed(&service, &[remote]).await;

        let public = service.list_active().await.unwrap();
        assert_eq!(
            public[0].display_url,
            "https://cdn.example.com/carousel_t1_a.jpg"
        );
    }

    #[tokio::test]
    async fn delete_unknown_stored_name_is_not_found() {
        let (_dir, service) = service();
        let err = service.delete("carousel_t_missing.jpg").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_entry_and_blob() {
        let (_dir, service) = service();
        let future = today().checked_add_days(Days::new(3)).unwrap();
        seed(
            &service,
            &[
                entry("carousel_t1_a.jpg", future),
                entry("carousel_t2_b.jpg", future),
            ],
        )
        .await;

        service.delete("carousel_t1_a.jpg").await.unwrap();

        let index = service.read_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].filename, "carousel_t2_b.jpg");
        assert!(service.backend.get("carousel_t1_a.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_image_never_serves_the_index_document() {
        let (_dir, service) = service();
        service.write_index(&[]).await.unwrap();
        assert!(service.fetch_image(INDEX_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_image_only_serves_carousel_images() {
        let (_dir, service) = service();
        for (key, body) in [
            (".readyz-leftover", b"probe".as_slice()),
            ("carousel_t1_notes.txt", b"text".as_slice()),
            ("carousel_t2_a.jpg", b"pixels".as_slice()),
        ] {
            service
                .backend
                .put(key, Bytes::copy_from_slice(body), "application/octet-stream")
                .await
                .unwrap();
        }

        assert!(service.fetch_image(".readyz-leftover").await.unwrap().is_none());
        assert!(
            service
                .fetch_image("carousel_t1_notes.txt")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            service.fetch_image("carousel_t2_a.jpg").await.unwrap(),
            Some(Bytes::from_static(b"pixels"))
        );
    }

    #[tokio::test]
    async fn upload_accepts_originals_with_consecutive_dots() {
        let (_dir, service) = service();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let files = vec![
            ("ok.jpg".to_string(), Bytes::from_static(b"1")),
            ("a..jpg".to_string(), Bytes::from_static(b"2")),
        ];

        let outcome = service.upload(files, tomorrow).await.unwrap();
        assert_eq!(outcome.uploaded, 2);
        assert!(outcome.failures.is_empty());

        let index = service.read_index().await.unwrap();
        assert_eq!(index.len(), 2);
        for entry in &index {
            assert!(!entry.filename.contains(".."));
            assert!(service.backend.get(&entry.filename).await.unwrap().is_some());
        }
    }

    /// Delegates to a real backend but fails selected operations, for
    /// asserting that reconciliation aborts leave the index untouched.
    struct FlakyBackend {
        inner: LocalBackend,
        fail_get: bool,
        fail_list: bool,
    }

    fn offline() -> BackendError {
        BackendError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "backend offline",
        ))
    }

    #[async_trait::async_trait]
    impl StorageBackend for FlakyBackend {
        async fn put(
            &self,
            key: &str,
            bytes: Bytes,
            content_type: &str,
        ) -> crate::backend::BackendResult<StoredLocation> {
            self.inner.put(key, bytes, content_type).await
        }

        async fn get(&self, key: &str) -> crate::backend::BackendResult<Option<Bytes>> {
            if self.fail_get {
                return Err(offline());
            }
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> crate::backend::BackendResult<()> {
            self.inner.delete(key).await
        }

        async fn list(
            &self,
            prefix: &str,
        ) -> crate::backend::BackendResult<Vec<StoredLocation>> {
            if self.fail_list {
                return Err(offline());
            }
            self.inner.list(prefix).await
        }
    }

    #[tokio::test]
    async fn clean_aborts_without_index_write_when_backend_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let healthy = RegistryService::new(Arc::new(LocalBackend::new(dir.path())));
        let future = today().checked_add_days(Days::new(5)).unwrap();
        // Two entries sharing an original name: a clean that ran would
        // remove one of them.
        seed(
            &healthy,
            &[
                entry("carousel_t1_a.jpg", future),
                entry("carousel_t2_a.jpg", future),
            ],
        )
        .await;

        let flaky = RegistryService::new(Arc::new(FlakyBackend {
            inner: LocalBackend::new(dir.path()),
            fail_get: true,
            fail_list: false,
        }));
        let err = flaky.clean().await.unwrap_err();
        assert!(matches!(err, RegistryError::Backend(_)));

        // No partial write happened: the duplicate is still indexed.
        assert_eq!(healthy.read_index().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn regenerate_aborts_without_index_write_when_listing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let healthy = RegistryService::new(Arc::new(LocalBackend::new(dir.path())));
        let future = today().checked_add_days(Days::new(5)).unwrap();
        seed(&healthy, &[entry("carousel_t1_a.jpg", future)]).await;
        // An unindexed blob a successful regenerate would have picked up.
        healthy
            .backend
            .put("carousel_t2_b.png", Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();

        let flaky = RegistryService::new(Arc::new(FlakyBackend {
            inner: LocalBackend::new(dir.path()),
            fail_get: false,
            fail_list: true,
        }));
        let err = flaky.regenerate().await.unwrap_err();
        assert!(matches!(err, RegistryError::Backend(_)));

        let index = healthy.read_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].filename, "carousel_t1_a.jpg");
        assert_eq!(index[0].expires, future);
    }

    #[tokio::test]
    async fn corrupt_index_is_reported() {
        let (_dir, service) = service();
        service
            .backend
            .put(INDEX_KEY, Bytes::from_static(b"not json"), "application/json")
            .await
            .unwrap();
        let err = service.list().await.unwrap_err();
        assert!(matches!(err, RegistryError::CorruptIndex(_)));
    }

    #[tokio::test]
    async fn upload_entries_record_original_name_for_dedup() {
        let (_dir, service) = service();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let outcome = service
            .upload(
                vec![("hero banner.jpg".to_string(), Bytes::from_static(b"1"))],
                tomorrow,
            )
            .await
            .unwrap();
        assert_eq!(outcome.entries[0].original_name(), "herobanner.jpg");
    }
}
