//! The indexing pipeline.
//!
//! Collaborators enter as capability handles (traits) rather than being
//! constructed ad hoc inside each step, so tests can substitute in-memory
//! fakes for the remote services.

use async_trait::async_trait;
use tracing::{debug, info};

use fdx_models::{
    sanitize_external_id, CollectionStatus, ImageOutcome, ImageRef, IndexedFace, ProbeOutcome,
    RunSummary,
};
use fdx_storage::{StorageClient, StorageError};
use fdx_vision::{VisionClient, VisionError};

use crate::config::RunConfig;
use crate::error::{IndexerError, IndexerResult};

/// Credential check. `false` is a hard stop for the whole run.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn verify(&self) -> bool;
}

/// Object storage side of the pipeline.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Image keys in the bucket, all pages consumed, extension-filtered.
    async fn list_images(&self, bucket: &str) -> Result<Vec<String>, StorageError>;

    /// Move an object to another bucket, preserving its key.
    async fn relocate(
        &self,
        source_bucket: &str,
        key: &str,
        destination_bucket: &str,
    ) -> Result<(), StorageError>;
}

/// Face collection side of the pipeline.
#[async_trait]
pub trait FaceCollection: Send + Sync {
    async fn ensure_collection(&self, collection_id: &str)
        -> Result<CollectionStatus, VisionError>;

    async fn probe_indexed(
        &self,
        collection_id: &str,
        image: &ImageRef,
    ) -> Result<ProbeOutcome, VisionError>;

    async fn index_faces(
        &self,
        collection_id: &str,
        image: &ImageRef,
        external_id: &str,
    ) -> Result<Vec<IndexedFace>, VisionError>;
}

#[async_trait]
impl ImageStore for StorageClient {
    async fn list_images(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        StorageClient::list_images(self, bucket).await
    }

    async fn relocate(
        &self,
        source_bucket: &str,
        key: &str,
        destination_bucket: &str,
    ) -> Result<(), StorageError> {
        StorageClient::relocate(self, source_bucket, key, destination_bucket).await
    }
}

#[async_trait]
impl FaceCollection for VisionClient {
    async fn ensure_collection(
        &self,
        collection_id: &str,
    ) -> Result<CollectionStatus, VisionError> {
        VisionClient::ensure_collection(self, collection_id).await
    }

    async fn probe_indexed(
        &self,
        collection_id: &str,
        image: &ImageRef,
    ) -> Result<ProbeOutcome, VisionError> {
        VisionClient::probe_indexed(self, collection_id, image).await
    }

    async fn index_faces(
        &self,
        collection_id: &str,
        image: &ImageRef,
        external_id: &str,
    ) -> Result<Vec<IndexedFace>, VisionError> {
        VisionClient::index_faces(self, collection_id, image, external_id).await
    }
}

/// Run the whole pipeline: gate, bootstrap, list, process each image.
///
/// Images are processed one at a time; the first propagated error aborts
/// the remainder of the run.
pub async fn run<I, S, F>(
    identity: &I,
    store: &S,
    faces: &F,
    config: &RunConfig,
) -> IndexerResult<RunSummary>
where
    I: Identity + ?Sized,
    S: ImageStore + ?Sized,
    F: FaceCollection + ?Sized,
{
    if !identity.verify().await {
        return Err(IndexerError::InvalidCredentials);
    }

    match faces.ensure_collection(&config.collection_id).await? {
        CollectionStatus::Existing => {
            info!("Collection {} already exists", config.collection_id)
        }
        CollectionStatus::Created => info!("Collection {} created", config.collection_id),
    }

    let keys = store.list_images(&config.source_bucket).await?;
    info!("Found {} images in {}", keys.len(), config.source_bucket);

    let mut summary = RunSummary::default();
    for key in keys {
        let image = ImageRef::new(config.source_bucket.clone(), key);
        let outcome = process_image(store, faces, config, &image).await?;

        match &outcome {
            ImageOutcome::AlreadyIndexed => info!("Image {} is already indexed", image.key),
            ImageOutcome::Indexed(records) => {
                info!("Indexed {} faces in {}", records.len(), image.key)
            }
            ImageOutcome::Relocated => info!(
                "No faces in {}, moved to {}",
                image.key, config.no_faces_bucket
            ),
        }

        summary.record(&outcome);
    }

    Ok(summary)
}

/// Process one image: probe, index, relocate on zero faces.
///
/// An image whose probe finds a match is skipped entirely; no indexing or
/// relocation call is issued for it.
pub async fn process_image<S, F>(
    store: &S,
    faces: &F,
    config: &RunConfig,
    image: &ImageRef,
) -> IndexerResult<ImageOutcome>
where
    S: ImageStore + ?Sized,
    F: FaceCollection + ?Sized,
{
    match faces.probe_indexed(&config.collection_id, image).await? {
        ProbeOutcome::MatchFound => return Ok(ImageOutcome::AlreadyIndexed),
        ProbeOutcome::NoMatch => {}
        ProbeOutcome::Unsearchable => {
            debug!("Probe could not search {}, indexing anyway", image);
        }
    }

    let external_id = sanitize_external_id(&image.key);
    let records = faces
        .index_faces(&config.collection_id, image, &external_id)
        .await?;

    if records.is_empty() {
        store
            .relocate(&image.bucket, &image.key, &config.no_faces_bucket)
            .await?;
        return Ok(ImageOutcome::Relocated);
    }

    Ok(ImageOutcome::Indexed(records))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use fdx_models::has_image_extension;

    use super::*;

    fn test_config() -> RunConfig {
        RunConfig {
            source_bucket: "src".to_string(),
            collection_id: "people".to_string(),
            no_faces_bucket: "no-faces".to_string(),
        }
    }

    struct FakeIdentity {
        valid: bool,
        calls: AtomicUsize,
    }

    impl FakeIdentity {
        fn new(valid: bool) -> Self {
            Self {
                valid,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Identity for FakeIdentity {
        async fn verify(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.valid
        }
    }

    /// In-memory buckets; listing preserves insertion order like S3's
    /// stable key order.
    #[derive(Default)]
    struct FakeStore {
        buckets: Mutex<BTreeMap<String, Vec<String>>>,
        list_calls: AtomicUsize,
        relocations: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeStore {
        fn with_images(bucket: &str, keys: &[&str]) -> Self {
            let store = Self::default();
            store.buckets.lock().unwrap().insert(
                bucket.to_string(),
                keys.iter().map(|k| k.to_string()).collect(),
            );
            store
        }

        fn holds(&self, bucket: &str, key: &str) -> bool {
            self.buckets
                .lock()
                .unwrap()
                .get(bucket)
                .is_some_and(|keys| keys.iter().any(|k| k == key))
        }
    }

    #[async_trait]
    impl ImageStore for FakeStore {
        async fn list_images(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .buckets
                .lock()
                .unwrap()
                .get(bucket)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|k| has_image_extension(k))
                .collect())
        }

        async fn relocate(
            &self,
            source_bucket: &str,
            key: &str,
            destination_bucket: &str,
        ) -> Result<(), StorageError> {
            self.relocations.lock().unwrap().push((
                source_bucket.to_string(),
                key.to_string(),
                destination_bucket.to_string(),
            ));
            let mut buckets = self.buckets.lock().unwrap();
            if let Some(keys) = buckets.get_mut(source_bucket) {
                keys.retain(|k| k != key);
            }
            buckets
                .entry(destination_bucket.to_string())
                .or_default()
                .push(key.to_string());
            Ok(())
        }
    }

    /// Remote collection state plus call recording.
    #[derive(Default)]
    struct FakeFaces {
        collections: Mutex<BTreeSet<String>>,
        create_calls: AtomicUsize,
        already_exists_observations: AtomicUsize,
        probes: Mutex<BTreeMap<String, ProbeOutcome>>,
        face_counts: Mutex<BTreeMap<String, usize>>,
        index_calls: Mutex<Vec<String>>,
    }

    impl FakeFaces {
        fn probe_result(self, key: &str, outcome: ProbeOutcome) -> Self {
            self.probes.lock().unwrap().insert(key.to_string(), outcome);
            self
        }

        fn face_count(self, key: &str, count: usize) -> Self {
            self.face_counts
                .lock()
                .unwrap()
                .insert(key.to_string(), count);
            self
        }
    }

    #[async_trait]
    impl FaceCollection for FakeFaces {
        async fn ensure_collection(
            &self,
            collection_id: &str,
        ) -> Result<CollectionStatus, VisionError> {
            let mut collections = self.collections.lock().unwrap();
            if collections.contains(collection_id) {
                self.already_exists_observations
                    .fetch_add(1, Ordering::SeqCst);
                Ok(CollectionStatus::Existing)
            } else {
                collections.insert(collection_id.to_string());
                self.create_calls.fetch_add(1, Ordering::SeqCst);
                Ok(CollectionStatus::Created)
            }
        }

        async fn probe_indexed(
            &self,
            _collection_id: &str,
            image: &ImageRef,
        ) -> Result<ProbeOutcome, VisionError> {
            Ok(self
                .probes
                .lock()
                .unwrap()
                .get(&image.key)
                .copied()
                .unwrap_or(ProbeOutcome::NoMatch))
        }

        async fn index_faces(
            &self,
            _collection_id: &str,
            image: &ImageRef,
            external_id: &str,
        ) -> Result<Vec<IndexedFace>, VisionError> {
            self.index_calls.lock().unwrap().push(external_id.to_string());
            let count = self
                .face_counts
                .lock()
                .unwrap()
                .get(&image.key)
                .copied()
                .unwrap_or(1);
            Ok((0..count)
                .map(|i| IndexedFace {
                    face_id: Some(format!("face-{}", i)),
                    external_image_id: Some(external_id.to_string()),
                    confidence: Some(99.0),
                    bounding_box: None,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_failed_credential_gate_stops_everything() {
        let identity = FakeIdentity::new(false);
        let store = FakeStore::with_images("src", &["a.png"]);
        let faces = FakeFaces::default();

        let err = run(&identity, &store, &faces, &test_config())
            .await
            .unwrap_err();

        assert!(matches!(err, IndexerError::InvalidCredentials));
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(faces.create_calls.load(Ordering::SeqCst), 0);
        assert!(faces.index_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_creates_once_across_runs() {
        let identity = FakeIdentity::new(true);
        let store = FakeStore::default();
        let faces = FakeFaces::default();
        let config = test_config();

        run(&identity, &store, &faces, &config).await.unwrap();
        run(&identity, &store, &faces, &config).await.unwrap();

        assert_eq!(faces.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(faces.already_exists_observations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_bucket_is_an_empty_run() {
        let identity = FakeIdentity::new(true);
        let store = FakeStore::default();
        let faces = FakeFaces::default();

        let summary = run(&identity, &store, &faces, &test_config())
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn test_non_images_are_never_processed() {
        let identity = FakeIdentity::new(true);
        let store = FakeStore::with_images("src", &["a.png", "b.txt", "C.JPG"]);
        let faces = FakeFaces::default();

        let summary = run(&identity, &store, &faces, &test_config())
            .await
            .unwrap();

        assert_eq!(summary.images_seen, 2);
        assert_eq!(
            *faces.index_calls.lock().unwrap(),
            vec!["a.png".to_string(), "C.JPG".to_string()]
        );
    }

    #[tokio::test]
    async fn test_already_indexed_image_short_circuits() {
        let store = FakeStore::with_images("src", &["a.png"]);
        let faces = FakeFaces::default().probe_result("a.png", ProbeOutcome::MatchFound);
        let config = test_config();

        let outcome = process_image(&store, &faces, &config, &ImageRef::new("src", "a.png"))
            .await
            .unwrap();

        assert_eq!(outcome, ImageOutcome::AlreadyIndexed);
        assert_eq!(outcome.face_count(), 0);
        assert!(faces.index_calls.lock().unwrap().is_empty());
        assert!(store.relocations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsearchable_probe_still_indexes() {
        let store = FakeStore::with_images("src", &["a.png"]);
        let faces = FakeFaces::default().probe_result("a.png", ProbeOutcome::Unsearchable);
        let config = test_config();

        let outcome = process_image(&store, &faces, &config, &ImageRef::new("src", "a.png"))
            .await
            .unwrap();

        assert_eq!(outcome.face_count(), 1);
        assert_eq!(faces.index_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_faces_moves_image_to_no_faces_bucket() {
        let identity = FakeIdentity::new(true);
        let store = FakeStore::with_images("src", &["empty.jpg"]);
        let faces = FakeFaces::default().face_count("empty.jpg", 0);

        let summary = run(&identity, &store, &faces, &test_config())
            .await
            .unwrap();

        assert_eq!(summary.relocated, 1);
        assert_eq!(summary.faces_indexed, 0);
        assert!(store.holds("no-faces", "empty.jpg"));
        assert!(!store.holds("src", "empty.jpg"));
        assert_eq!(
            *store.relocations.lock().unwrap(),
            vec![(
                "src".to_string(),
                "empty.jpg".to_string(),
                "no-faces".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_external_id_is_sanitized_key() {
        let identity = FakeIdentity::new(true);
        let store = FakeStore::with_images("src", &["photos/team photo.png"]);
        let faces = FakeFaces::default();

        let summary = run(&identity, &store, &faces, &test_config())
            .await
            .unwrap();

        assert_eq!(summary.faces_indexed, 1);
        assert_eq!(
            *faces.index_calls.lock().unwrap(),
            vec!["photos_team_photo.png".to_string()]
        );
    }
}
