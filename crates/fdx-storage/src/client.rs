//! S3 client implementation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use tracing::debug;

use fdx_models::has_image_extension;

use crate::error::{StorageError, StorageResult};
use crate::relocate::{relocate_object, ObjectOps};

/// S3-backed storage client.
///
/// Holds no bucket of its own; every operation names its bucket explicitly
/// because the pipeline works across a source and a no-faces bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
}

impl StorageClient {
    /// Create a client from the shared AWS configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// List image keys in a bucket, in the order the service returns them.
    ///
    /// Pagination is consumed transparently. An empty bucket yields an
    /// empty vec, not an error.
    pub async fn list_images(&self, bucket: &str) -> StorageResult<Vec<String>> {
        debug!("Listing images in {}", bucket);

        let mut images = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;

            if let Some(ref contents) = response.contents {
                images.extend(filter_image_keys(
                    contents.iter().filter_map(|obj| obj.key.clone()),
                ));
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(images)
    }

    /// Names of all buckets visible to the current credentials.
    ///
    /// Used by the selfcheck binary as a cheap end-to-end smoke call.
    pub async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    /// Move an object to another bucket, preserving its key.
    ///
    /// See [`relocate_object`] for the re-run-safe copy/verify/delete order.
    pub async fn relocate(
        &self,
        source_bucket: &str,
        key: &str,
        destination_bucket: &str,
    ) -> StorageResult<()> {
        relocate_object(self, source_bucket, key, destination_bucket).await
    }
}

/// Keep only keys with an image extension, preserving order.
///
/// Applied per listing page, so the result order is independent of how the
/// service splits pages.
pub fn filter_image_keys<I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter().filter(|k| has_image_extension(k)).collect()
}

#[async_trait]
impl ObjectOps for StorageClient {
    async fn object_exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(err.to_string()))
                }
            }
        }
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        key: &str,
        destination_bucket: &str,
    ) -> StorageResult<()> {
        debug!(
            "Copying {} from {} to {}",
            key, source_bucket, destination_bucket
        );

        // CopySource takes "bucket/key" with the key URL-encoded.
        let copy_source = format!("{}/{}", source_bucket, urlencoding::encode(key));

        self.client
            .copy_object()
            .copy_source(copy_source)
            .bucket(destination_bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::copy_failed(e.to_string()))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        debug!("Deleting {} from {}", key, bucket);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        Ok(())
    }
}
