//! Re-run-safe object relocation.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Primitive object operations the relocation step is built from.
///
/// [`StorageClient`](crate::client::StorageClient) implements this against
/// S3; tests substitute an in-memory store.
#[async_trait]
pub trait ObjectOps: Send + Sync {
    async fn object_exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;

    async fn copy_object(
        &self,
        source_bucket: &str,
        key: &str,
        destination_bucket: &str,
    ) -> StorageResult<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Move an object between buckets, preserving its key.
///
/// Safe to re-run after a crash: the copy is skipped when the destination
/// already holds the key, and the source is only deleted once the
/// destination copy is confirmed. An interrupted move can leave the object
/// in both buckets, never in neither; the next run converges.
pub async fn relocate_object<O: ObjectOps + ?Sized>(
    ops: &O,
    source_bucket: &str,
    key: &str,
    destination_bucket: &str,
) -> StorageResult<()> {
    if ops.object_exists(destination_bucket, key).await? {
        debug!(
            "{} already present in {}, skipping copy",
            key, destination_bucket
        );
    } else {
        ops.copy_object(source_bucket, key, destination_bucket).await?;
        if !ops.object_exists(destination_bucket, key).await? {
            return Err(StorageError::copy_failed(format!(
                "{} did not appear in {} after copy",
                key, destination_bucket
            )));
        }
    }

    ops.delete_object(source_bucket, key).await?;

    info!(
        "Moved {} from {} to {}",
        key, source_bucket, destination_bucket
    );
    Ok(())
}
