//! S3 storage client for the facedex pipeline.
//!
//! This crate provides:
//! - Paginated image listing with extension filtering
//! - Object existence probes
//! - Re-run-safe relocation between buckets (copy, verify, delete)

pub mod client;
pub mod error;
pub mod relocate;

pub use client::{filter_image_keys, StorageClient};
pub use error::{StorageError, StorageResult};
pub use relocate::{relocate_object, ObjectOps};
