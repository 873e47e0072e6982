//! Rekognition face collection client for the facedex pipeline.
//!
//! This crate provides:
//! - Idempotent collection bootstrap (describe, create on not-found)
//! - Reverse-search probe for already-indexed images
//! - Face indexing with external image id tagging

pub mod client;
pub mod error;

pub use client::VisionClient;
pub use error::{VisionError, VisionResult};
