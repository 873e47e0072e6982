//! Shared data models for the facedex pipeline.
//!
//! This crate provides SDK-free types for:
//! - Image references and the image extension allow-list
//! - External image id sanitization
//! - Indexed face summaries
//! - Probe and per-image outcomes, run summary counters

pub mod external_id;
pub mod face;
pub mod image;
pub mod outcome;

// Re-export common types
pub use external_id::sanitize_external_id;
pub use face::{BoundingBox, IndexedFace, ProbeOutcome};
pub use image::{has_image_extension, ImageRef, IMAGE_EXTENSIONS};
pub use outcome::{CollectionStatus, ImageOutcome, RunSummary};
