//! Face indexing pipeline.
//!
//! This crate provides:
//! - The credential gate (STS caller identity)
//! - The sequential indexing pipeline over capability traits
//! - Run configuration from env vars or interactive prompts

pub mod config;
pub mod error;
pub mod identity;
pub mod pipeline;

pub use config::RunConfig;
pub use error::{IndexerError, IndexerResult};
pub use identity::StsIdentity;
pub use pipeline::{FaceCollection, Identity, ImageStore};
