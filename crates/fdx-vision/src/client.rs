//! Rekognition client implementation.

use aws_config::SdkConfig;
use aws_sdk_rekognition::types::{Attribute, FaceRecord, Image, S3Object};
use aws_sdk_rekognition::Client;
use tracing::debug;

use fdx_models::{BoundingBox, CollectionStatus, ImageRef, IndexedFace, ProbeOutcome};

use crate::error::{VisionError, VisionResult};

/// Rekognition-backed face collection client.
#[derive(Clone)]
pub struct VisionClient {
    client: Client,
}

impl VisionClient {
    /// Create a client from the shared AWS configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Make sure the collection exists, creating it when it does not.
    ///
    /// Only the not-found error class is absorbed; anything else (bad name,
    /// permissions, throttling) propagates. Safe to call on every run.
    pub async fn ensure_collection(&self, collection_id: &str) -> VisionResult<CollectionStatus> {
        match self
            .client
            .describe_collection()
            .collection_id(collection_id)
            .send()
            .await
        {
            Ok(_) => {
                debug!("Collection {} already exists", collection_id);
                Ok(CollectionStatus::Existing)
            }
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_resource_not_found_exception())
                    .unwrap_or(false);
                if !not_found {
                    return Err(VisionError::collection_failed(err.to_string()));
                }

                self.client
                    .create_collection()
                    .collection_id(collection_id)
                    .send()
                    .await
                    .map_err(|e| VisionError::collection_failed(e.to_string()))?;

                debug!("Collection {} created", collection_id);
                Ok(CollectionStatus::Created)
            }
        }
    }

    /// Probe the collection with the image itself, requesting at most one
    /// match.
    ///
    /// A rejected probe (the service found nothing searchable in the image)
    /// comes back as [`ProbeOutcome::Unsearchable`] rather than an error.
    pub async fn probe_indexed(
        &self,
        collection_id: &str,
        image: &ImageRef,
    ) -> VisionResult<ProbeOutcome> {
        let result = self
            .client
            .search_faces_by_image()
            .collection_id(collection_id)
            .image(s3_image(image))
            .max_faces(1)
            .send()
            .await;

        match result {
            Ok(response) => {
                if response.face_matches().is_empty() {
                    Ok(ProbeOutcome::NoMatch)
                } else {
                    Ok(ProbeOutcome::MatchFound)
                }
            }
            Err(err) => {
                let invalid_parameter = err
                    .as_service_error()
                    .map(|e| e.is_invalid_parameter_exception())
                    .unwrap_or(false);
                if invalid_parameter {
                    debug!("Search rejected {}, treating as not indexed", image);
                    Ok(ProbeOutcome::Unsearchable)
                } else {
                    Err(VisionError::search_failed(err.to_string()))
                }
            }
        }
    }

    /// Index the faces in an image, tagging them with the external id.
    ///
    /// Requests all detection attributes. Zero returned records means the
    /// service found no faces.
    pub async fn index_faces(
        &self,
        collection_id: &str,
        image: &ImageRef,
        external_id: &str,
    ) -> VisionResult<Vec<IndexedFace>> {
        debug!("Indexing {} as {}", image, external_id);

        let response = self
            .client
            .index_faces()
            .collection_id(collection_id)
            .image(s3_image(image))
            .external_image_id(external_id)
            .detection_attributes(Attribute::All)
            .send()
            .await
            .map_err(|e| VisionError::index_failed(e.to_string()))?;

        Ok(response.face_records().iter().map(to_indexed_face).collect())
    }
}

fn s3_image(image: &ImageRef) -> Image {
    Image::builder()
        .s3_object(
            S3Object::builder()
                .bucket(&image.bucket)
                .name(&image.key)
                .build(),
        )
        .build()
}

fn to_indexed_face(record: &FaceRecord) -> IndexedFace {
    let face = record.face();
    IndexedFace {
        face_id: face.and_then(|f| f.face_id()).map(str::to_string),
        external_image_id: face.and_then(|f| f.external_image_id()).map(str::to_string),
        confidence: face.and_then(|f| f.confidence()),
        bounding_box: face.and_then(|f| f.bounding_box()).map(|b| BoundingBox {
            width: b.width().unwrap_or_default(),
            height: b.height().unwrap_or_default(),
            left: b.left().unwrap_or_default(),
            top: b.top().unwrap_or_default(),
        }),
    }
}
