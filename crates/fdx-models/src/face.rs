//! Indexed face summaries and the reverse-search probe outcome.

use serde::{Deserialize, Serialize};

/// Relative bounding box of a detected face within its image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
}

/// Summary of one face produced by an indexing call.
///
/// Decoupled from the vision service's response types; fields the service
/// did not populate stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFace {
    /// Service-assigned face id
    pub face_id: Option<String>,
    /// Caller-supplied external image id the face was tagged with
    pub external_image_id: Option<String>,
    /// Detection confidence (percent)
    pub confidence: Option<f32>,
    /// Where the face sits in the image
    pub bounding_box: Option<BoundingBox>,
}

/// Outcome of probing a collection with an image (reverse search).
///
/// `Unsearchable` is the case where the service rejected the probe itself,
/// typically because the image holds no searchable face. The pipeline treats
/// it like `NoMatch` but keeps the distinction visible instead of conflating
/// the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// At least one already-indexed face matches the image
    MatchFound,
    /// The search ran and found nothing
    NoMatch,
    /// The service could not run the search against this image
    Unsearchable,
}

impl ProbeOutcome {
    /// True iff the image counts as already indexed.
    pub fn is_indexed(self) -> bool {
        matches!(self, ProbeOutcome::MatchFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_a_match_counts_as_indexed() {
        assert!(ProbeOutcome::MatchFound.is_indexed());
        assert!(!ProbeOutcome::NoMatch.is_indexed());
        assert!(!ProbeOutcome::Unsearchable.is_indexed());
    }
}
