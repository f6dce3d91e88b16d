//! Errors surfaced by the annotator.
//!
//! Only configuration and image-load failures are errors; everything else an
//! operator can trigger (placing on a locked skeleton, undo with empty history,
//! deleting with nothing selected) is a silent no-op.

use crate::config::ConfigError;

/// Errors that stop or reject an annotator operation.
#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    /// Task attributes are missing, malformed or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The base image could not be loaded
    #[error("Failed to load image '{src}': {reason}")]
    ImageLoad { src: String, reason: String },

    /// Drawing a skeleton needs the rig's authored bounding box
    #[error(
        "A skeletonBoundingBox is required to draw a skeleton rig. Please add the skeletonBoundingBox attribute to the task."
    )]
    MissingBoundingBox,

    /// Submission output could not be encoded
    #[error("Failed to encode annotations: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The image has not finished loading, or failed to load
    #[error("The annotator is not ready: {0}")]
    NotReady(String),
}

impl AnnotatorError {
    /// Create an image load error.
    pub fn image_load(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImageLoad {
            src: src.into(),
            reason: reason.into(),
        }
    }
}
