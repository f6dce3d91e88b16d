//! Error types for rig validation and authoring.

use thiserror::Error;

/// Errors raised while validating or authoring a skeleton rig.
#[derive(Error, Debug)]
pub enum RigError {
    /// A connection references a label that is not a keypoint class
    #[error("Rig connection references unknown keypoint class '{label}'")]
    UnknownLabel {
        /// The label that could not be resolved
        label: String,
    },

    /// Two keypoint classes share a label
    #[error("Duplicate keypoint class label '{label}'")]
    DuplicateLabel {
        /// The repeated label
        label: String,
    },

    /// A connection must name two endpoints and an optional color
    #[error("Invalid rig connection: {message}")]
    InvalidConnection {
        /// Description of the problem
        message: String,
    },

    /// A connection from a keypoint to itself
    #[error("Keypoint '{label}' cannot be connected to itself")]
    SelfConnection {
        /// The keypoint label
        label: String,
    },

    /// Authoring operation on a keypoint that does not exist
    #[error("Keypoint '{label}' not found")]
    KeypointNotFound {
        /// The missing label
        label: String,
    },

    /// Exporting a rig with no keypoints
    #[error("Rig has no keypoints")]
    Empty,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RigError {
    /// Create an invalid connection error.
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::InvalidConnection {
            message: message.into(),
        }
    }

    /// Create an unknown label error.
    pub fn unknown_label(label: impl Into<String>) -> Self {
        Self::UnknownLabel {
            label: label.into(),
        }
    }
}
