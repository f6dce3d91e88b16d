//! Serialized annotation records, shared by task input and submission output.

use serde::{Deserialize, Serialize};

/// One placed keypoint as exchanged with the labeling platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub label: String,
    pub x: i32,
    pub y: i32,
}

/// All placed keypoints of one skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonRecord {
    /// Skeleton name, empty when unnamed
    #[serde(default)]
    pub name: String,
    pub annotations: Vec<AnnotationRecord>,
}

/// A reviewer note attached to a task or to a prior annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationIssue {
    pub reason: String,
}
