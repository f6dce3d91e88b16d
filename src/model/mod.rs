//! Data models for the SKAT annotation engine.

mod keypoint;
mod record;
mod skeleton;

pub use keypoint::{DrawStyle, KeypointState};
pub use record::{AnnotationIssue, AnnotationRecord, SkeletonRecord};
pub use skeleton::{SkeletonId, SkeletonIdGenerator, SkeletonState};
