//! Shared skeleton rig schema for SKAT.
//!
//! This crate holds the data types that both the annotation engine and the
//! rig authoring tool agree on: keypoint classes, rig connections, the rig's
//! natural bounding box and the fixed color palette. It also contains
//! [`RigBuilder`], the model behind the rig authoring tool, which produces
//! a [`RigExport`] that can be fed straight into an annotation task.

mod builder;
mod error;
mod palette;
mod rig;

pub use builder::{AuthoredKeypoint, RigBuilder, RigExport};
pub use error::RigError;
pub use palette::{COLORS, palette_color};
pub use rig::{BoundingBox, KeypointClass, RigConnection, SkeletonRig};
