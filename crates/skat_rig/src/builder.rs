//! Rig authoring model.
//!
//! The authoring tool lets an operator drop keypoints on a blank canvas,
//! connect them, rename them and export the result as the
//! `skeletonBoundingBox` / `keypointClasses` / `skeletonRig` triple used to
//! configure an annotation task.

use serde::{Deserialize, Serialize};

use crate::rig::check_unique_labels;
use crate::{BoundingBox, KeypointClass, RigConnection, RigError, SkeletonRig, palette_color};

/// A keypoint placed in the authoring canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredKeypoint {
    pub label: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
}

/// Exported rig definition, normalized so the bounding box starts at the
/// origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigExport {
    pub skeleton_bounding_box: BoundingBox,
    pub keypoint_classes: Vec<KeypointClass>,
    pub skeleton_rig: SkeletonRig,
}

impl RigExport {
    /// Serialize the export to pretty JSON.
    pub fn to_json(&self) -> Result<String, RigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Editable rig under construction.
#[derive(Debug, Clone, Default)]
pub struct RigBuilder {
    keypoints: Vec<AuthoredKeypoint>,
    connections: Vec<(String, String)>,
    keypoint_count: usize,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keypoint at a position. Labels are `keypoint N` with a counter
    /// that never decreases, so deleting a keypoint does not recycle its name.
    pub fn add_keypoint(&mut self, x: f64, y: f64) -> &AuthoredKeypoint {
        self.keypoint_count += 1;
        let keypoint = AuthoredKeypoint {
            label: format!("keypoint {}", self.keypoint_count),
            color: palette_color(self.keypoint_count).to_string(),
            x,
            y,
        };
        log::debug!("Rig: added '{}' at ({}, {})", keypoint.label, x, y);
        let index = self.keypoints.len();
        self.keypoints.push(keypoint);
        &self.keypoints[index]
    }

    pub fn keypoints(&self) -> &[AuthoredKeypoint] {
        &self.keypoints
    }

    /// Connected label pairs, in creation order.
    pub fn connections(&self) -> &[(String, String)] {
        &self.connections
    }

    fn position(&self, label: &str) -> Result<usize, RigError> {
        self.keypoints
            .iter()
            .position(|k| k.label == label)
            .ok_or_else(|| RigError::KeypointNotFound {
                label: label.to_string(),
            })
    }

    /// Move a keypoint.
    pub fn move_keypoint(&mut self, label: &str, x: f64, y: f64) -> Result<(), RigError> {
        let index = self.position(label)?;
        self.keypoints[index].x = x;
        self.keypoints[index].y = y;
        Ok(())
    }

    /// Rename a keypoint, carrying its connections along.
    pub fn rename_keypoint(&mut self, label: &str, new_label: &str) -> Result<(), RigError> {
        let index = self.position(label)?;
        if label == new_label {
            return Ok(());
        }
        if self.keypoints.iter().any(|k| k.label == new_label) {
            return Err(RigError::DuplicateLabel {
                label: new_label.to_string(),
            });
        }
        self.keypoints[index].label = new_label.to_string();
        for (a, b) in &mut self.connections {
            if a == label {
                *a = new_label.to_string();
            }
            if b == label {
                *b = new_label.to_string();
            }
        }
        Ok(())
    }

    /// Delete a keypoint and every connection that uses it.
    pub fn delete_keypoint(&mut self, label: &str) -> Result<AuthoredKeypoint, RigError> {
        let index = self.position(label)?;
        let removed = self.keypoints.remove(index);
        let before = self.connections.len();
        self.connections.retain(|(a, b)| a != label && b != label);
        log::debug!(
            "Rig: deleted '{}' and {} connection(s)",
            label,
            before - self.connections.len()
        );
        Ok(removed)
    }

    /// Connect two keypoints. Connecting an already connected pair (in either
    /// order) is a no-op and returns `false`.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<bool, RigError> {
        if a == b {
            return Err(RigError::SelfConnection {
                label: a.to_string(),
            });
        }
        self.position(a)?;
        self.position(b)?;
        let exists = self
            .connections
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a));
        if exists {
            return Ok(false);
        }
        self.connections.push((a.to_string(), b.to_string()));
        Ok(true)
    }

    /// Remove the connection between two keypoints, in either order.
    pub fn disconnect(&mut self, a: &str, b: &str) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|(x, y)| !((x == a && y == b) || (x == b && y == a)));
        before != self.connections.len()
    }

    /// Export the rig with its bounding box moved to the origin.
    pub fn export(&self) -> Result<RigExport, RigError> {
        check_unique_labels(self.keypoints.iter().map(|k| k.label.as_str()))?;
        let bbox = BoundingBox::enclosing(self.keypoints.iter().map(|k| (k.x, k.y)))
            .ok_or(RigError::Empty)?;

        let keypoint_classes = self
            .keypoints
            .iter()
            .map(|k| {
                KeypointClass::new(k.label.clone())
                    .with_color(k.color.clone())
                    .with_position(k.x - bbox.left, k.y - bbox.top)
            })
            .collect();
        let skeleton_rig = SkeletonRig::new(
            self.connections
                .iter()
                .map(|(a, b)| RigConnection::new(a.clone(), b.clone()))
                .collect(),
        );

        Ok(RigExport {
            skeleton_bounding_box: BoundingBox::new(0.0, 0.0, bbox.width(), bbox.height()),
            keypoint_classes,
            skeleton_rig,
        })
    }
}
