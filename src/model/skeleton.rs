//! Skeleton instances and their identifiers.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use skat_rig::SkeletonRig;

use super::{AnnotationIssue, AnnotationRecord, KeypointState, SkeletonRecord};

/// Unique identifier for a skeleton instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkeletonId(pub u64);

impl fmt::Display for SkeletonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out skeleton ids. Ids are never reused within a session, even after
/// the skeleton that held one is deleted.
#[derive(Debug, Clone)]
pub struct SkeletonIdGenerator {
    next: u64,
}

impl Default for SkeletonIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SkeletonIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> SkeletonId {
        let id = SkeletonId(self.next);
        self.next += 1;
        id
    }
}

/// One skeleton instance: a keypoint per class plus display options.
#[derive(Debug, Clone, Serialize)]
pub struct SkeletonState {
    pub id: SkeletonId,
    pub name: Option<String>,
    /// Whether the operator may move or place this skeleton's keypoints
    pub editable: bool,
    pub line_color: Option<String>,
    #[serde(skip)]
    pub rig: Rc<SkeletonRig>,
    /// One entry per keypoint class, in class order
    pub keypoints: Vec<KeypointState>,
    pub show_keypoints: bool,
    pub show_lines: bool,
    pub annotation_issues: Vec<AnnotationIssue>,
}

impl SkeletonState {
    /// Create an editable, visible skeleton.
    pub fn new(id: SkeletonId, rig: Rc<SkeletonRig>, keypoints: Vec<KeypointState>) -> Self {
        Self {
            id,
            name: None,
            editable: true,
            line_color: None,
            rig,
            keypoints,
            show_keypoints: true,
            show_lines: true,
            annotation_issues: Vec::new(),
        }
    }

    pub fn keypoint(&self, label: &str) -> Option<&KeypointState> {
        self.keypoints.iter().find(|k| k.label == label)
    }

    pub fn keypoint_mut(&mut self, label: &str) -> Option<&mut KeypointState> {
        self.keypoints.iter_mut().find(|k| k.label == label)
    }

    /// Number of keypoints with coordinates.
    pub fn placed_count(&self) -> usize {
        self.keypoints.iter().filter(|k| k.has_xy()).count()
    }

    /// Panel title for the skeleton at display position `position` (0-based).
    pub fn display_title(&self, position: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("Skeleton {}: {}", position + 1, name),
            _ => format!("Skeleton {}", position + 1),
        }
    }

    /// Submission record, omitting unplaced keypoints.
    pub fn to_record(&self) -> SkeletonRecord {
        SkeletonRecord {
            name: self.name.clone().unwrap_or_default(),
            annotations: self
                .keypoints
                .iter()
                .filter_map(|k| {
                    let (x, y) = k.position()?;
                    Some(AnnotationRecord {
                        label: k.label.clone(),
                        x,
                        y,
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> SkeletonState {
        SkeletonState::new(
            SkeletonId(7),
            Rc::new(SkeletonRig::default()),
            vec![KeypointState::new("A", "#111111"), KeypointState::new("B", "#222222")],
        )
    }

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = SkeletonIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, SkeletonId(1));
        assert!(b > a);
    }

    #[test]
    fn test_to_record_omits_unplaced() {
        let mut sk = skeleton();
        sk.keypoint_mut("B").unwrap().set_position(4, 9);
        let record = sk.to_record();
        assert_eq!(record.name, "");
        assert_eq!(
            record.annotations,
            vec![AnnotationRecord {
                label: "B".to_string(),
                x: 4,
                y: 9
            }]
        );
        assert_eq!(sk.placed_count(), 1);
    }

    #[test]
    fn test_display_title() {
        let mut sk = skeleton();
        assert_eq!(sk.display_title(0), "Skeleton 1");
        sk.name = Some("left player".to_string());
        assert_eq!(sk.display_title(2), "Skeleton 3: left player");
    }
}
