//! Scenario tests for the annotation engine.
//!
//! These drive a whole [`SkeletonAnnotator`] through events and commands the
//! way a host would, and check the model, the scene and the undo history.

mod scenario_tests;

use skat_rig::KeypointClass;

use crate::annotator::SkeletonAnnotator;
use crate::config::{MemoryPreferenceStore, TaskConfig};
use crate::input::Event;
use crate::transform::Point;

/// Container and image edge length used by the helpers; the image maps 1:1
/// onto the canvas.
pub(crate) const CANVAS_SIZE: u32 = 200;

/// A task with the given classes, no rig and no prior annotations.
pub(crate) fn config_with_classes(labels: &[&str]) -> TaskConfig {
    TaskConfig {
        img_src: "s3://bucket/task/image.png".to_string(),
        keypoint_classes: labels.iter().map(|l| KeypointClass::new(*l)).collect(),
        skeleton_rig: Default::default(),
        skeleton_bounding_box: None,
        initial_values: Vec::new(),
        raw_initial_values: None,
        annotation_issues: Vec::new(),
        unique_skeleton_colors: None,
    }
}

/// Classes `A` and `B` joined by one rig line, optionally with a custom rig.
pub(crate) fn two_class_config(rig: Option<&str>) -> TaskConfig {
    let mut config = config_with_classes(&["A", "B"]);
    config.skeleton_rig = serde_json::from_str(rig.unwrap_or(r#"[["A","B",null]]"#)).unwrap();
    config
}

/// Annotator whose image is still loading.
pub(crate) fn annotator(config: TaskConfig) -> SkeletonAnnotator {
    let size = f64::from(CANVAS_SIZE);
    SkeletonAnnotator::new(config, Box::new(MemoryPreferenceStore::new()), (size, size))
}

/// Annotator with a loaded image the size of its container.
pub(crate) fn annotator_with_image(config: TaskConfig) -> SkeletonAnnotator {
    let mut annotator = annotator(config);
    annotator.image_loaded(CANVAS_SIZE, CANVAS_SIZE).unwrap();
    annotator
}

/// Press and release without moving.
pub(crate) fn click(annotator: &mut SkeletonAnnotator, x: f64, y: f64) {
    let position = Point::new(x, y);
    annotator
        .handle_event(Event::PointerDown {
            position,
            timestamp_ms: 0,
        })
        .unwrap();
    annotator
        .handle_event(Event::PointerUp {
            position,
            timestamp_ms: 20,
        })
        .unwrap();
}

/// Check that no (skeleton, class) pair has more than one marker.
pub(crate) fn assert_unique_markers(annotator: &SkeletonAnnotator) {
    let mut seen = std::collections::HashSet::new();
    for (_, marker) in annotator.scene().markers() {
        assert!(
            seen.insert((marker.skeleton, marker.label.clone())),
            "duplicate marker for skeleton {} class {}",
            marker.skeleton,
            marker.label
        );
    }
}
