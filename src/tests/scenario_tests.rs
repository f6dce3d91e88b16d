//! End-to-end scenarios: placing, hydrating, navigating and zooming.

use crate::annotator::SkeletonAnnotator;
use crate::config::{MemoryPreferenceStore, PreferenceStore, Preferences};
use crate::constants::DEFAULT_LINE_COLOR;
use crate::error::AnnotatorError;
use crate::input::Event;
use crate::mode::ActionMode;
use crate::model::SkeletonId;
use crate::tests::{
    annotator, annotator_with_image, assert_unique_markers, click, config_with_classes,
    two_class_config,
};
use crate::transform::{ImagePlacement, Point};

const EPSILON: f64 = 1e-9;

#[test]
fn test_coordinate_round_trip() {
    let placements = [
        ImagePlacement::fit(640, 480, 800.0, 600.0),
        ImagePlacement::fit(1920, 1080, 800.0, 600.0),
        ImagePlacement::fit(300, 900, 1024.0, 768.0),
        ImagePlacement::fit(50, 50, 800.0, 600.0),
    ];
    for placement in &placements {
        for (x, y) in [(0.0, 0.0), (12.0, 7.0), (49.0, 33.5)] {
            for diameter in [1.0, 5.0, 20.0] {
                let anchor = placement.image_to_canvas(x, y, diameter);
                let (bx, by) = placement.canvas_to_image(anchor.x, anchor.y, diameter);
                assert!((bx - x).abs() < EPSILON, "x {x} -> {bx} for {placement:?}");
                assert!((by - y).abs() < EPSILON, "y {y} -> {by} for {placement:?}");
            }
        }
    }
}

#[test]
fn test_pointer_maps_back_to_placed_pixel() {
    let placement = ImagePlacement::fit(640, 480, 800.0, 600.0);
    for (x, y) in [(0, 0), (5, 5), (320, 240), (639, 479)] {
        let canvas = placement.image_point_to_canvas(f64::from(x), f64::from(y));
        assert_eq!(placement.pointer_to_image(canvas), (x, y));
    }
}

#[test]
fn test_two_placed_keypoints_draw_one_line_through_centers() {
    let mut annotator = annotator_with_image(two_class_config(None));
    let skeleton = annotator.add_new_skeleton();
    click(&mut annotator, 10.0, 10.0);
    click(&mut annotator, 20.0, 10.0);

    let placed = annotator.skeleton(skeleton).unwrap();
    assert_eq!(placed.keypoint("A").unwrap().position(), Some((10, 10)));
    assert_eq!(placed.keypoint("B").unwrap().position(), Some((20, 10)));

    let lines: Vec<_> = annotator.scene().lines().map(|(_, l)| l.clone()).collect();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line.color, DEFAULT_LINE_COLOR);
    assert_eq!(line.start, Point::new(10.0, 10.0));
    assert_eq!(line.end, Point::new(20.0, 10.0));

    let (_, a) = annotator.scene().find_marker(skeleton, "A").unwrap();
    let (_, b) = annotator.scene().find_marker(skeleton, "B").unwrap();
    assert_eq!(line.start, a.center());
    assert_eq!(line.end, b.center());
}

#[test]
fn test_hydrated_annotation_draws_placed_keypoints_only() {
    let mut config = two_class_config(None);
    config.initial_values =
        serde_json::from_str(r#"[{"annotations":[{"label":"A","x":3,"y":4}]}]"#).unwrap();
    let annotator = annotator_with_image(config);

    assert_eq!(annotator.skeletons().len(), 1);
    let skeleton = &annotator.skeletons()[0];
    assert_eq!(skeleton.keypoint("A").unwrap().position(), Some((3, 4)));
    assert!(!skeleton.keypoint("B").unwrap().has_xy());

    let (_, marker) = annotator.scene().find_marker(skeleton.id, "A").unwrap();
    assert_eq!(marker.center(), Point::new(3.0, 4.0));
    assert!(annotator.scene().find_marker(skeleton.id, "B").is_none());
    assert_eq!(annotator.scene().lines().count(), 0);
    assert!(annotator.scene().has_checkmark(skeleton.id, "A"));
    assert!(!annotator.scene().has_checkmark(skeleton.id, "B"));
}

#[test]
fn test_locked_annotation_rejects_edits() {
    let mut config = two_class_config(None);
    config.initial_values = serde_json::from_str(
        r#"[{"annotations":[{"label":"A","x":3,"y":4}],
             "annotation_options":{"editable":false}}]"#,
    )
    .unwrap();
    let mut annotator = annotator_with_image(config);
    let skeleton = SkeletonId(1);
    let (marker, state) = annotator.scene().find_marker(skeleton, "A").unwrap();
    assert!(!state.selectable);

    annotator
        .handle_event(Event::SelectionChanged { id: marker })
        .unwrap();
    assert_eq!(annotator.scene().selection(), None);

    annotator.activate_skeleton(skeleton);
    annotator.select_class(1);
    click(&mut annotator, 50.0, 50.0);
    assert!(!annotator.skeleton(skeleton).unwrap().keypoint("B").unwrap().has_xy());
    assert!(annotator.history().is_empty());
}

#[test]
fn test_no_skeleton_created_without_prior_annotations() {
    let annotator = annotator_with_image(two_class_config(None));
    assert!(annotator.skeletons().is_empty());
    assert!(annotator.active_skeleton().is_none());
}

#[test]
fn test_next_unmarked_lands_on_first_later_unplaced_class() {
    let labels = ["a", "b", "c", "d", "e"];
    for mask in 0u32..(1 << labels.len()) {
        for start in 0..labels.len() {
            let mut annotator = annotator(config_with_classes(&labels));
            annotator.add_new_skeleton();
            for i in 0..labels.len() {
                if mask & (1 << i) != 0 {
                    annotator.skeletons[0].keypoints[i].set_position(1, 1);
                }
            }
            annotator.keypoint_index = start;
            annotator.next_unmarked();

            let placed = |i: usize| mask & (1 << i) != 0;
            let expected = (start + 1..labels.len()).find(|i| !placed(*i)).unwrap_or(start);
            assert_eq!(
                annotator.keypoint_index(),
                expected,
                "mask {mask:05b} starting at {start}"
            );
        }
    }
}

#[test]
fn test_markers_stay_unique_through_edits() {
    let mut config = config_with_classes(&["A", "B", "C"]);
    config.skeleton_rig = serde_json::from_str(r#"[["A","B",null],["B","C",null]]"#).unwrap();
    let mut annotator = annotator_with_image(config);
    let first = annotator.add_new_skeleton();
    click(&mut annotator, 10.0, 10.0);
    click(&mut annotator, 30.0, 10.0);
    assert_unique_markers(&annotator);

    annotator.add_new_skeleton();
    click(&mut annotator, 60.0, 60.0);
    assert_unique_markers(&annotator);

    annotator.redraw_all_items();
    annotator.redraw_all_items_for_skeleton(first);
    assert_unique_markers(&annotator);

    annotator.undo();
    annotator.redo();
    annotator.redo();
    assert_unique_markers(&annotator);

    annotator.set_action_mode(ActionMode::AdjustSkeletons).unwrap();
    annotator.set_action_mode(ActionMode::DrawKeypoints).unwrap();
    assert_unique_markers(&annotator);

    annotator.toggle_skeleton_visibility();
    annotator.toggle_skeleton_visibility();
    assert_unique_markers(&annotator);
    assert_eq!(annotator.scene().markers().count(), 3);
}

#[test]
fn test_zoom_in_stops_at_limit() {
    let mut annotator = annotator_with_image(two_class_config(None));
    let max_zoom_in = annotator.zoom_limits().unwrap().max_zoom_in;

    let mut steps = 0;
    while annotator.zoom_in() {
        steps += 1;
        assert!(steps < 100, "zoom never hit its limit");
    }
    let zoom = annotator.scene().viewport().zoom;
    assert!(zoom <= max_zoom_in);
    assert!(zoom * 1.1 > max_zoom_in);

    assert!(!annotator.zoom_in());
    assert_eq!(annotator.scene().viewport().zoom, zoom);

    annotator.zoom_reset();
    assert!((annotator.scene().viewport().zoom - 1.0).abs() < EPSILON);
}

#[test]
fn test_draw_skeleton_without_bounding_box_is_rejected() {
    let mut annotator = annotator_with_image(two_class_config(None));
    let result = annotator.set_action_mode(ActionMode::DrawSkeleton);
    assert!(matches!(result, Err(AnnotatorError::MissingBoundingBox)));
    assert_eq!(annotator.action_mode(), ActionMode::DrawKeypoints);
    assert!(annotator.view().error.is_some());
    assert!(annotator.last_error().is_some());
}

#[test]
fn test_events_before_image_load_fail() {
    let mut annotator = annotator(two_class_config(None));
    let result = annotator.handle_event(Event::PointerOut);
    assert!(matches!(result, Err(AnnotatorError::NotReady(_))));

    annotator.image_failed("404");
    assert!(!annotator.is_ready());
    assert!(annotator.handle_event(Event::PointerOut).is_err());
    assert!(annotator.last_error().is_some());
}

#[test]
fn test_stored_preferences_apply_to_new_annotator() {
    let mut store = MemoryPreferenceStore::new();
    store
        .save(&Preferences {
            keypoint_size: 9,
            line_color: "#00ff00".to_string(),
            ..Preferences::default()
        })
        .unwrap();
    let mut annotator =
        SkeletonAnnotator::new(two_class_config(None), Box::new(store), (200.0, 200.0));
    annotator.image_loaded(200, 200).unwrap();
    assert_eq!(annotator.preferences().keypoint_size, 9);

    annotator.add_new_skeleton();
    click(&mut annotator, 10.0, 10.0);
    click(&mut annotator, 20.0, 10.0);
    let (_, marker) = annotator.scene().markers().next().unwrap();
    assert_eq!(marker.width, 9.0);
    let (_, line) = annotator.scene().lines().next().unwrap();
    assert_eq!(line.color, "#00ff00");
}
