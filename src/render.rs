//! Model -> scene synchronization.
//!
//! The skeleton model is authoritative; markers and rig lines are derived
//! from it and may be thrown away and rebuilt at any time. Positions only
//! flow back through two named commits: [`SkeletonAnnotator::commit_marker_drop`]
//! for a dragged marker and [`SkeletonAnnotator::commit_composites`] for
//! grouped skeletons.
//!
//! Every draw call is a no-op while rendering is delayed.

use skat_rig::RigConnection;

use crate::affine::Affine;
use crate::annotator::SkeletonAnnotator;
use crate::model::{KeypointState, SkeletonId, SkeletonState};
use crate::scene::{CompositeTransform, Marker, ObjectId, RigLine, SceneObjectKind};
use crate::undo::Change;

impl SkeletonAnnotator {
    // ========================================================================
    // Visibility and styling
    // ========================================================================

    /// Whether a keypoint gets a marker.
    pub(crate) fn keypoint_visible(&self, skeleton: &SkeletonState, keypoint: &KeypointState) -> bool {
        keypoint.has_xy()
            && keypoint.show_keypoint
            && skeleton.show_keypoints
            && (self.show_skeletons || self.view.skeleton_visible(skeleton.id))
    }

    /// Line color: the default when forced, else the rig override, else the
    /// skeleton color, else the default.
    pub(crate) fn line_color(&self, skeleton: &SkeletonState, connection: &RigConnection) -> String {
        let default = &self.preferences.line_color;
        if self.preferences.force_default_line_color {
            return default.clone();
        }
        connection
            .color
            .as_ref()
            .or(skeleton.line_color.as_ref())
            .unwrap_or(default)
            .clone()
    }

    fn line_visible(skeleton: &SkeletonState, connection: &RigConnection) -> bool {
        let shown = |label: &str| skeleton.keypoint(label).is_some_and(|k| k.show_line);
        skeleton.show_lines && shown(&connection.from) && shown(&connection.to)
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draw the marker for one keypoint if it is placed and visible and not
    /// drawn yet.
    pub(crate) fn draw_keypoint(&mut self, skeleton_index: usize, label: &str, update_rig_lines: bool) {
        if self.delay_rendering {
            return;
        }
        let Some(placement) = self.placement else {
            return;
        };
        let Some(skeleton) = self.skeletons.get(skeleton_index) else {
            return;
        };
        let Some(keypoint) = skeleton.keypoint(label) else {
            return;
        };
        if !self.keypoint_visible(skeleton, keypoint) {
            return;
        }
        if self.scene.find_marker(skeleton.id, label).is_some() {
            return;
        }
        let Some((x, y)) = keypoint.position() else {
            return;
        };

        let diameter = self.marker_size.current();
        let anchor = placement.image_to_canvas(f64::from(x), f64::from(y), diameter);
        let (width, height) = placement.marker_extent(diameter);
        let skeleton_id = skeleton.id;
        let marker = Marker {
            skeleton: skeleton_id,
            label: label.to_string(),
            left: anchor.x,
            top: anchor.y,
            width,
            height,
            color: keypoint.color.clone(),
            style: keypoint.draw_style,
            selectable: skeleton.editable,
        };
        self.scene.add(SceneObjectKind::Marker(marker));

        if update_rig_lines {
            self.draw_rig_lines(skeleton_id, Some(label));
        }
        self.scene.set_checkmark(skeleton_id, label, true);
        self.scene.adjust_z_order();
    }

    /// Draw every marker of a skeleton, then its rig lines.
    pub(crate) fn draw_skeleton(&mut self, skeleton: SkeletonId) {
        if self.delay_rendering {
            return;
        }
        let Some(index) = self.skeleton_index(skeleton) else {
            return;
        };
        let labels: Vec<String> = self.skeletons[index]
            .keypoints
            .iter()
            .map(|k| k.label.clone())
            .collect();
        for label in &labels {
            self.draw_keypoint(index, label, false);
            self.update_checkmark(index, label);
        }
        self.draw_rig_lines(skeleton, None);
    }

    pub(crate) fn draw_all_skeletons(&mut self) {
        if self.delay_rendering {
            return;
        }
        let ids: Vec<SkeletonId> = self.skeletons.iter().map(|s| s.id).collect();
        for id in ids {
            self.draw_skeleton(id);
        }
    }

    /// Redraw rig lines of a skeleton, optionally only the connections
    /// touching one class. Existing lines in that scope are always removed
    /// first, so calling this repeatedly never duplicates lines.
    pub(crate) fn draw_rig_lines(&mut self, skeleton_id: SkeletonId, label: Option<&str>) {
        self.scene.remove_where(|o| {
            o.as_line().is_some_and(|line| {
                line.skeleton == skeleton_id && label.is_none_or(|l| line.touches(l))
            })
        });
        if self.delay_rendering {
            return;
        }
        let Some(skeleton) = self.skeletons.iter().find(|s| s.id == skeleton_id) else {
            return;
        };

        let width = f64::from(self.preferences.line_size);
        let mut lines = Vec::new();
        let connections: Vec<&RigConnection> = match label {
            Some(label) => skeleton.rig.touching(label).collect(),
            None => skeleton.rig.connections().iter().collect(),
        };
        for connection in connections {
            if !Self::line_visible(skeleton, connection) {
                continue;
            }
            let from = self.scene.find_marker(skeleton_id, &connection.from);
            let to = self.scene.find_marker(skeleton_id, &connection.to);
            if let (Some((_, a)), Some((_, b))) = (from, to) {
                lines.push(RigLine {
                    skeleton: skeleton_id,
                    from: connection.from.clone(),
                    to: connection.to.clone(),
                    start: a.center(),
                    end: b.center(),
                    color: self.line_color(skeleton, connection),
                    width,
                });
            }
        }
        for line in lines {
            self.scene.add(SceneObjectKind::RigLine(line));
        }
        self.scene.adjust_z_order();
    }

    /// Show the class checkmark exactly when the keypoint is placed.
    pub(crate) fn update_checkmark(&mut self, skeleton_index: usize, label: &str) {
        if self.delay_rendering {
            return;
        }
        if let Some(skeleton) = self.skeletons.get(skeleton_index) {
            let placed = skeleton.keypoint(label).is_some_and(KeypointState::has_xy);
            self.scene.set_checkmark(skeleton.id, label, placed);
        }
    }

    // ========================================================================
    // Clearing and redrawing
    // ========================================================================

    /// Remove one keypoint's marker, if drawn.
    pub(crate) fn remove_marker(&mut self, skeleton: SkeletonId, label: &str) {
        self.scene.remove_where(|o| {
            o.as_marker()
                .is_some_and(|m| m.skeleton == skeleton && m.label == label)
        });
    }

    /// Remove every scene object of a skeleton and hide its checkmarks.
    pub(crate) fn clear_drawn_skeleton(&mut self, skeleton: SkeletonId) {
        self.scene.clear_checkmarks(Some(skeleton));
        self.first_unmarked();
        self.scene.remove_where(|o| o.skeleton() == Some(skeleton));
    }

    pub(crate) fn clear_drawn_skeletons(&mut self) {
        self.scene.clear_checkmarks(None);
        self.first_unmarked();
        self.scene.remove_where(|o| o.skeleton().is_some());
    }

    /// Clear and redraw one skeleton. Composites are committed first and
    /// restored afterwards when skeletons are grouped.
    pub fn redraw_all_items_for_skeleton(&mut self, skeleton: SkeletonId) {
        if self.delay_rendering {
            return;
        }
        self.with_composites_dissolved(|this| {
            this.clear_drawn_skeleton(skeleton);
            this.draw_skeleton(skeleton);
        });
    }

    /// Clear and redraw everything.
    pub fn redraw_all_items(&mut self) {
        if self.delay_rendering {
            return;
        }
        self.with_composites_dissolved(|this| {
            this.clear_drawn_skeletons();
            this.draw_all_skeletons();
        });
        self.marker_size.mark_redrawn();
    }

    /// Bring one keypoint's model state to the scene: set or clear its
    /// position, rebuild its marker and the lines touching it.
    pub(crate) fn sync_keypoint(&mut self, skeleton: SkeletonId, label: &str, position: Option<(i32, i32)>) {
        self.with_composites_dissolved(|this| {
            let Some(index) = this.skeleton_index(skeleton) else {
                return;
            };
            let Some(keypoint) = this.skeletons[index].keypoint_mut(label) else {
                return;
            };
            match position {
                Some((x, y)) => keypoint.set_position(x, y),
                None => keypoint.clear_position(),
            }
            this.remove_marker(skeleton, label);
            this.draw_keypoint(index, label, false);
            this.draw_rig_lines(skeleton, Some(label));
            this.update_checkmark(index, label);
        });
    }

    // ========================================================================
    // Composites
    // ========================================================================

    /// Run `f` with all composites committed, regrouping afterwards if
    /// skeletons are grouped in the current mode.
    pub(crate) fn with_composites_dissolved(&mut self, f: impl FnOnce(&mut Self)) {
        let grouped = self.mode.groups_skeletons();
        self.commit_composites();
        f(self);
        if grouped {
            self.group_skeletons();
        }
    }

    /// One identity composite per skeleton holding all of its scene objects.
    pub(crate) fn group_skeletons(&mut self) {
        self.scene.discard_selection();
        for skeleton in self.skeletons.iter().rev() {
            let members = self.scene.objects_for_skeleton(skeleton.id);
            if members.is_empty() {
                continue;
            }
            self.scene.add_composite(CompositeTransform {
                skeleton: skeleton.id,
                members,
                affine: Affine::IDENTITY,
            });
        }
        log::debug!("Grouped {} skeletons", self.scene.composites().len());
    }

    /// Dissolve every composite, writing its transformed marker positions back
    /// into the model and rebuilding the skeleton's scene objects.
    ///
    /// Composite moves are not recorded in the undo log.
    pub fn commit_composites(&mut self) {
        let composites = self.scene.take_composites();
        if composites.is_empty() {
            return;
        }
        self.scene.discard_selection();
        let Some(placement) = self.placement else {
            return;
        };

        for composite in composites {
            let Some(index) = self.skeleton_index(composite.skeleton) else {
                continue;
            };
            let updates: Vec<(String, i32, i32)> = composite
                .members
                .iter()
                .filter_map(|id| self.scene.marker(*id))
                .map(|marker| {
                    let center = composite.affine.apply(marker.center());
                    let (x, y) = placement.canvas_point_to_image(center);
                    (marker.label.clone(), x.round() as i32, y.round() as i32)
                })
                .collect();

            if !composite.affine.is_identity() {
                log::debug!(
                    "Committing composite of skeleton {} ({} markers)",
                    composite.skeleton,
                    updates.len()
                );
            }
            let skeleton = &mut self.skeletons[index];
            for (label, x, y) in &updates {
                if let Some(keypoint) = skeleton.keypoint_mut(label) {
                    keypoint.set_position(*x, *y);
                }
            }

            self.scene
                .remove_where(|o| o.skeleton() == Some(composite.skeleton));
            self.draw_skeleton(composite.skeleton);
        }
        self.draft = None;
    }

    // ========================================================================
    // Marker drops
    // ========================================================================

    /// A dragged marker was dropped with its anchor at `left`/`top`. Records
    /// the move, updates the model and snaps the marker to the stored pixel.
    /// Returns whether a move was committed.
    pub fn commit_marker_drop(&mut self, id: ObjectId, left: f64, top: f64) -> bool {
        let Some(placement) = self.placement else {
            return false;
        };
        let Some(marker) = self.scene.marker(id) else {
            return false;
        };
        let (skeleton_id, label) = (marker.skeleton, marker.label.clone());
        let Some(index) = self.skeleton_index(skeleton_id) else {
            return false;
        };
        if !self.skeletons[index].editable {
            return false;
        }
        let Some(before) = self.skeletons[index]
            .keypoint(&label)
            .and_then(KeypointState::position)
        else {
            return false;
        };

        // Markers keep the previous size until the next full redraw
        let diameter = self.marker_size.diameter(self.marker_size.is_dirty());
        let (x, y) = placement.canvas_to_image(left, top, diameter);
        let after = (x.round() as i32, y.round() as i32);

        self.history.record(Change::MoveKeypoint {
            skeleton: skeleton_id,
            label: label.clone(),
            before,
            after,
        });
        if let Some(keypoint) = self.skeletons[index].keypoint_mut(&label) {
            keypoint.set_position(after.0, after.1);
        }

        let anchor = placement.image_to_canvas(f64::from(after.0), f64::from(after.1), diameter);
        if let Some(marker) = self.scene.marker_mut(id) {
            marker.left = anchor.x;
            marker.top = anchor.y;
        }
        self.draw_rig_lines(skeleton_id, Some(&label));
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use skat_rig::SkeletonRig;

    use crate::tests::{annotator_with_image, two_class_config};
    use crate::model::SkeletonId;
    use crate::transform::Point;

    #[test]
    fn test_no_drawing_before_load() {
        let mut annotator = crate::tests::annotator(two_class_config(None));
        annotator.add_new_skeleton();
        let id = annotator.skeletons()[0].id;
        annotator.skeletons[0].keypoints[0].set_position(1, 1);
        annotator.draw_skeleton(id);
        annotator.redraw_all_items();
        assert_eq!(annotator.scene().markers().count(), 0);
    }

    #[test]
    fn test_draw_keypoint_is_idempotent() {
        let mut annotator = annotator_with_image(two_class_config(None));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.draw_keypoint(0, "A", true);
        annotator.draw_keypoint(0, "A", true);
        assert_eq!(annotator.scene().markers().count(), 1);
        assert!(annotator.scene().has_checkmark(SkeletonId(1), "A"));
    }

    #[test]
    fn test_rig_lines_not_duplicated() {
        let mut annotator = annotator_with_image(two_class_config(None));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.skeletons[0].keypoints[1].set_position(20, 10);
        annotator.draw_skeleton(SkeletonId(1));
        annotator.draw_rig_lines(SkeletonId(1), None);
        annotator.draw_rig_lines(SkeletonId(1), Some("A"));
        assert_eq!(annotator.scene().lines().count(), 1);
    }

    #[test]
    fn test_rig_lines_follow_skeleton_rig() {
        let mut annotator = annotator_with_image(two_class_config(None));
        for _ in 0..2 {
            let id = annotator.add_new_skeleton();
            let index = annotator.skeleton_index(id).unwrap();
            annotator.skeletons[index].keypoints[0].set_position(10, 10);
            annotator.skeletons[index].keypoints[1].set_position(20, 10);
        }
        annotator.skeletons[0].rig = Rc::new(SkeletonRig::new(Vec::new()));
        annotator.redraw_all_items();

        assert_eq!(annotator.scene().markers().count(), 4);
        let owners: Vec<SkeletonId> = annotator.scene().lines().map(|(_, l)| l.skeleton).collect();
        assert_eq!(owners, vec![annotator.skeletons()[1].id]);
    }

    #[test]
    fn test_line_color_precedence() {
        let mut annotator =
            annotator_with_image(two_class_config(Some(r##"[["A","B","#ff0000"]]"##)));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.skeletons[0].keypoints[1].set_position(20, 10);
        annotator.skeletons[0].line_color = Some("#00ff00".to_string());
        annotator.redraw_all_items();
        assert_eq!(annotator.scene().lines().next().unwrap().1.color, "#ff0000");

        annotator.preferences.force_default_line_color = true;
        annotator.redraw_all_items();
        assert_eq!(annotator.scene().lines().next().unwrap().1.color, "#0000ff");
    }

    #[test]
    fn test_hidden_keypoint_has_no_marker_or_line() {
        let mut annotator = annotator_with_image(two_class_config(None));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.skeletons[0].keypoints[1].set_position(20, 10);
        annotator.skeletons[0].keypoints[1].show_keypoint = false;
        annotator.redraw_all_items();
        assert_eq!(annotator.scene().markers().count(), 1);
        assert_eq!(annotator.scene().lines().count(), 0);
        // Placed but hidden keypoints still show their checkmark
        assert!(annotator.scene().has_checkmark(SkeletonId(1), "B"));
    }

    #[test]
    fn test_drop_before_redraw_uses_drawn_size() {
        let mut annotator = annotator_with_image(two_class_config(None));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.redraw_all_items();
        let (id, marker) = annotator.scene().markers().next().unwrap();
        let (left, top) = (marker.left, marker.top);
        assert_eq!((left, top), (7.5, 7.5));

        annotator.marker_size.resize(11.0);
        assert!(annotator.marker_size.is_dirty());
        assert!(annotator.commit_marker_drop(id, left + 2.0, top));
        assert_eq!(annotator.skeletons()[0].keypoints[0].position(), Some((12, 10)));
        // Snapped at the size it is still drawn with
        let marker = annotator.scene().marker(id).unwrap();
        assert_eq!((marker.left, marker.top), (9.5, 7.5));
        assert_eq!(marker.center(), Point::new(12.0, 10.0));

        annotator.redraw_all_items();
        assert!(!annotator.marker_size.is_dirty());
        let (_, marker) = annotator.scene().markers().next().unwrap();
        assert_eq!(marker.width, 11.0);
        assert_eq!(marker.center(), Point::new(12.0, 10.0));
    }

    #[test]
    fn test_z_order_after_redraw() {
        let mut annotator = annotator_with_image(two_class_config(None));
        annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.skeletons[0].keypoints[1].set_position(20, 10);
        annotator.redraw_all_items();
        let kinds: Vec<u8> = annotator
            .scene()
            .objects()
            .iter()
            .map(|o| match o.kind {
                crate::scene::SceneObjectKind::BaseImage(_) => 0,
                crate::scene::SceneObjectKind::RigLine(_) => 1,
                crate::scene::SceneObjectKind::Marker(_) => 2,
            })
            .collect();
        assert_eq!(kinds, vec![0, 1, 2, 2]);
    }
}
