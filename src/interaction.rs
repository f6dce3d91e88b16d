//! Canvas interaction: pointer, wheel, keyboard and scene object events.
//!
//! Events are interpreted according to the current [`ActionMode`]. Rejected
//! operations (placing on a locked skeleton, deleting with nothing selected)
//! are silent no-ops; only a missing image load is reported as an error.

use crate::affine::Affine;
use crate::annotator::{SkeletonAnnotator, SkeletonDraft};
use crate::constants::ZOOM_FACTOR;
use crate::error::AnnotatorError;
use crate::input::Event;
use crate::mode::ActionMode;
use crate::scene::{CompositeTransform, Cursor, Marker, ObjectId, SceneObjectKind};
use crate::transform::Point;
use crate::undo::Change;
use crate::view_state::{PointerReadout, ViewMessage};
use crate::viewport::{Viewport, zoom_in_allowed, zoom_out_allowed};

impl SkeletonAnnotator {
    /// Handle one host event.
    pub fn handle_event(&mut self, event: Event) -> Result<(), AnnotatorError> {
        self.ensure_ready()?;

        match event {
            Event::PointerDown {
                position,
                timestamp_ms,
            } => self.on_pointer_down(position, timestamp_ms),
            Event::PointerUp { position, .. } => self.on_pointer_up(position),
            Event::PointerMove { position, .. } => self.on_pointer_move(position),
            Event::PointerOut => {
                self.pointer.panning = false;
                self.pointer.stop_pan_timer();
                self.scene.set_cursor(Cursor::Default);
            }
            Event::Wheel { delta_y, position } => {
                self.zoom_step(delta_y <= 0.0, position);
            }
            Event::Tick { timestamp_ms } => self.on_tick(timestamp_ms),
            Event::Key { key, modifiers } => {
                let class_count = self.config.keypoint_classes.len();
                if let Some(command) = self.keybindings.command_for_key(key, modifiers, class_count)
                {
                    log::debug!("Key {:?} -> {:?}", key, command);
                    return self.execute(command);
                }
            }
            Event::ObjectMoving { id, left, top } => {
                let moved = self.scene.marker_mut(id).map(|marker| {
                    marker.left = left;
                    marker.top = top;
                    (marker.skeleton, marker.label.clone())
                });
                if let Some((skeleton, label)) = moved {
                    self.draw_rig_lines(skeleton, Some(&label));
                }
            }
            Event::ObjectModified { id, left, top } => {
                // Grouped markers move through their composite instead
                if self.scene.composite_of(id).is_none() && self.commit_marker_drop(id, left, top) {
                    self.pointer.keypoint_moved = true;
                }
            }
            Event::SelectionChanged { id } => self.on_selection(id),
            Event::SelectionCleared => self.scene.discard_selection(),
            Event::CompositeTransformed { skeleton, affine } => {
                if let Some(composite) = self.scene.composite_for_skeleton_mut(skeleton) {
                    composite.affine = affine;
                }
            }
            Event::ContainerResized { width, height } => {
                self.update_view(ViewMessage::ContainerResized { width, height });
                if self.mode.groups_skeletons() {
                    self.commit_composites();
                    self.group_skeletons();
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    fn canvas_point(&self, screen: Point) -> Point {
        self.scene.viewport().screen_to_canvas(screen)
    }

    fn on_pointer_down(&mut self, position: Point, timestamp_ms: u64) {
        self.pointer.press(position, timestamp_ms);
        match self.mode {
            ActionMode::DrawKeypoints => self.pointer.start_pan_timer(timestamp_ms),
            ActionMode::DrawSkeleton => {
                let start = self.canvas_point(position);
                self.start_skeleton_draft(start);
            }
            _ => {}
        }
    }

    fn on_tick(&mut self, timestamp_ms: u64) {
        if !self.pointer.pan_timer_running() {
            return;
        }
        self.pointer.panning = self.pointer.held_long_enough(timestamp_ms)
            && self.pointer.mouse_down
            && self.scene.selection().is_none()
            && self.mode != ActionMode::DrawSkeleton;
        if self.pointer.panning {
            self.scene.set_cursor(Cursor::Grabbing);
        }
    }

    fn on_pointer_move(&mut self, position: Point) {
        let canvas = self.canvas_point(position);

        if self.pointer.mouse_down
            && self.scene.selection().is_none()
            && self.mode == ActionMode::DrawSkeleton
        {
            self.scale_skeleton_draft(canvas);
        }

        if self.pointer.mouse_down {
            let (dx, dy) = self.pointer.update_drag(position);
            if self.pointer.panning {
                self.scene.set_cursor(Cursor::Grabbing);
                let viewport = self.scene.viewport().pan_by(dx, dy);
                self.scene.set_viewport(viewport);
            }
        }

        if let Some(placement) = self.placement {
            let readout = PointerReadout {
                canvas: (canvas.x.round() as i32, canvas.y.round() as i32),
                image: placement.pointer_to_image(canvas),
            };
            self.update_view(ViewMessage::PointerMoved(readout));
        }
    }

    fn on_pointer_up(&mut self, position: Point) {
        self.pointer.stop_pan_timer();
        let panning = self.pointer.panning;

        if self.scene.selection().is_none() && !panning && self.mode == ActionMode::DrawKeypoints {
            let canvas = self.canvas_point(position);
            self.add_keypoint_at(canvas);
        }
        if self.pointer.keypoint_moved && self.mode == ActionMode::DrawKeypoints {
            self.next_unmarked();
            self.pointer.keypoint_moved = false;
        }
        if !panning && self.mode == ActionMode::DrawSkeleton {
            self.enter_mode(ActionMode::AdjustSkeletons);
        }

        self.pointer.release();
        self.scene.set_cursor(Cursor::Default);
    }

    fn on_selection(&mut self, id: ObjectId) {
        let Some(marker) = self.scene.marker(id).filter(|m| m.selectable) else {
            return;
        };
        let (skeleton, label) = (marker.skeleton, marker.label.clone());
        self.scene.select(Some(id));

        let index = self.skeleton_index(skeleton);
        let activate_class = self.mode != ActionMode::AdjustSkeletons;
        self.set_active_skeleton(index, Some(&label), activate_class);

        if self.mode == ActionMode::DeleteKeypoints {
            self.delete_selected_keypoint();
        }
    }

    // ========================================================================
    // Keypoint edits
    // ========================================================================

    /// Place the active class of the active skeleton at a canvas position.
    /// Returns whether a keypoint was placed.
    pub fn add_keypoint_at(&mut self, canvas: Point) -> bool {
        let Some(placement) = self.placement else {
            return false;
        };
        let Some(index) = self.active_skeleton else {
            return false;
        };
        let Some(label) = self.active_keypoint_label().map(str::to_string) else {
            return false;
        };
        let skeleton = &self.skeletons[index];
        if !skeleton.editable || self.scene.find_marker(skeleton.id, &label).is_some() {
            return false;
        }
        if skeleton.keypoint(&label).is_none_or(|k| k.has_xy()) {
            return false;
        }
        let skeleton_id = skeleton.id;

        let (x, y) = placement.pointer_to_image(canvas);
        self.history.record(Change::AddKeypoint {
            skeleton: skeleton_id,
            label: label.clone(),
            x,
            y,
        });
        if let Some(keypoint) = self.skeletons[index].keypoint_mut(&label) {
            keypoint.set_position(x, y);
        }
        self.draw_keypoint(index, &label, true);
        self.update_checkmark(index, &label);
        log::debug!("Placed '{}' of skeleton {} at ({}, {})", label, skeleton_id, x, y);

        self.next_unmarked();
        true
    }

    /// Remove a keypoint's coordinates and marker. No-op for an unplaced
    /// keypoint.
    pub(crate) fn delete_keypoint(&mut self, skeleton_index: usize, label: &str, track: bool) {
        let Some(skeleton) = self.skeletons.get(skeleton_index) else {
            return;
        };
        let skeleton_id = skeleton.id;
        let Some((x, y)) = skeleton.keypoint(label).and_then(|k| k.position()) else {
            return;
        };

        if track {
            self.history.record(Change::DeleteKeypoint {
                skeleton: skeleton_id,
                label: label.to_string(),
                x,
                y,
            });
        }
        self.scene.set_checkmark(skeleton_id, label, false);
        if let Some(keypoint) = self.skeletons[skeleton_index].keypoint_mut(label) {
            keypoint.clear_position();
        }
        self.remove_marker(skeleton_id, label);
        self.set_active_keypoint_class(label);
        self.draw_rig_lines(skeleton_id, None);
    }

    /// Switch to delete mode and delete the selected marker's keypoint.
    pub fn delete_selected_keypoint(&mut self) {
        let selected = self
            .scene
            .selection()
            .and_then(|id| self.scene.marker(id))
            .map(|m| (m.skeleton, m.label.clone()));

        self.enter_mode(ActionMode::DeleteKeypoints);

        let Some((skeleton, label)) = selected else {
            return;
        };
        if let Some(index) = self.skeleton_index(skeleton) {
            self.delete_keypoint(index, &label, true);
        }
    }

    // ========================================================================
    // Skeleton drafts
    // ========================================================================

    /// Add a new skeleton laid out at the rig's authored positions, grouped
    /// in a composite collapsed onto `start`.
    fn start_skeleton_draft(&mut self, start: Point) {
        let (Some(bbox), Some(placement)) = (self.config.skeleton_bounding_box, self.placement)
        else {
            return;
        };

        let skeleton = self.create_empty_skeleton();
        let id = self.add_skeleton(skeleton, true, true);
        let Some(index) = self.skeleton_index(id) else {
            return;
        };

        let (width, height) = placement.marker_extent(self.marker_size.current());
        let classes = self.config.keypoint_classes.clone();
        let skeleton = &mut self.skeletons[index];
        let mut markers = Vec::with_capacity(classes.len());
        for (class, keypoint) in classes.iter().zip(skeleton.keypoints.iter_mut()) {
            keypoint.set_position(0, 0);
            let (left, top) = class.layout_position();
            markers.push(Marker {
                skeleton: id,
                label: keypoint.label.clone(),
                left,
                top,
                width,
                height,
                color: keypoint.color.clone(),
                style: keypoint.draw_style,
                selectable: true,
            });
        }
        for marker in markers {
            let label = marker.label.clone();
            self.scene.add(SceneObjectKind::Marker(marker));
            self.scene.set_checkmark(id, &label, true);
        }
        self.draw_rig_lines(id, None);

        let members = self.scene.objects_for_skeleton(id);
        self.scene.add_composite(CompositeTransform {
            skeleton: id,
            members,
            affine: Self::draft_affine(&bbox, start, 0.0, 0.0),
        });
        self.draft = Some(SkeletonDraft {
            skeleton: id,
            start,
        });
        log::debug!("Started drawing skeleton {} at ({:.1}, {:.1})", id, start.x, start.y);
    }

    /// Scale the draft so the rig's bounding box spans the drag rectangle.
    fn scale_skeleton_draft(&mut self, current: Point) {
        let (Some(draft), Some(bbox)) = (self.draft, self.config.skeleton_bounding_box) else {
            return;
        };
        let margin = 2.0 * f64::from(self.preferences.keypoint_size) + 1.0;
        let sx = (current.x - draft.start.x) / (bbox.right + margin);
        let sy = (current.y - draft.start.y) / (bbox.bottom + margin);
        let affine = Self::draft_affine(&bbox, draft.start, sx, sy);
        if let Some(composite) = self.scene.composite_for_skeleton_mut(draft.skeleton) {
            composite.affine = affine;
        }
    }

    fn draft_affine(bbox: &skat_rig::BoundingBox, start: Point, sx: f64, sy: f64) -> Affine {
        Affine::translate(-bbox.left, -bbox.top)
            .then(&Affine::scale(sx, sy))
            .then(&Affine::translate(start.x, start.y))
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    fn apply_zoom(&mut self, zoom: f64, around: Point) -> bool {
        let limits = self.zoom_limits.as_ref();
        let current = self.scene.viewport().zoom;
        let allowed = if zoom > current {
            zoom_in_allowed(limits, zoom)
        } else {
            zoom_out_allowed(limits, zoom)
        };
        if !allowed {
            log::debug!("Zoom to {:.3} rejected by limits", zoom);
            return false;
        }
        let viewport = self.scene.viewport().zoom_to_point(zoom, around);
        self.scene.set_viewport(viewport);
        true
    }

    fn zoom_step(&mut self, zoom_in: bool, around: Point) -> bool {
        let current = self.scene.viewport().zoom;
        let zoom = if zoom_in {
            current * ZOOM_FACTOR
        } else {
            current / ZOOM_FACTOR
        };
        self.apply_zoom(zoom, around)
    }

    /// Zoom in one step around the canvas origin. Returns whether the zoom
    /// was within limits.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_step(true, Point::default())
    }

    /// Zoom out one step around the canvas origin.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_step(false, Point::default())
    }

    /// Fit the canvas into its container.
    pub fn zoom_reset(&mut self) {
        let viewport = match self.placement {
            Some(placement) => Viewport::reset(
                self.view.container,
                (placement.canvas_width, placement.canvas_height),
            ),
            None => Viewport::identity(),
        };
        self.scene.set_viewport(viewport);
    }
}
