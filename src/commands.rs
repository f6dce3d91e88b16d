//! Commands from toolbar buttons, side panels and hotkeys.
//!
//! Every operator action outside of direct canvas manipulation is a
//! [`Command`]. Hotkeys resolve to commands through
//! [`crate::keybindings::KeyBindings`]; hosts send panel and toolbar commands
//! directly.

use serde::{Deserialize, Serialize};

use crate::annotator::SkeletonAnnotator;
use crate::config::clamp_draw_size;
use crate::error::AnnotatorError;
use crate::mode::ActionMode;
use crate::model::SkeletonId;
use crate::view_state::{LeftPanel, RightPanel, ViewMessage};

/// An operator command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args")]
pub enum Command {
    // === Canvas ===
    DeleteSelected,
    /// Select a keypoint class by position
    SelectClass(usize),
    NextUnmarked,
    PreviousUnmarked,
    NextKeypoint,
    PreviousKeypoint,
    ZoomReset,
    ZoomIn,
    ZoomOut,
    SetMode(ActionMode),
    AddSkeleton,
    Undo,
    Redo,
    ToggleSkeletonVisibility,

    // === Skeleton panel ===
    DeleteSkeleton(SkeletonId),
    /// Clear the keypoints of one skeleton, or of every skeleton
    DeleteAllKeypoints(Option<SkeletonId>),
    ActivateSkeleton(SkeletonId),
    /// Click on a class entry of a skeleton panel
    SelectKeypoint { skeleton: SkeletonId, label: String },
    /// Toggle one keypoint, or the whole skeleton when `label` is `None`
    ToggleKeypointVisibility {
        skeleton: SkeletonId,
        label: Option<String>,
    },
    /// Toggle the lines of one keypoint, or of the whole skeleton
    ToggleLineVisibility {
        skeleton: SkeletonId,
        label: Option<String>,
    },
    SetSkeletonExpanded { skeleton: SkeletonId, expanded: bool },

    // === Settings ===
    SetKeypointSize(u32),
    SetLineSize(u32),
    SetDefaultLineColor(String),
    SetForceDefaultLineColor(bool),

    // === Panels and form ===
    ToggleLeftPanel(LeftPanel),
    ToggleRightPanel(RightPanel),
    SetNoChangesNeeded(bool),
    DismissError,
}

impl Command {
    /// Help text shown next to the command's shortcut.
    pub fn description(&self) -> String {
        match self {
            Command::DeleteSelected => "Deletes a selected keypoint".to_string(),
            Command::SelectClass(index) => format!("Selects keypoint class {}", index + 1),
            Command::NextUnmarked => "Next Unmarked Keypoint".to_string(),
            Command::PreviousUnmarked => "Previous Unmarked Keypoint".to_string(),
            Command::NextKeypoint => "Next Keypoint".to_string(),
            Command::PreviousKeypoint => "Previous Keypoint".to_string(),
            Command::ZoomReset => "Reset zoom & center image".to_string(),
            Command::ZoomIn => "Zooms in".to_string(),
            Command::ZoomOut => "Zooms out".to_string(),
            Command::SetMode(ActionMode::DrawKeypoints) => {
                "Add or edit keypoint locations".to_string()
            }
            Command::SetMode(ActionMode::DeleteKeypoints) => "Delete keypoints".to_string(),
            Command::SetMode(ActionMode::DrawSkeleton) => {
                "Draw skeleton. Only supported if skeletonBoundingBox, skeletonRig and keypointClasses are set"
                    .to_string()
            }
            Command::SetMode(ActionMode::AdjustSkeletons) => "Adjust skeleton positions".to_string(),
            Command::AddSkeleton => "Add new skeleton".to_string(),
            Command::Undo => "Undo Keypoint Change".to_string(),
            Command::Redo => "Redo Keypoint Change".to_string(),
            Command::ToggleSkeletonVisibility => "Show/hide all skeletons".to_string(),
            Command::DeleteSkeleton(_) => "Delete Skeleton".to_string(),
            Command::DeleteAllKeypoints(_) => "Delete Keypoints".to_string(),
            Command::ActivateSkeleton(_) => "Activate skeleton".to_string(),
            Command::SelectKeypoint { label, .. } => format!("Selects the {} for labeling", label),
            Command::ToggleKeypointVisibility { .. } => "Show/hide keypoints".to_string(),
            Command::ToggleLineVisibility { .. } => "Show/hide lines".to_string(),
            Command::SetSkeletonExpanded { .. } => "Expand/collapse skeleton".to_string(),
            Command::SetKeypointSize(_) => "Keypoint size".to_string(),
            Command::SetLineSize(_) => "Line size".to_string(),
            Command::SetDefaultLineColor(_) => "Default line color".to_string(),
            Command::SetForceDefaultLineColor(_) => "Force default line color".to_string(),
            Command::ToggleLeftPanel(_) | Command::ToggleRightPanel(_) => "Toggle panel".to_string(),
            Command::SetNoChangesNeeded(_) => "No changes needed".to_string(),
            Command::DismissError => "Dismiss error".to_string(),
        }
    }
}

impl SkeletonAnnotator {
    /// Run a command. Commands are rejected until the image has loaded.
    pub fn execute(&mut self, command: Command) -> Result<(), AnnotatorError> {
        self.ensure_ready()?;

        match command {
            Command::DeleteSelected => self.delete_selected_keypoint(),
            Command::SelectClass(index) => self.select_class(index),
            Command::NextUnmarked => self.next_unmarked(),
            Command::PreviousUnmarked => self.previous_unmarked(),
            Command::NextKeypoint => self.next_keypoint(),
            Command::PreviousKeypoint => self.previous_keypoint(),
            Command::ZoomReset => self.zoom_reset(),
            Command::ZoomIn => {
                self.zoom_in();
            }
            Command::ZoomOut => {
                self.zoom_out();
            }
            Command::SetMode(mode) => self.set_action_mode(mode)?,
            Command::AddSkeleton => {
                self.add_new_skeleton();
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::ToggleSkeletonVisibility => self.toggle_skeleton_visibility(),

            Command::DeleteSkeleton(id) => {
                self.delete_skeleton(id);
            }
            Command::DeleteAllKeypoints(skeleton) => self.delete_all_keypoints(skeleton),
            Command::ActivateSkeleton(id) => self.activate_skeleton(id),
            Command::SelectKeypoint { skeleton, label } => self.select_keypoint(skeleton, &label),
            Command::ToggleKeypointVisibility { skeleton, label } => {
                self.toggle_keypoint_visibility(skeleton, label.as_deref());
            }
            Command::ToggleLineVisibility { skeleton, label } => {
                self.toggle_line_visibility(skeleton, label.as_deref());
            }
            Command::SetSkeletonExpanded { skeleton, expanded } => {
                self.update_view(ViewMessage::SetSkeletonExpanded { skeleton, expanded });
            }

            Command::SetKeypointSize(size) => self.set_keypoint_size(size),
            Command::SetLineSize(size) => {
                let size = clamp_draw_size(size);
                if size != self.preferences.line_size {
                    self.preferences.line_size = size;
                    self.preferences_changed();
                }
            }
            Command::SetDefaultLineColor(color) => {
                if color != self.preferences.line_color {
                    self.preferences.line_color = color;
                    self.preferences_changed();
                }
            }
            Command::SetForceDefaultLineColor(force) => {
                if force != self.preferences.force_default_line_color {
                    self.preferences.force_default_line_color = force;
                    self.preferences_changed();
                }
            }

            Command::ToggleLeftPanel(panel) => self.update_view(ViewMessage::ToggleLeftPanel(panel)),
            Command::ToggleRightPanel(panel) => {
                self.update_view(ViewMessage::ToggleRightPanel(panel));
            }
            Command::SetNoChangesNeeded(value) => {
                self.update_view(ViewMessage::SetNoChangesNeeded(value));
            }
            Command::DismissError => self.update_view(ViewMessage::DismissError),
        }
        Ok(())
    }

    fn preferences_changed(&mut self) {
        self.redraw_all_items();
        self.save_preferences();
    }

    /// Change the marker size. Markers still on the canvas are read with the
    /// old size until the redraw has replaced them.
    fn set_keypoint_size(&mut self, size: u32) {
        let size = clamp_draw_size(size);
        if size == self.preferences.keypoint_size {
            return;
        }
        self.preferences.keypoint_size = size;
        self.marker_size.resize(f64::from(size));
        self.redraw_all_items();
        self.save_preferences();
    }

    /// Flip global skeleton visibility. While it is off, only skeletons whose
    /// panel toggle is on stay drawn.
    pub fn toggle_skeleton_visibility(&mut self) {
        self.show_skeletons = !self.show_skeletons;
        log::debug!("Skeleton visibility: {}", self.show_skeletons);

        let skeletons: Vec<(SkeletonId, bool)> = self
            .skeletons
            .iter()
            .map(|s| (s.id, s.show_keypoints))
            .collect();
        for (id, show_keypoints) in skeletons {
            self.update_view(ViewMessage::SetSkeletonVisible {
                skeleton: id,
                visible: self.show_skeletons && show_keypoints,
            });
            self.redraw_all_items_for_skeleton(id);
        }
    }

    fn toggle_keypoint_visibility(&mut self, skeleton: SkeletonId, label: Option<&str>) {
        let Some(index) = self.skeleton_index(skeleton) else {
            return;
        };
        match label {
            Some(label) => {
                let Some(keypoint) = self.skeletons[index].keypoint_mut(label) else {
                    return;
                };
                keypoint.show_keypoint = !keypoint.show_keypoint;
                self.with_composites_dissolved(|this| {
                    this.remove_marker(skeleton, label);
                    this.draw_keypoint(index, label, false);
                    this.draw_rig_lines(skeleton, Some(label));
                });
            }
            None => {
                // Flip what the panel shows, which the global toggle may have changed
                let visible = !self.view.skeleton_visible(skeleton);
                self.skeletons[index].show_keypoints = visible;
                self.update_view(ViewMessage::SetSkeletonVisible { skeleton, visible });
                self.redraw_all_items_for_skeleton(skeleton);
            }
        }
    }

    fn toggle_line_visibility(&mut self, skeleton: SkeletonId, label: Option<&str>) {
        let Some(index) = self.skeleton_index(skeleton) else {
            return;
        };
        let sk = &mut self.skeletons[index];
        match label {
            Some(label) => {
                let Some(keypoint) = sk.keypoint_mut(label) else {
                    return;
                };
                keypoint.show_line = !keypoint.show_line;
            }
            None => sk.show_lines = !sk.show_lines,
        }
        self.with_composites_dissolved(|this| this.draw_rig_lines(skeleton, None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{annotator, annotator_with_image, two_class_config};

    fn placed_pair() -> SkeletonAnnotator {
        let mut annotator = annotator_with_image(two_class_config(None));
        let id = annotator.add_new_skeleton();
        let index = annotator.skeleton_index(id).unwrap();
        annotator.skeletons[index].keypoints[0].set_position(10, 10);
        annotator.skeletons[index].keypoints[1].set_position(20, 10);
        annotator.redraw_all_items();
        annotator
    }

    #[test]
    fn test_commands_rejected_before_load() {
        let mut annotator = annotator(two_class_config(None));
        assert!(matches!(
            annotator.execute(Command::AddSkeleton),
            Err(AnnotatorError::NotReady(_))
        ));
    }

    #[test]
    fn test_command_json_shape() {
        let command: Command = serde_json::from_str(r#"{"command":"ZoomIn"}"#).unwrap();
        assert_eq!(command, Command::ZoomIn);
        let command: Command =
            serde_json::from_str(r#"{"command":"SetMode","args":"DrawSkeleton"}"#).unwrap();
        assert_eq!(command, Command::SetMode(ActionMode::DrawSkeleton));
        let command: Command = serde_json::from_str(
            r#"{"command":"SelectKeypoint","args":{"skeleton":3,"label":"A"}}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::SelectKeypoint {
                skeleton: SkeletonId(3),
                label: "A".to_string()
            }
        );
    }

    #[test]
    fn test_toggle_skeleton_visibility() {
        let mut annotator = placed_pair();
        annotator.execute(Command::ToggleSkeletonVisibility).unwrap();
        assert!(!annotator.show_skeletons());
        assert_eq!(annotator.scene().markers().count(), 0);
        assert_eq!(annotator.scene().lines().count(), 0);

        annotator.execute(Command::ToggleSkeletonVisibility).unwrap();
        assert_eq!(annotator.scene().markers().count(), 2);
        assert_eq!(annotator.scene().lines().count(), 1);
    }

    #[test]
    fn test_panel_toggle_keeps_skeleton_visible() {
        let mut annotator = placed_pair();
        let id = annotator.skeletons()[0].id;
        annotator.execute(Command::ToggleSkeletonVisibility).unwrap();
        annotator.update_view(ViewMessage::SetSkeletonVisible {
            skeleton: id,
            visible: true,
        });
        annotator.redraw_all_items();
        assert_eq!(annotator.scene().markers().count(), 2);
    }

    #[test]
    fn test_toggle_keypoint_and_line_visibility() {
        let mut annotator = placed_pair();
        let id = annotator.skeletons()[0].id;

        annotator
            .execute(Command::ToggleKeypointVisibility {
                skeleton: id,
                label: Some("B".to_string()),
            })
            .unwrap();
        assert_eq!(annotator.scene().markers().count(), 1);
        assert_eq!(annotator.scene().lines().count(), 0);
        annotator
            .execute(Command::ToggleKeypointVisibility {
                skeleton: id,
                label: Some("B".to_string()),
            })
            .unwrap();
        assert_eq!(annotator.scene().lines().count(), 1);

        annotator
            .execute(Command::ToggleLineVisibility {
                skeleton: id,
                label: None,
            })
            .unwrap();
        assert_eq!(annotator.scene().lines().count(), 0);
        assert_eq!(annotator.scene().markers().count(), 2);

        annotator
            .execute(Command::ToggleKeypointVisibility {
                skeleton: id,
                label: None,
            })
            .unwrap();
        assert_eq!(annotator.scene().markers().count(), 0);
        assert!(!annotator.view().skeleton_visible(id));
    }

    #[test]
    fn test_panel_toggle_shows_skeleton_hidden_globally() {
        let mut annotator = placed_pair();
        let id = annotator.skeletons()[0].id;
        annotator.execute(Command::ToggleSkeletonVisibility).unwrap();
        assert_eq!(annotator.scene().markers().count(), 0);
        assert!(!annotator.view().skeleton_visible(id));

        annotator
            .execute(Command::ToggleKeypointVisibility {
                skeleton: id,
                label: None,
            })
            .unwrap();
        assert!(annotator.view().skeleton_visible(id));
        assert!(annotator.skeletons()[0].show_keypoints);
        assert_eq!(annotator.scene().markers().count(), 2);
        assert_eq!(annotator.scene().lines().count(), 1);
    }

    #[test]
    fn test_keypoint_size_resizes_markers_in_place() {
        let mut annotator = placed_pair();
        annotator.execute(Command::SetKeypointSize(50)).unwrap();
        assert_eq!(annotator.preferences().keypoint_size, 20);
        let (_, marker) = annotator.scene().markers().next().unwrap();
        assert_eq!(marker.width, 20.0);
        assert_eq!(marker.center().x, 10.0);
        assert_eq!(annotator.skeletons()[0].keypoints[0].position(), Some((10, 10)));
    }

    #[test]
    fn test_line_preferences_restyle_lines() {
        let mut annotator = placed_pair();
        annotator.execute(Command::SetLineSize(7)).unwrap();
        annotator
            .execute(Command::SetDefaultLineColor("#ff00ff".to_string()))
            .unwrap();
        let (_, line) = annotator.scene().lines().next().unwrap();
        assert_eq!(line.width, 7.0);
        assert_eq!(line.color, "#ff00ff");
    }

    #[test]
    fn test_panels_and_flags() {
        let mut annotator = placed_pair();
        annotator
            .execute(Command::ToggleLeftPanel(LeftPanel::Shortcuts))
            .unwrap();
        annotator.execute(Command::SetNoChangesNeeded(true)).unwrap();
        assert_eq!(annotator.view().left_panel, Some(LeftPanel::Shortcuts));
        assert!(annotator.view().no_changes_needed);
    }
}
