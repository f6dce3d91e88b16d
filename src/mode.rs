//! Action modes: how pointer input on the canvas is interpreted.

use serde::{Deserialize, Serialize};

use crate::annotator::SkeletonAnnotator;
use crate::error::AnnotatorError;

/// Current interpretation of pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionMode {
    /// Click to place keypoints, drag markers to move them
    #[default]
    DrawKeypoints,
    /// Selecting a marker deletes its keypoint
    DeleteKeypoints,
    /// Drag out a whole skeleton from the rig's authored layout
    DrawSkeleton,
    /// Move and scale whole skeletons as rigid units
    AdjustSkeletons,
}

impl ActionMode {
    /// Get the display name for this mode
    pub fn name(&self) -> &'static str {
        match self {
            ActionMode::DrawKeypoints => "Add/Move Keypoints",
            ActionMode::DeleteKeypoints => "Delete Keypoints",
            ActionMode::DrawSkeleton => "Draw Skeleton",
            ActionMode::AdjustSkeletons => "Adjust Skeletons",
        }
    }

    /// Whether skeletons are grouped into composites in this mode.
    pub fn groups_skeletons(&self) -> bool {
        matches!(self, ActionMode::AdjustSkeletons)
    }
}

impl SkeletonAnnotator {
    /// Switch action mode. Re-entering the current mode is a no-op.
    ///
    /// Drawing a skeleton needs the rig's bounding box; without one the
    /// request is rejected, the error is surfaced, and the mode is unchanged.
    pub fn set_action_mode(&mut self, mode: ActionMode) -> Result<(), AnnotatorError> {
        if self.mode == mode {
            return Ok(());
        }

        if mode == ActionMode::DrawSkeleton && self.config.skeleton_bounding_box.is_none() {
            let err = AnnotatorError::MissingBoundingBox;
            self.notify_error(&err);
            return Err(err);
        }

        self.enter_mode(mode);
        Ok(())
    }

    /// Switch to a mode that needs no precondition check.
    pub(crate) fn enter_mode(&mut self, mode: ActionMode) {
        if self.mode == mode {
            return;
        }
        log::debug!("Action mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        match mode {
            ActionMode::DeleteKeypoints | ActionMode::DrawKeypoints => {
                self.scene.set_marquee_selection(false);
                self.commit_composites();
            }
            ActionMode::DrawSkeleton => {
                self.scene.set_marquee_selection(true);
                self.scene.discard_selection();
            }
            ActionMode::AdjustSkeletons => {
                self.scene.set_marquee_selection(true);
                self.commit_composites();
                self.group_skeletons();
            }
        }
    }

    pub fn action_mode(&self) -> ActionMode {
        self.mode
    }
}
