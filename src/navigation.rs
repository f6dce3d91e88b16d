//! Active skeleton and keypoint class navigation.
//!
//! Navigation needs an active skeleton; without one every call is a no-op.
//! Selecting a class also selects its marker when one is drawn, so a
//! following delete acts on it.

use crate::annotator::SkeletonAnnotator;
use crate::mode::ActionMode;
use crate::model::SkeletonId;

impl SkeletonAnnotator {
    fn class_count(&self) -> usize {
        self.config.keypoint_classes.len()
    }

    fn class_label(&self, index: usize) -> Option<String> {
        self.config
            .keypoint_classes
            .get(index)
            .map(|c| c.label.clone())
    }

    fn is_placed(&self, class_index: usize) -> bool {
        self.active_skeleton()
            .and_then(|s| s.keypoints.get(class_index))
            .is_some_and(|k| k.has_xy())
    }

    fn activate_current_class(&mut self) {
        if let Some(label) = self.class_label(self.keypoint_index) {
            self.set_active_keypoint_class(&label);
        }
    }

    /// Make a class active on the active skeleton and select its marker, or
    /// clear the selection when it has none.
    pub fn set_active_keypoint_class(&mut self, label: &str) {
        let Some(skeleton) = self.active_skeleton().map(|s| s.id) else {
            return;
        };
        if let Some(index) = self
            .config
            .keypoint_classes
            .iter()
            .position(|c| c.label == label)
        {
            self.keypoint_index = index;
        }

        let marker = self
            .scene
            .find_marker(skeleton, label)
            .filter(|(_, m)| m.selectable)
            .map(|(id, _)| id);
        match marker {
            Some(id) => self.scene.select(Some(id)),
            None => self.scene.discard_selection(),
        }
    }

    /// Change the active skeleton.
    ///
    /// Passing `None` or the already active index only (optionally) switches
    /// the class. An out of range index leaves no skeleton active. Without a
    /// `label`, activation starts from the first class and moves on to the
    /// next unmarked one.
    pub(crate) fn set_active_skeleton(
        &mut self,
        index: Option<usize>,
        label: Option<&str>,
        activate_class: bool,
    ) {
        let Some(index) = index.filter(|i| Some(*i) != self.active_skeleton) else {
            if let (Some(label), true) = (label, activate_class) {
                self.set_active_keypoint_class(label);
            }
            return;
        };

        if index >= self.skeletons.len() {
            self.active_skeleton = None;
            return;
        }

        self.active_skeleton = Some(index);
        log::debug!("Active skeleton: {}", self.skeletons[index].id);

        if activate_class {
            match label {
                Some(label) => self.set_active_keypoint_class(label),
                None => {
                    if let Some(first) = self.class_label(0) {
                        self.set_active_keypoint_class(&first);
                    }
                    self.next_unmarked();
                }
            }
        }
    }

    /// Make a skeleton active by id, e.g. from a click on its panel.
    pub fn activate_skeleton(&mut self, id: SkeletonId) {
        let index = self.skeleton_index(id);
        self.set_active_skeleton(index, None, true);
    }

    /// Activate a skeleton and one of its classes, ready for placing.
    pub fn select_keypoint(&mut self, skeleton: SkeletonId, label: &str) {
        let Some(index) = self.skeleton_index(skeleton) else {
            return;
        };
        self.enter_mode(ActionMode::DrawKeypoints);
        self.set_active_skeleton(Some(index), Some(label), true);
    }

    /// Select a class by its position, as a class hotkey does.
    pub fn select_class(&mut self, index: usize) {
        if let Some(label) = self.class_label(index) {
            self.set_active_keypoint_class(&label);
        }
    }

    /// Move to the next class without coordinates. Stays put when every
    /// later class is placed.
    pub fn next_unmarked(&mut self) {
        if self.active_skeleton().is_none() {
            return;
        }
        let start = self.keypoint_index + 1;
        if let Some(i) = (start..self.class_count()).find(|i| !self.is_placed(*i)) {
            self.keypoint_index = i;
        }
        self.activate_current_class();
    }

    /// Move to the previous class without coordinates. Stays put when every
    /// earlier class is placed.
    pub fn previous_unmarked(&mut self) {
        if self.active_skeleton().is_none() {
            return;
        }
        if let Some(i) = (0..self.keypoint_index).rev().find(|i| !self.is_placed(*i)) {
            self.keypoint_index = i;
        }
        self.activate_current_class();
    }

    /// Stay on the current class if it is unplaced, otherwise move forward
    /// to the first unplaced one.
    pub(crate) fn first_unmarked(&mut self) {
        if self.active_skeleton().is_none() {
            return;
        }
        if let Some(i) = (self.keypoint_index..self.class_count()).find(|i| !self.is_placed(*i)) {
            self.keypoint_index = i;
        }
        self.activate_current_class();
    }

    /// Next class, wrapping around.
    pub fn next_keypoint(&mut self) {
        let count = self.class_count();
        if self.active_skeleton().is_none() || count == 0 {
            return;
        }
        self.keypoint_index = (self.keypoint_index + 1) % count;
        self.activate_current_class();
    }

    /// Previous class, wrapping around.
    pub fn previous_keypoint(&mut self) {
        let count = self.class_count();
        if self.active_skeleton().is_none() || count == 0 {
            return;
        }
        self.keypoint_index = (self.keypoint_index + count - 1) % count;
        self.activate_current_class();
    }
}
