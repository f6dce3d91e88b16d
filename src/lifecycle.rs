//! Skeleton lifecycle: creation, hydration from prior annotations, deletion.

use skat_rig::palette_color;

use crate::annotator::SkeletonAnnotator;
use crate::constants::hotkey_for_index;
use crate::mode::ActionMode;
use crate::model::{DrawStyle, KeypointState, SkeletonId, SkeletonState};
use crate::undo::Change;
use crate::view_state::ViewMessage;

impl SkeletonAnnotator {
    /// Index of a skeleton in the ordered skeleton list.
    pub(crate) fn skeleton_index(&self, id: SkeletonId) -> Option<usize> {
        self.skeletons.iter().position(|s| s.id == id)
    }

    /// A new editable skeleton with one unplaced keypoint per class.
    pub(crate) fn create_empty_skeleton(&mut self) -> SkeletonState {
        let keypoints = self
            .config
            .keypoint_classes
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let color = class
                    .color
                    .clone()
                    .unwrap_or_else(|| palette_color(i).to_string());
                let mut keypoint = KeypointState::new(class.label.clone(), color);
                keypoint.hotkey = Some(hotkey_for_index(i));
                keypoint
            })
            .collect();
        SkeletonState::new(self.ids.next_id(), self.rig.clone(), keypoints)
    }

    /// Build one skeleton per prior annotation in the task.
    pub(crate) fn hydrate(&mut self) -> Vec<SkeletonState> {
        let initial_values = self.config.initial_values.clone();
        let mut hydrated = Vec::with_capacity(initial_values.len());

        for value in initial_values {
            let mut skeleton = self.create_empty_skeleton();
            let options = value.annotation_options.unwrap_or_default();

            skeleton.name = value.name;
            skeleton.editable = options.editable.unwrap_or(true);
            skeleton.line_color = options.line_color;
            skeleton.annotation_issues = value.annotation_issues;

            let style = options
                .keypoint_style
                .as_deref()
                .map(DrawStyle::from_option_name);

            for keypoint in &mut skeleton.keypoints {
                if let Some(color) = &options.keypoint_color {
                    keypoint.color = color.clone();
                }
                if let Some(style) = style {
                    keypoint.draw_style = style;
                }
                // Unmatched classes stay unplaced; duplicates resolve to the first
                if let Some(record) = value.annotations.iter().find(|a| a.label == keypoint.label) {
                    keypoint.set_position(record.x, record.y);
                }
            }

            log::debug!(
                "Hydrated skeleton {} with {}/{} keypoints placed",
                skeleton.id,
                skeleton.placed_count(),
                skeleton.keypoints.len()
            );
            hydrated.push(skeleton);
        }
        hydrated
    }

    /// Append a skeleton, give it a unique color when configured, add its
    /// panel and draw it.
    pub(crate) fn add_skeleton(
        &mut self,
        mut skeleton: SkeletonState,
        expanded: bool,
        make_active: bool,
    ) -> SkeletonId {
        self.skeletons_created += 1;

        if let Some(color) = self
            .config
            .unique_skeleton_colors
            .as_ref()
            .and_then(|colors| colors.color_for(self.skeletons_created))
        {
            skeleton.line_color = Some(color.clone());
            for (keypoint, class) in skeleton
                .keypoints
                .iter_mut()
                .zip(&self.config.keypoint_classes)
            {
                if class.color.is_none() {
                    keypoint.color = color.clone();
                }
            }
        }

        let id = skeleton.id;
        let visible = skeleton.show_keypoints;
        self.skeletons.push(skeleton);
        self.update_view(ViewMessage::AddSkeletonPanel {
            skeleton: id,
            expanded,
            visible,
        });

        if make_active {
            self.set_active_skeleton(Some(self.skeletons.len() - 1), None, true);
            if let Some(first) = self.config.keypoint_classes.first().map(|c| c.label.clone()) {
                self.set_active_keypoint_class(&first);
            }
        }

        self.draw_skeleton(id);
        log::info!("Added skeleton {} ({} total)", id, self.skeletons.len());
        id
    }

    /// Add an empty skeleton, make it active and switch to placing keypoints.
    pub fn add_new_skeleton(&mut self) -> SkeletonId {
        let skeleton = self.create_empty_skeleton();
        let id = self.add_skeleton(skeleton, true, true);
        self.enter_mode(ActionMode::DrawKeypoints);
        id
    }

    /// Delete a skeleton with everything drawn for it. Clears the undo log.
    /// Returns whether the skeleton existed.
    pub fn delete_skeleton(&mut self, id: SkeletonId) -> bool {
        let Some(index) = self.skeleton_index(id) else {
            return false;
        };

        self.history.record(Change::SkeletonDeleted { skeleton: id });
        self.update_view(ViewMessage::RemoveSkeletonPanel(id));
        self.scene.remove_where(|o| o.skeleton() == Some(id));
        self.scene.clear_checkmarks(Some(id));
        self.skeletons.remove(index);

        let active_deleted = self.active_skeleton == Some(index);
        self.active_skeleton = match self.active_skeleton {
            Some(active) if active == index => {
                if index > 0 {
                    Some(index - 1)
                } else if self.skeletons.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        if active_deleted {
            if let Some(label) = self.active_keypoint_label().map(str::to_string) {
                self.set_active_keypoint_class(&label);
            }
        }

        self.skeletons_created = self.skeletons.len();
        if self.draft.is_some_and(|d| d.skeleton == id) {
            self.draft = None;
        }
        log::info!("Deleted skeleton {} ({} left)", id, self.skeletons.len());
        true
    }

    /// Clear every keypoint of one skeleton, or of all skeletons. Not
    /// recorded in the undo log.
    pub fn delete_all_keypoints(&mut self, skeleton: Option<SkeletonId>) {
        let ids: Vec<SkeletonId> = self
            .skeletons
            .iter()
            .map(|s| s.id)
            .filter(|id| skeleton.is_none_or(|target| target == *id))
            .collect();

        for id in ids {
            if let Some(index) = self.skeleton_index(id) {
                for keypoint in &mut self.skeletons[index].keypoints {
                    keypoint.clear_position();
                }
            }
            self.scene.clear_checkmarks(Some(id));
            self.scene.remove_where(|o| o.skeleton() == Some(id));
            log::debug!("Cleared all keypoints of skeleton {}", id);
        }

        if let Some(first) = self.config.keypoint_classes.first().map(|c| c.label.clone()) {
            self.set_active_keypoint_class(&first);
        }
    }
}
