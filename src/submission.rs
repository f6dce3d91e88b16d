//! Form submission payload.

use serde::{Deserialize, Serialize};

use crate::annotator::SkeletonAnnotator;
use crate::error::AnnotatorError;
use crate::mode::ActionMode;
use crate::model::SkeletonRecord;

/// What the host submits to the labeling platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// JSON array of `{name, annotations: [{label, x, y}]}`, one per skeleton
    pub updated_annotations: String,
    /// `initialValues` exactly as received
    pub original_annotations: Option<String>,
    pub image_s3_uri: String,
    pub image_name: String,
    pub no_changes_needed: bool,
    pub total_time_in_seconds: u64,
}

impl SkeletonAnnotator {
    /// Current annotations, omitting unplaced keypoints.
    pub fn annotation_records(&self) -> Vec<SkeletonRecord> {
        self.skeletons.iter().map(|s| s.to_record()).collect()
    }

    /// Build the submission payload. Grouped skeletons are committed first by
    /// returning to keypoint mode.
    pub fn submission(&mut self) -> Result<Submission, AnnotatorError> {
        self.ensure_ready()?;
        self.enter_mode(ActionMode::DrawKeypoints);

        let updated_annotations = serde_json::to_string(&self.annotation_records())?;
        let submission = Submission {
            updated_annotations,
            original_annotations: self.config.raw_initial_values.clone(),
            image_s3_uri: self.config.img_src.clone(),
            image_name: self.config.image_name().to_string(),
            no_changes_needed: self.view.no_changes_needed,
            total_time_in_seconds: self.elapsed_seconds(),
        };
        log::info!(
            "Submitting {} skeletons after {}s",
            self.skeletons.len(),
            submission.total_time_in_seconds
        );
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affine::Affine;
    use crate::input::Event;
    use crate::model::SkeletonId;
    use crate::tests::{annotator, annotator_with_image, two_class_config};

    #[test]
    fn test_submission_requires_load() {
        let mut annotator = annotator(two_class_config(None));
        assert!(annotator.submission().is_err());
    }

    #[test]
    fn test_submission_payload() {
        let mut config = two_class_config(None);
        config.img_src = "s3://bucket/images/cat.jpg".to_string();
        let mut annotator = annotator_with_image(config);
        let id = annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[1].set_position(4, 5);
        annotator.skeletons[0].name = Some("cat".to_string());
        annotator.execute(crate::commands::Command::SetNoChangesNeeded(true)).unwrap();

        let submission = annotator.submission().unwrap();
        assert_eq!(id, SkeletonId(1));
        assert_eq!(
            submission.updated_annotations,
            r#"[{"name":"cat","annotations":[{"label":"B","x":4,"y":5}]}]"#
        );
        assert_eq!(submission.image_name, "cat.jpg");
        assert_eq!(submission.image_s3_uri, "s3://bucket/images/cat.jpg");
        assert!(submission.no_changes_needed);
        assert_eq!(submission.original_annotations, None);
    }

    #[test]
    fn test_submission_commits_grouped_moves() {
        let mut annotator = annotator_with_image(two_class_config(None));
        let id = annotator.add_new_skeleton();
        annotator.skeletons[0].keypoints[0].set_position(10, 10);
        annotator.redraw_all_items();
        annotator
            .set_action_mode(ActionMode::AdjustSkeletons)
            .unwrap();
        annotator
            .handle_event(Event::CompositeTransformed {
                skeleton: id,
                affine: Affine::translate(5.0, -3.0),
            })
            .unwrap();

        annotator.submission().unwrap();
        assert_eq!(annotator.action_mode(), ActionMode::DrawKeypoints);
        assert_eq!(annotator.skeletons()[0].keypoints[0].position(), Some((15, 7)));
    }
}
