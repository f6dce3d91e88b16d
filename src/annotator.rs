//! The annotation engine façade.
//!
//! [`SkeletonAnnotator`] owns the skeleton model, the undo log and the
//! retained scene. Its behavior is spread over several modules, each adding
//! an `impl SkeletonAnnotator` block:
//!
//! - `render.rs` keeps the scene in sync with the model
//! - `lifecycle.rs` creates, hydrates and deletes skeletons
//! - `navigation.rs` moves the active skeleton and keypoint class
//! - `interaction.rs` interprets pointer, keyboard and scene events
//! - `commands.rs` runs toolbar, panel and hotkey commands
//! - `undo.rs`, `mode.rs`, `submission.rs`
//!
//! Construction parses and validates the task; nothing is drawn and no
//! input is accepted until the host reports the image as loaded.

use std::rc::Rc;

use skat_rig::SkeletonRig;
use web_time::Instant;

use crate::config::{
    PreferenceStore, Preferences, TaskAttributes, TaskConfig, load_preferences_or_default,
};
use crate::error::AnnotatorError;
use crate::keybindings::KeyBindings;
use crate::mode::ActionMode;
use crate::model::{AnnotationIssue, SkeletonId, SkeletonIdGenerator, SkeletonState};
use crate::pointer::PointerState;
use crate::scene::{BaseImage, Scene, SceneObjectKind};
use crate::transform::{ImagePlacement, MarkerSize, Point};
use crate::undo::ChangeLog;
use crate::view_state::{ViewMessage, ViewState};
use crate::viewport::ZoomLimits;

/// Image load progress. Only `Ready` accepts input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Loading failed; the annotator stays non-interactive
    Failed(String),
}

/// A skeleton being dragged out in draw-skeleton mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SkeletonDraft {
    pub skeleton: SkeletonId,
    /// Canvas position of the press that started the draft
    pub start: Point,
}

/// Skeleton keypoint annotation engine.
pub struct SkeletonAnnotator {
    pub(crate) config: TaskConfig,
    pub(crate) rig: Rc<SkeletonRig>,
    pub(crate) preferences: Preferences,
    store: Box<dyn PreferenceStore>,

    pub(crate) skeletons: Vec<SkeletonState>,
    pub(crate) ids: SkeletonIdGenerator,
    /// Skeletons created so far; drives unique colors and panel numbering
    pub(crate) skeletons_created: usize,
    /// Index into `skeletons` of the skeleton being edited
    pub(crate) active_skeleton: Option<usize>,
    /// Index of the active keypoint class
    pub(crate) keypoint_index: usize,

    pub(crate) mode: ActionMode,
    pub(crate) history: ChangeLog,
    pub(crate) scene: Scene,
    pub(crate) placement: Option<ImagePlacement>,
    pub(crate) marker_size: MarkerSize,
    pub(crate) zoom_limits: Option<ZoomLimits>,

    pub(crate) load_state: LoadState,
    /// Set until the base image is on the canvas; all drawing is skipped
    pub(crate) delay_rendering: bool,
    /// Global skeleton visibility
    pub(crate) show_skeletons: bool,

    pub(crate) view: ViewState,
    pub(crate) pointer: PointerState,
    pub(crate) draft: Option<SkeletonDraft>,
    pub(crate) keybindings: KeyBindings,
    started_at: Option<Instant>,
}

impl SkeletonAnnotator {
    /// Create an annotator for a validated task. Prior annotations are
    /// hydrated immediately but drawn only once the image has loaded.
    pub fn new(config: TaskConfig, store: Box<dyn PreferenceStore>, container: (f64, f64)) -> Self {
        let preferences = load_preferences_or_default(store.as_ref());
        let rig = Rc::new(config.skeleton_rig.clone());
        let marker_size = MarkerSize::new(f64::from(preferences.keypoint_size));

        let mut annotator = Self {
            config,
            rig,
            preferences,
            store,
            skeletons: Vec::new(),
            ids: SkeletonIdGenerator::new(),
            skeletons_created: 0,
            active_skeleton: None,
            keypoint_index: 0,
            mode: ActionMode::default(),
            history: ChangeLog::new(),
            scene: Scene::new(),
            placement: None,
            marker_size,
            zoom_limits: None,
            load_state: LoadState::Loading,
            delay_rendering: true,
            show_skeletons: true,
            view: ViewState::new(container),
            pointer: PointerState::new(),
            draft: None,
            keybindings: KeyBindings::new(),
            started_at: None,
        };

        for skeleton in annotator.hydrate() {
            annotator.add_skeleton(skeleton, true, false);
        }
        annotator.set_active_skeleton(Some(0), None, true);

        log::info!(
            "Annotator created for '{}' with {} skeletons",
            annotator.config.image_name(),
            annotator.skeletons.len()
        );
        annotator
    }

    /// Parse and validate task attributes, then create the annotator. A
    /// configuration error is fatal for the instance.
    pub fn from_attributes(
        attributes: &TaskAttributes,
        store: Box<dyn PreferenceStore>,
        container: (f64, f64),
    ) -> Result<Self, AnnotatorError> {
        let config = TaskConfig::from_attributes(attributes).inspect_err(|e| {
            log::error!("Invalid task configuration: {}", e);
        })?;
        Ok(Self::new(config, store, container))
    }

    // ========================================================================
    // Load gate
    // ========================================================================

    /// The host finished loading the base image. Places it on the canvas,
    /// lifts the rendering gate and draws every skeleton.
    pub fn image_loaded(&mut self, width: u32, height: u32) -> Result<(), AnnotatorError> {
        match &self.load_state {
            LoadState::Loading => {}
            LoadState::Ready => {
                log::warn!("Image reported as loaded twice, ignoring");
                return Ok(());
            }
            LoadState::Failed(reason) => return Err(AnnotatorError::NotReady(reason.clone())),
        }

        let (container_width, container_height) = self.view.container;
        let placement = ImagePlacement::fit(width, height, container_width, container_height);
        let origin = placement.image_origin();
        let (scaled_width, scaled_height) = placement.scaled_size();
        self.scene.add(SceneObjectKind::BaseImage(BaseImage {
            left: origin.x,
            top: origin.y,
            width: scaled_width,
            height: scaled_height,
        }));
        self.placement = Some(placement);
        self.zoom_limits = Some(ZoomLimits::for_image(
            (width, height),
            (container_width, container_height),
        ));

        self.load_state = LoadState::Ready;
        self.delay_rendering = false;
        self.redraw_all_items();
        self.zoom_reset();
        self.started_at = Some(Instant::now());

        log::info!(
            "Image loaded: {}x{} on a {}x{} canvas (scale {:.3})",
            width,
            height,
            placement.canvas_width,
            placement.canvas_height,
            placement.scale_x
        );
        Ok(())
    }

    /// The host failed to load the base image. The annotator stays
    /// non-interactive; the returned error is also shown inline.
    pub fn image_failed(&mut self, reason: impl Into<String>) -> AnnotatorError {
        let err = AnnotatorError::image_load(self.config.img_src.clone(), reason);
        self.load_state = LoadState::Failed(err.to_string());
        self.notify_error(&err);
        err
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), AnnotatorError> {
        match &self.load_state {
            LoadState::Ready => Ok(()),
            LoadState::Loading => Err(AnnotatorError::NotReady(
                "the image is still loading".to_string(),
            )),
            LoadState::Failed(reason) => Err(AnnotatorError::NotReady(reason.clone())),
        }
    }

    /// Log an error and show it inline.
    pub(crate) fn notify_error(&mut self, err: &AnnotatorError) {
        log::error!("{}", err);
        self.update_view(ViewMessage::ShowError(err.to_string()));
    }

    pub(crate) fn update_view(&mut self, message: ViewMessage) {
        let view = std::mem::take(&mut self.view);
        self.view = view.update(message);
    }

    /// Persist the current preferences. Failures are logged, not surfaced.
    pub(crate) fn save_preferences(&mut self) {
        if let Err(e) = self.store.save(&self.preferences) {
            log::warn!("Failed to save preferences: {}", e);
        }
    }

    /// Whole seconds since the image became ready.
    pub(crate) fn elapsed_seconds(&self) -> u64 {
        self.started_at
            .map(|start| start.elapsed().as_secs_f64().round() as u64)
            .unwrap_or(0)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    pub fn skeletons(&self) -> &[SkeletonState] {
        &self.skeletons
    }

    pub fn skeleton(&self, id: SkeletonId) -> Option<&SkeletonState> {
        self.skeletons.iter().find(|s| s.id == id)
    }

    pub fn active_skeleton(&self) -> Option<&SkeletonState> {
        self.active_skeleton.and_then(|i| self.skeletons.get(i))
    }

    pub fn keypoint_index(&self) -> usize {
        self.keypoint_index
    }

    /// Label of the active keypoint class.
    pub fn active_keypoint_label(&self) -> Option<&str> {
        self.config
            .keypoint_classes
            .get(self.keypoint_index)
            .map(|c| c.label.as_str())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn history(&self) -> &ChangeLog {
        &self.history
    }

    pub fn placement(&self) -> Option<&ImagePlacement> {
        self.placement.as_ref()
    }

    pub fn zoom_limits(&self) -> Option<&ZoomLimits> {
        self.zoom_limits.as_ref()
    }

    pub fn show_skeletons(&self) -> bool {
        self.show_skeletons
    }

    /// Task-level reviewer notes for the insights panel.
    pub fn annotation_issues(&self) -> &[AnnotationIssue] {
        &self.config.annotation_issues
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    /// Error currently shown inline, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.view.error.as_deref()
    }
}
