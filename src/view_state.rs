//! Presentation state around the canvas.
//!
//! Panel visibility, per-skeleton panel toggles, the pointer readout and the
//! inline error banner live here, apart from the annotation model. The state
//! is replaced wholesale on every [`ViewMessage`], so a host can diff or
//! re-render from any snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::SkeletonId;

/// Side panels left of the canvas. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeftPanel {
    Instructions,
    AnnotationInsights,
    Shortcuts,
}

/// Side panels right of the canvas. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RightPanel {
    Skeletons,
    Settings,
}

/// Panel entry for one skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkeletonPanel {
    pub expanded: bool,
    /// The panel's eye toggle. While global visibility is off this keeps the
    /// skeleton drawn.
    pub visible: bool,
}

/// Pointer position readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointerReadout {
    pub canvas: (i32, i32),
    pub image: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub left_panel: Option<LeftPanel>,
    pub right_panel: Option<RightPanel>,
    pub skeleton_panels: BTreeMap<SkeletonId, SkeletonPanel>,
    /// Size of the element hosting the canvas
    pub container: (f64, f64),
    pub pointer: Option<PointerReadout>,
    pub no_changes_needed: bool,
    /// Error shown inline to the operator
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            left_panel: None,
            right_panel: Some(RightPanel::Skeletons),
            skeleton_panels: BTreeMap::new(),
            container: (0.0, 0.0),
            pointer: None,
            no_changes_needed: false,
            error: None,
        }
    }
}

/// Changes to the view state.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMessage {
    /// Open a left panel, or close it if it is already open
    ToggleLeftPanel(LeftPanel),
    /// Open a right panel, or close it if it is already open
    ToggleRightPanel(RightPanel),
    AddSkeletonPanel { skeleton: SkeletonId, expanded: bool, visible: bool },
    RemoveSkeletonPanel(SkeletonId),
    SetSkeletonExpanded { skeleton: SkeletonId, expanded: bool },
    SetSkeletonVisible { skeleton: SkeletonId, visible: bool },
    ContainerResized { width: f64, height: f64 },
    PointerMoved(PointerReadout),
    SetNoChangesNeeded(bool),
    ShowError(String),
    DismissError,
}

impl ViewState {
    pub fn new(container: (f64, f64)) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Apply a message, producing the next view state.
    pub fn update(mut self, message: ViewMessage) -> Self {
        match message {
            ViewMessage::ToggleLeftPanel(panel) => {
                self.left_panel = (self.left_panel != Some(panel)).then_some(panel);
            }
            ViewMessage::ToggleRightPanel(panel) => {
                self.right_panel = (self.right_panel != Some(panel)).then_some(panel);
            }
            ViewMessage::AddSkeletonPanel {
                skeleton,
                expanded,
                visible,
            } => {
                self.skeleton_panels
                    .insert(skeleton, SkeletonPanel { expanded, visible });
            }
            ViewMessage::RemoveSkeletonPanel(skeleton) => {
                self.skeleton_panels.remove(&skeleton);
            }
            ViewMessage::SetSkeletonExpanded { skeleton, expanded } => {
                if let Some(panel) = self.skeleton_panels.get_mut(&skeleton) {
                    panel.expanded = expanded;
                }
            }
            ViewMessage::SetSkeletonVisible { skeleton, visible } => {
                if let Some(panel) = self.skeleton_panels.get_mut(&skeleton) {
                    panel.visible = visible;
                }
            }
            ViewMessage::ContainerResized { width, height } => {
                self.container = (width, height);
            }
            ViewMessage::PointerMoved(readout) => self.pointer = Some(readout),
            ViewMessage::SetNoChangesNeeded(value) => self.no_changes_needed = value,
            ViewMessage::ShowError(message) => self.error = Some(message),
            ViewMessage::DismissError => self.error = None,
        }
        self
    }

    /// Whether the skeleton's panel toggle is on. Unknown skeletons count as
    /// hidden.
    pub fn skeleton_visible(&self, skeleton: SkeletonId) -> bool {
        self.skeleton_panels
            .get(&skeleton)
            .is_some_and(|panel| panel.visible)
    }

    /// Pointer readout text for the canvas overlay.
    pub fn coordinates_text(&self) -> Option<String> {
        self.pointer.map(|p| {
            format!(
                "Canvas Coordinates: ({}, {}) Image Coordinates: ({}, {})",
                p.canvas.0, p.canvas.1, p.image.0, p.image.1
            )
        })
    }
}
