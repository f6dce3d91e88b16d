//! SKAT - Skeleton Keypoint Annotation Tool
//!
//! A headless annotation engine for placing skeleton keypoints on an image.
//! The engine owns the skeleton model, the undo history and a retained scene
//! that a host (the wasm binding, the native CLI, or a test) renders and feeds
//! input events back into.

pub mod affine;
mod annotator;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
mod interaction;
pub mod keybindings;
mod lifecycle;
pub mod mode;
pub mod model;
mod navigation;
pub mod pointer;
mod render;
pub mod scene;
pub mod submission;
pub mod transform;
pub mod undo;
pub mod view_state;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use annotator::{LoadState, SkeletonAnnotator};
pub use commands::Command;
pub use config::{PreferenceStore, Preferences, TaskAttributes, TaskConfig};
pub use error::AnnotatorError;
pub use input::Event;
pub use mode::ActionMode;
pub use submission::Submission;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
