//! Browser binding.
//!
//! [`WasmAnnotator`] wraps the engine with JSON-in/JSON-out methods: the page
//! forwards canvas events and toolbar commands as JSON and renders the scene
//! snapshot it gets back.

use wasm_bindgen::prelude::*;

use crate::config::{LocalStoragePreferenceStore, TaskAttributes, load_preferences_or_default};
use crate::{AnnotatorError, Command, Event, SkeletonAnnotator};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let prefs = load_preferences_or_default(&LocalStoragePreferenceStore);
    let level = prefs
        .log_level
        .to_level_filter()
        .to_level()
        .unwrap_or(log::Level::Error);
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"SKAT logger was already initialized".into());
    }
    log::info!("SKAT WASM started (log level {:?})", level);
}

#[wasm_bindgen]
pub struct WasmAnnotator {
    inner: SkeletonAnnotator,
}

#[wasm_bindgen]
impl WasmAnnotator {
    /// Parse task attributes (a JSON object) and create the annotator. The
    /// error message is meant to be shown to the operator.
    #[wasm_bindgen(constructor)]
    pub fn new(
        attributes_json: &str,
        container_width: f64,
        container_height: f64,
    ) -> Result<WasmAnnotator, JsValue> {
        let attributes = TaskAttributes::from_json(attributes_json)
            .map_err(AnnotatorError::from)
            .map_err(to_js)?;
        let inner = SkeletonAnnotator::from_attributes(
            &attributes,
            Box::new(LocalStoragePreferenceStore),
            (container_width, container_height),
        )
        .map_err(to_js)?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = imageLoaded)]
    pub fn image_loaded(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.image_loaded(width, height).map_err(to_js)
    }

    /// Report a failed image load; returns the message to show.
    #[wasm_bindgen(js_name = imageFailed)]
    pub fn image_failed(&mut self, reason: &str) -> String {
        self.inner.image_failed(reason).to_string()
    }

    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, event_json: &str) -> Result<(), JsValue> {
        let event: Event = serde_json::from_str(event_json).map_err(to_js)?;
        self.inner.handle_event(event).map_err(to_js)
    }

    pub fn execute(&mut self, command_json: &str) -> Result<(), JsValue> {
        let command: Command = serde_json::from_str(command_json).map_err(to_js)?;
        self.inner.execute(command).map_err(to_js)
    }

    /// Display list, composites, selection, cursor and viewport.
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> Result<String, JsValue> {
        self.inner.scene().to_json().map_err(to_js)
    }

    /// Panel state, pointer readout and inline error.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.view()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = skeletonsJson)]
    pub fn skeletons_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.skeletons()).map_err(to_js)
    }

    /// `[key, description]` pairs for the shortcuts panel.
    #[wasm_bindgen(js_name = shortcutsJson)]
    pub fn shortcuts_json(&self) -> Result<String, JsValue> {
        let labels: Vec<&str> = self
            .inner
            .config()
            .keypoint_classes
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        serde_json::to_string(&self.inner.keybindings().shortcut_descriptions(&labels))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = submissionJson)]
    pub fn submission_json(&mut self) -> Result<String, JsValue> {
        let submission = self.inner.submission().map_err(to_js)?;
        serde_json::to_string(&submission).map_err(to_js)
    }
}
