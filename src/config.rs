//! Task configuration and user preferences.
//!
//! A task is configured through a set of attributes (`imgSrc`,
//! `keypointClasses`, `skeletonRig`, ...). Structured attributes may arrive
//! either as JSON values or as JSON-encoded strings, the way HTML attributes
//! carry them. Everything is parsed and validated up front; any failure is a
//! [`ConfigError`] and aborts construction.
//!
//! User preferences (marker size, line width, line colors, log level) are
//! versioned and persisted through a [`PreferenceStore`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skat_rig::{BoundingBox, KeypointClass, RigError, SkeletonRig};

use crate::constants::{
    DEFAULT_KEYPOINT_SIZE, DEFAULT_LINE_COLOR, DEFAULT_LINE_SIZE, MAX_DRAW_SIZE, MIN_DRAW_SIZE,
};
use crate::model::{AnnotationIssue, AnnotationRecord};

// ============================================================================
// Task attributes
// ============================================================================

/// Raw task attributes, keyed the way the labeling platform names them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttributes {
    #[serde(default)]
    pub img_src: Option<String>,
    #[serde(default)]
    pub keypoint_classes: Option<Value>,
    #[serde(default)]
    pub skeleton_rig: Option<Value>,
    #[serde(default)]
    pub skeleton_bounding_box: Option<Value>,
    #[serde(default)]
    pub initial_values: Option<Value>,
    #[serde(default)]
    pub annotation_issues: Option<Value>,
    #[serde(default)]
    pub unique_skeleton_colors: Option<Value>,
}

impl TaskAttributes {
    /// Parse an attribute object from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options attached to a prior annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationOptions {
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub line_color: Option<String>,
    #[serde(default)]
    pub keypoint_color: Option<String>,
    #[serde(default)]
    pub keypoint_style: Option<String>,
}

/// One prior annotation to hydrate into a skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialValue {
    #[serde(default)]
    pub name: Option<String>,
    pub annotations: Vec<AnnotationRecord>,
    #[serde(default)]
    pub annotation_issues: Vec<AnnotationIssue>,
    #[serde(default)]
    pub annotation_options: Option<AnnotationOptions>,
}

/// Palette mode for telling skeleton instances apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniqueSkeletonColors {
    /// `true` cycles through the built-in palette; `false` disables
    Enabled(bool),
    /// Cycle through a caller-supplied palette
    Palette(Vec<String>),
}

impl UniqueSkeletonColors {
    /// Color for the `creation_count`-th skeleton created (1-based), or
    /// `None` when unique colors are disabled.
    pub fn color_for(&self, creation_count: usize) -> Option<String> {
        let index = creation_count.saturating_sub(1);
        match self {
            UniqueSkeletonColors::Enabled(false) => None,
            UniqueSkeletonColors::Enabled(true) => Some(skat_rig::palette_color(index).to_string()),
            UniqueSkeletonColors::Palette(colors) if colors.is_empty() => None,
            UniqueSkeletonColors::Palette(colors) => Some(colors[index % colors.len()].clone()),
        }
    }
}

/// Validated task configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub img_src: String,
    pub keypoint_classes: Vec<KeypointClass>,
    pub skeleton_rig: SkeletonRig,
    pub skeleton_bounding_box: Option<BoundingBox>,
    pub initial_values: Vec<InitialValue>,
    /// `initialValues` exactly as received, echoed back on submission
    pub raw_initial_values: Option<String>,
    pub annotation_issues: Vec<AnnotationIssue>,
    pub unique_skeleton_colors: Option<UniqueSkeletonColors>,
}

/// Decode a structured attribute that may be a JSON value or a JSON string.
fn decode<T: DeserializeOwned>(attribute: &'static str, value: &Value) -> Result<T, ConfigError> {
    let result = match value {
        Value::String(s) => serde_json::from_str(s),
        other => serde_json::from_value(other.clone()),
    };
    result.map_err(|source| ConfigError::InvalidAttribute { attribute, source })
}

fn decode_optional<T: DeserializeOwned>(
    attribute: &'static str,
    value: &Option<Value>,
) -> Result<Option<T>, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => decode(attribute, v).map(Some),
    }
}

impl TaskConfig {
    /// Parse and validate task attributes.
    pub fn from_attributes(attributes: &TaskAttributes) -> Result<Self, ConfigError> {
        let img_src = attributes
            .img_src
            .clone()
            .ok_or(ConfigError::MissingAttribute {
                attribute: "imgSrc",
            })?;

        let keypoint_classes: Vec<KeypointClass> =
            decode_optional("keypointClasses", &attributes.keypoint_classes)?.ok_or(
                ConfigError::MissingAttribute {
                    attribute: "keypointClasses",
                },
            )?;
        let skeleton_rig: SkeletonRig =
            decode_optional("skeletonRig", &attributes.skeleton_rig)?.unwrap_or_default();
        let skeleton_bounding_box =
            decode_optional("skeletonBoundingBox", &attributes.skeleton_bounding_box)?;
        let initial_values: Vec<InitialValue> =
            decode_optional("initialValues", &attributes.initial_values)?.unwrap_or_default();
        let annotation_issues: Vec<AnnotationIssue> =
            decode_optional("annotationIssues", &attributes.annotation_issues)?
                .unwrap_or_default();
        let unique_skeleton_colors =
            decode_optional("uniqueSkeletonColors", &attributes.unique_skeleton_colors)?;

        let raw_initial_values = attributes.initial_values.as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        let config = Self {
            img_src,
            keypoint_classes,
            skeleton_rig,
            skeleton_bounding_box,
            initial_values,
            raw_initial_values,
            annotation_issues,
            unique_skeleton_colors,
        };
        config.validate()?;
        log::info!(
            "Loaded task: {} keypoint classes, {} rig connections, {} initial skeletons",
            config.keypoint_classes.len(),
            config.skeleton_rig.len(),
            config.initial_values.len()
        );
        Ok(config)
    }

    /// Parse and validate a JSON attribute object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_attributes(&TaskAttributes::from_json(json)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.img_src.trim().is_empty() {
            return Err(ConfigError::validation("imgSrc", "must not be empty"));
        }
        if self.keypoint_classes.is_empty() {
            return Err(ConfigError::validation(
                "keypointClasses",
                "at least one keypoint class is required",
            ));
        }
        if let Some(class) = self.keypoint_classes.iter().find(|c| c.label.is_empty()) {
            return Err(ConfigError::validation(
                "keypointClasses",
                format!("empty label in class {:?}", class),
            ));
        }
        self.skeleton_rig.validate(&self.keypoint_classes)?;

        if let Some(bbox) = &self.skeleton_bounding_box {
            if bbox.right < bbox.left || bbox.bottom < bbox.top {
                return Err(ConfigError::validation(
                    "skeletonBoundingBox",
                    "right/bottom must not be less than left/top",
                ));
            }
        }
        if let Some(record) = self
            .initial_values
            .iter()
            .flat_map(|v| v.annotations.iter())
            .find(|a| a.label.is_empty())
        {
            return Err(ConfigError::validation(
                "initialValues",
                format!("annotation at ({}, {}) has an empty label", record.x, record.y),
            ));
        }
        if matches!(&self.unique_skeleton_colors, Some(UniqueSkeletonColors::Palette(p)) if p.is_empty())
        {
            return Err(ConfigError::validation(
                "uniqueSkeletonColors",
                "palette must contain at least one color",
            ));
        }
        Ok(())
    }

    /// Last path segment of the image source.
    pub fn image_name(&self) -> &str {
        self.img_src.rsplit('/').next().unwrap_or(&self.img_src)
    }
}

// ============================================================================
// User preferences
// ============================================================================

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current preferences format version.
/// Increment this when making breaking changes to the format.
pub const PREFERENCES_VERSION: u32 = 1;

/// Drawing preferences persisted across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Version of the preferences format
    pub version: u32,

    /// Keypoint marker diameter in image pixels
    #[serde(default = "default_keypoint_size")]
    pub keypoint_size: u32,

    /// Rig line width
    #[serde(default = "default_line_size")]
    pub line_size: u32,

    /// Fallback line color
    #[serde(default = "default_line_color")]
    pub line_color: String,

    /// Ignore rig and skeleton line colors
    #[serde(default)]
    pub force_default_line_color: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_keypoint_size() -> u32 {
    DEFAULT_KEYPOINT_SIZE
}

fn default_line_size() -> u32 {
    DEFAULT_LINE_SIZE
}

fn default_line_color() -> String {
    DEFAULT_LINE_COLOR.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            keypoint_size: default_keypoint_size(),
            line_size: default_line_size(),
            line_color: default_line_color(),
            force_default_line_color: false,
            log_level: LogLevel::default(),
        }
    }
}

/// Clamp a marker or line size into the accepted range.
pub fn clamp_draw_size(size: u32) -> u32 {
    size.clamp(MIN_DRAW_SIZE, MAX_DRAW_SIZE)
}

impl Preferences {
    /// Serialize the preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize preferences from JSON, clamping sizes into range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut prefs: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if prefs.version > PREFERENCES_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: prefs.version,
                supported_version: PREFERENCES_VERSION,
            });
        }

        prefs.keypoint_size = clamp_draw_size(prefs.keypoint_size);
        prefs.line_size = clamp_draw_size(prefs.line_size);
        Ok(prefs)
    }

    /// Get the default filename for the preferences file.
    pub fn default_filename() -> &'static str {
        "skat-preferences.json"
    }
}

/// Somewhere preferences can be loaded from and saved to.
pub trait PreferenceStore {
    /// Load stored preferences; `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Preferences>, ConfigError>;

    fn save(&mut self, preferences: &Preferences) -> Result<(), ConfigError>;
}

/// Load preferences, falling back to defaults when missing or unreadable.
pub fn load_preferences_or_default(store: &dyn PreferenceStore) -> Preferences {
    match store.load() {
        Ok(Some(prefs)) => prefs,
        Ok(None) => {
            log::debug!("No stored preferences, using defaults");
            Preferences::default()
        }
        Err(e) => {
            log::warn!("Failed to load preferences: {}", e);
            Preferences::default()
        }
    }
}

/// In-memory store, used by tests and hosts that manage persistence
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    json: Option<String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved JSON, if any.
    pub fn saved_json(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, ConfigError> {
        self.json.as_deref().map(Preferences::from_json).transpose()
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), ConfigError> {
        self.json = Some(preferences.to_json()?);
        Ok(())
    }
}

/// Preferences file in the user's config directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FilePreferenceStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default path, if a config directory can be determined.
    pub fn at_default_path() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    /// Get the default preferences file path.
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(
                config_dir
                    .join("skat")
                    .join(Preferences::default_filename()),
            )
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("skat")
                    .join(Preferences::default_filename())
            })
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, ConfigError> {
        if !self.path.exists() {
            log::debug!("No preferences file found at {:?}", self.path);
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let prefs = Preferences::from_json(&json)?;
        log::info!("Loaded preferences from {:?}", self.path);
        Ok(Some(prefs))
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, preferences.to_json()?)?;
        log::info!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

/// Preferences kept in the browser's localStorage.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStoragePreferenceStore;

#[cfg(target_arch = "wasm32")]
impl LocalStoragePreferenceStore {
    /// LocalStorage key for preference persistence.
    const LOCALSTORAGE_KEY: &'static str = "skat-preferences";

    fn storage() -> Result<web_sys::Storage, ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;
        window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStore for LocalStoragePreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, ConfigError> {
        let storage = Self::storage()?;
        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => {
                let prefs = Preferences::from_json(&json)?;
                log::info!("Loaded preferences from localStorage");
                Ok(Some(prefs))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(ConfigError::StorageError(format!(
                "Failed to read from localStorage: {:?}",
                e
            ))),
        }
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), ConfigError> {
        let json = preferences.to_json()?;
        Self::storage()?
            .set_item(Self::LOCALSTORAGE_KEY, &json)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;
        log::info!("Saved preferences to localStorage");
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An attribute is not valid JSON or does not match its schema
    #[error(
        "Invalid value for attribute \"{attribute}\"; it must be valid JSON matching its schema: {source}"
    )]
    InvalidAttribute {
        attribute: &'static str,
        source: serde_json::Error,
    },

    /// A required attribute was not supplied
    #[error("Missing required attribute \"{attribute}\"")]
    MissingAttribute { attribute: &'static str },

    /// An attribute parsed but failed validation
    #[error("Input validation failed for attribute \"{attribute}\": {message}")]
    Validation {
        attribute: &'static str,
        message: String,
    },

    /// The rig does not match the keypoint classes
    #[error("Invalid skeleton rig: {0}")]
    Rig(#[from] RigError),

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Preferences version is newer than supported
    #[error(
        "Preferences version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing preferences
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ConfigError {
    /// Create a validation error.
    pub fn validation(attribute: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute,
            message: message.into(),
        }
    }
}
