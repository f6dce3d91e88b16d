//! SKAT native front end.
//!
//! `skat-native <attributes.json> [image]` validates a task, hydrates its
//! prior annotations against the image and prints the submission payload.
//! Without an image argument, `imgSrc` is read as a local path.

#[cfg(not(target_arch = "wasm32"))]
fn run(attributes_path: &str, image_path: Option<&str>) -> Result<String, skat::AnnotatorError> {
    use skat::config::{
        ConfigError, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, TaskAttributes,
    };
    use skat::SkeletonAnnotator;

    let json = std::fs::read_to_string(attributes_path).map_err(ConfigError::from)?;
    let attributes = TaskAttributes::from_json(&json)?;

    let store: Box<dyn PreferenceStore> = match FilePreferenceStore::at_default_path() {
        Some(store) => Box::new(store),
        None => Box::new(MemoryPreferenceStore::new()),
    };

    let image_path = image_path
        .map(str::to_string)
        .or_else(|| attributes.img_src.clone())
        .unwrap_or_default();
    let (width, height) = match image::image_dimensions(&image_path) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            let mut annotator =
                SkeletonAnnotator::from_attributes(&attributes, store, (0.0, 0.0))?;
            return Err(annotator.image_failed(e.to_string()));
        }
    };

    // Native canvas matches the image: no letterboxing, scale 1
    let mut annotator = SkeletonAnnotator::from_attributes(
        &attributes,
        store,
        (f64::from(width), f64::from(height)),
    )?;
    annotator.image_loaded(width, height)?;

    for (position, skeleton) in annotator.skeletons().iter().enumerate() {
        log::info!(
            "{}: {}/{} keypoints placed",
            skeleton.display_title(position),
            skeleton.placed_count(),
            skeleton.keypoints.len()
        );
    }

    let submission = annotator.submission()?;
    Ok(serde_json::to_string_pretty(&submission)?)
}

/// Main SKAT entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use skat::config::{FilePreferenceStore, load_preferences_or_default};

    // Log level comes from stored preferences; RUST_LOG overrides it
    let level = FilePreferenceStore::at_default_path()
        .map(|store| load_preferences_or_default(&store).log_level)
        .unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(attributes_path) = args.get(1) else {
        eprintln!("Usage: skat-native <attributes.json> [image]");
        return std::process::ExitCode::from(2);
    };

    match run(attributes_path, args.get(2).map(String::as_str)) {
        Ok(json) => {
            println!("{}", json);
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Application error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
