//! Global constants for the SKAT annotation engine

/// Hotkeys assigned to keypoint classes by position. `y` appears twice; key
/// lookup resolves to the first position.
pub const KEYPOINT_HOTKEYS: [char; 45] = [
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', 'y',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Default keypoint marker diameter, in image pixels
pub const DEFAULT_KEYPOINT_SIZE: u32 = 5;

/// Default rig line width
pub const DEFAULT_LINE_SIZE: u32 = 3;

/// Smallest accepted marker size and line width
pub const MIN_DRAW_SIZE: u32 = 1;

/// Largest accepted marker size and line width
pub const MAX_DRAW_SIZE: u32 = 20;

/// Line color used when neither the rig nor the skeleton provides one
pub const DEFAULT_LINE_COLOR: &str = "#0000ff";

/// How long the pointer must be held before a press turns into a pan, and
/// the polling interval of the pan detection timer
pub const PAN_DETECTION_MS: u64 = 200;

/// Zoom multiplier per wheel step or zoom button press
pub const ZOOM_FACTOR: f64 = 1.1;

/// Maximum zoom in, as a percentage of the larger image dimension
pub const MAX_ZOOM_IN_PERCENT: f64 = 2.0;

/// Maximum zoom out when the container is larger than the image
pub const MAX_ZOOM_OUT_WHEN_IMAGE_FITS: f64 = 0.5;

/// Default number of changes kept in the undo history
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// Hotkey shown for the keypoint class at `index`. The table wraps for
/// classes past its end.
pub fn hotkey_for_index(index: usize) -> char {
    KEYPOINT_HOTKEYS[index % KEYPOINT_HOTKEYS.len()]
}

/// Class index selected by a hotkey: the first table position holding `key`.
pub fn index_for_hotkey(key: char) -> Option<usize> {
    KEYPOINT_HOTKEYS.iter().position(|k| *k == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkey_for_index() {
        assert_eq!(hotkey_for_index(0), '1');
        assert_eq!(hotkey_for_index(9), '0');
        assert_eq!(hotkey_for_index(10), 'e');
        assert_eq!(hotkey_for_index(44), 'Z');
        assert_eq!(hotkey_for_index(45), '1');
    }

    #[test]
    fn test_duplicate_hotkey_resolves_to_first() {
        assert_eq!(index_for_hotkey('y'), Some(13));
        assert_eq!(index_for_hotkey('1'), Some(0));
        assert_eq!(index_for_hotkey('q'), None);
    }
}
