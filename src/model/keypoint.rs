//! Per-skeleton keypoint state.

use serde::{Deserialize, Serialize};

/// How a keypoint marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawStyle {
    #[default]
    SolidCircle,
    HollowCircle,
    SolidSquare,
}

impl DrawStyle {
    /// Parse a `keypoint_style` annotation option. Accepts the variant names
    /// and their upper snake case forms, including the historical
    /// `SOLID_CIRLCE` spelling. Unknown names fall back to the default.
    pub fn from_option_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "solidcircle" | "solidcirlce" => DrawStyle::SolidCircle,
            "hollowcircle" | "hollowcirlce" => DrawStyle::HollowCircle,
            "solidsquare" => DrawStyle::SolidSquare,
            _ => {
                log::warn!("Unknown keypoint style '{}', using solid circle", name);
                DrawStyle::SolidCircle
            }
        }
    }
}

/// State of one keypoint class within one skeleton instance.
///
/// Coordinates are image-relative pixels. `None` means the keypoint has not
/// been placed yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeypointState {
    pub label: String,
    pub color: String,
    pub draw_style: DrawStyle,
    pub hotkey: Option<char>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub show_keypoint: bool,
    pub show_line: bool,
}

impl KeypointState {
    /// Create an unplaced, visible keypoint.
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            draw_style: DrawStyle::default(),
            hotkey: None,
            x: None,
            y: None,
            show_keypoint: true,
            show_line: true,
        }
    }

    /// Both coordinates are set.
    pub fn has_xy(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// The placed position, if any.
    pub fn position(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = Some(x);
        self.y = Some(y);
    }

    pub fn clear_position(&mut self) {
        self.x = None;
        self.y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_xy_requires_both() {
        let mut kp = KeypointState::new("nose", "#2CA02C");
        assert!(!kp.has_xy());
        kp.x = Some(3);
        assert!(!kp.has_xy());
        assert_eq!(kp.position(), None);
        kp.y = Some(4);
        assert!(kp.has_xy());
        assert_eq!(kp.position(), Some((3, 4)));
        kp.clear_position();
        assert!(!kp.has_xy());
    }

    #[test]
    fn test_draw_style_names() {
        let style: DrawStyle = serde_json::from_str("\"HollowCircle\"").unwrap();
        assert_eq!(style, DrawStyle::HollowCircle);
        assert_eq!(DrawStyle::default(), DrawStyle::SolidCircle);
    }

    #[test]
    fn test_draw_style_option_names() {
        assert_eq!(DrawStyle::from_option_name("SOLID_CIRLCE"), DrawStyle::SolidCircle);
        assert_eq!(DrawStyle::from_option_name("HOLLOW_CIRCLE"), DrawStyle::HollowCircle);
        assert_eq!(DrawStyle::from_option_name("SolidSquare"), DrawStyle::SolidSquare);
        assert_eq!(DrawStyle::from_option_name("triangle"), DrawStyle::SolidCircle);
    }
}
