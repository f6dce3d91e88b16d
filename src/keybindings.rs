//! Keyboard shortcuts.
//!
//! Fixed command keys plus the keypoint class hotkey table. The delete keys
//! win over everything, then class hotkeys, then the remaining commands.

use crate::commands::Command;
use crate::constants::{KEYPOINT_HOTKEYS, index_for_hotkey};
use crate::input::{Key, Modifiers};
use crate::mode::ActionMode;

/// Keybinding configuration for the annotator.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Keys that delete the selected keypoint
    pub delete: Vec<Key>,
    /// Command keys, checked in order
    pub commands: Vec<(Key, Command)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            delete: vec![Key::Delete, Key::Backspace],
            commands: vec![
                (Key::Right, Command::NextUnmarked),
                (Key::Char('d'), Command::NextUnmarked),
                (Key::Left, Command::PreviousUnmarked),
                (Key::Char('a'), Command::PreviousUnmarked),
                (Key::Down, Command::NextKeypoint),
                (Key::Char('s'), Command::NextKeypoint),
                (Key::Up, Command::PreviousKeypoint),
                (Key::Char('w'), Command::PreviousKeypoint),
                (Key::Char('z'), Command::ZoomReset),
                (Key::Char('c'), Command::ZoomIn),
                (Key::Char('x'), Command::ZoomOut),
                (Key::Char('v'), Command::SetMode(ActionMode::DrawSkeleton)),
                (Key::Char('b'), Command::AddSkeleton),
                (Key::Char('q'), Command::SetMode(ActionMode::DrawKeypoints)),
                (Key::Char('n'), Command::SetMode(ActionMode::AdjustSkeletons)),
                (Key::Char(','), Command::Undo),
                (Key::Char('.'), Command::Redo),
                (Key::Char('m'), Command::ToggleSkeletonVisibility),
            ],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the command for a key press, if any. `class_count` bounds the
    /// class hotkeys: a hotkey past the last class does nothing.
    pub fn command_for_key(
        &self,
        key: Key,
        modifiers: Modifiers,
        class_count: usize,
    ) -> Option<Command> {
        if modifiers.has_command_modifier() {
            return None;
        }
        if self.delete.contains(&key) {
            return Some(Command::DeleteSelected);
        }
        if let Key::Char(c) = key {
            if let Some(index) = index_for_hotkey(c) {
                return (index < class_count).then_some(Command::SelectClass(index));
            }
        }
        self.commands
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| command.clone())
    }

    /// Shortcut list for the help panel: (key, description) pairs, command
    /// keys first, then one line per keypoint class.
    pub fn shortcut_descriptions(&self, class_labels: &[&str]) -> Vec<(String, String)> {
        let mut lines: Vec<(String, String)> = self
            .delete
            .iter()
            .map(|key| (key_to_string(*key), Command::DeleteSelected.description()))
            .collect();
        lines.extend(
            self.commands
                .iter()
                .map(|(key, command)| (key_to_string(*key), command.description())),
        );
        lines.extend(class_labels.iter().enumerate().map(|(i, label)| {
            (
                KEYPOINT_HOTKEYS[i % KEYPOINT_HOTKEYS.len()].to_string(),
                format!("Selects the {} for labeling", label),
            )
        }));
        lines
    }
}

/// Convert a key to a display string.
pub fn key_to_string(key: Key) -> String {
    match key {
        Key::Char(c) => c.to_string(),
        Key::Delete => "Delete".to_string(),
        Key::Backspace => "Backspace".to_string(),
        Key::Up => "Up Arrow".to_string(),
        Key::Down => "Down Arrow".to_string(),
        Key::Left => "Left Arrow".to_string(),
        Key::Right => "Right Arrow".to_string(),
        Key::Escape => "Escape".to_string(),
        Key::Enter => "Enter".to_string(),
        Key::Tab => "Tab".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> Key {
        Key::Char(c)
    }

    #[test]
    fn test_delete_keys() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.command_for_key(Key::Backspace, Modifiers::default(), 3),
            Some(Command::DeleteSelected)
        );
    }

    #[test]
    fn test_class_hotkeys_bounded_by_class_count() {
        let bindings = KeyBindings::new();
        let none = Modifiers::default();
        assert_eq!(
            bindings.command_for_key(key('2'), none, 3),
            Some(Command::SelectClass(1))
        );
        assert_eq!(bindings.command_for_key(key('9'), none, 3), None);
        // 'y' appears twice in the table
        assert_eq!(
            bindings.command_for_key(key('y'), none, 30),
            Some(Command::SelectClass(13))
        );
    }

    #[test]
    fn test_command_keys() {
        let bindings = KeyBindings::new();
        let none = Modifiers::default();
        assert_eq!(
            bindings.command_for_key(Key::Right, none, 1),
            Some(Command::NextUnmarked)
        );
        assert_eq!(
            bindings.command_for_key(key('n'), none, 1),
            Some(Command::SetMode(ActionMode::AdjustSkeletons))
        );
        assert_eq!(bindings.command_for_key(key(','), none, 1), Some(Command::Undo));
        assert_eq!(bindings.command_for_key(key('j'), none, 1), None);
    }

    #[test]
    fn test_command_modifier_blocks_hotkeys() {
        let bindings = KeyBindings::new();
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert_eq!(bindings.command_for_key(key('z'), ctrl, 1), None);
    }

    #[test]
    fn test_shortcut_descriptions() {
        let bindings = KeyBindings::new();
        let lines = bindings.shortcut_descriptions(&["nose", "tail"]);
        assert_eq!(lines[0].0, "Delete");
        let last = lines.last().unwrap();
        assert_eq!(last.0, "2");
        assert_eq!(last.1, "Selects the tail for labeling");
    }
}
