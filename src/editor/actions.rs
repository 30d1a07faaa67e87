//! Editor command definitions
//!
//! Every editor operation is an `EditorCommand`; keys map onto commands
//! through a `KeyBindings` table that the config file can override.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::input::LogicalKey;

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Everything the editor can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorCommand {
    /// Move the view deeper into the tube
    ScrollForward,
    ScrollBackward,
    CycleMode,
    CycleVisualization,
    Navigate(Direction),
    /// Flip the presence bit under the cursor (Tile granularity only)
    ToggleOccupancy,
    /// Insert a sector or segment before the cursor, or after it
    Insert { after: bool },
    /// Delete the sector or segment under the cursor
    Delete { step_back: bool },
    Save,
    Load,
}

/// One key-to-command pair, as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: LogicalKey,
    pub command: EditorCommand,
}

/// Key map for the editor
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<LogicalKey, EditorCommand>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key, replacing whatever it was bound to
    pub fn bind(&mut self, key: LogicalKey, command: EditorCommand) {
        if let Some(previous) = self.map.insert(key, command) {
            if previous != command {
                log::debug!("rebinding {:?}: {:?} -> {:?}", key, previous, command);
            }
        }
    }

    /// Apply config overrides on top of the current map
    pub fn with_overrides(mut self, overrides: &[KeyBinding]) -> Self {
        for binding in overrides {
            self.bind(binding.key, binding.command);
        }
        self
    }

    pub fn command_for(&self, key: LogicalKey) -> Option<EditorCommand> {
        self.map.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Create the default editor key map
pub fn create_editor_bindings() -> KeyBindings {
    use EditorCommand as C;
    use LogicalKey as K;

    let mut bindings = KeyBindings::new();

    // View
    bindings.bind(K::W, C::ScrollForward);
    bindings.bind(K::S, C::ScrollBackward);
    bindings.bind(K::M, C::CycleMode);
    bindings.bind(K::V, C::CycleVisualization);

    // Navigation
    bindings.bind(K::ArrowLeft, C::Navigate(Direction::Left));
    bindings.bind(K::ArrowRight, C::Navigate(Direction::Right));
    bindings.bind(K::ArrowUp, C::Navigate(Direction::Up));
    bindings.bind(K::ArrowDown, C::Navigate(Direction::Down));

    // Editing
    bindings.bind(K::Space, C::ToggleOccupancy);
    bindings.bind(K::Insert, C::Insert { after: false });
    bindings.bind(K::PageUp, C::Insert { after: true });
    bindings.bind(K::Delete, C::Delete { step_back: false });
    bindings.bind(K::PageDown, C::Delete { step_back: true });

    // File
    bindings.bind(K::P, C::Save);
    bindings.bind(K::L, C::Load);

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = create_editor_bindings();
        assert_eq!(bindings.len(), 15);
        assert_eq!(bindings.command_for(LogicalKey::M), Some(EditorCommand::CycleMode));
        assert_eq!(
            bindings.command_for(LogicalKey::PageDown),
            Some(EditorCommand::Delete { step_back: true })
        );
        assert_eq!(bindings.command_for(LogicalKey::B), None);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let bindings = create_editor_bindings().with_overrides(&[
            KeyBinding { key: LogicalKey::ArrowUp, command: EditorCommand::ScrollForward },
            KeyBinding { key: LogicalKey::T, command: EditorCommand::ToggleOccupancy },
        ]);
        assert_eq!(bindings.command_for(LogicalKey::ArrowUp), Some(EditorCommand::ScrollForward));
        assert_eq!(bindings.command_for(LogicalKey::T), Some(EditorCommand::ToggleOccupancy));
        // Space keeps its default
        assert_eq!(bindings.command_for(LogicalKey::Space), Some(EditorCommand::ToggleOccupancy));
        assert_eq!(bindings.len(), 16);
    }

    #[test]
    fn test_binding_ron_format() {
        let binding = KeyBinding { key: LogicalKey::N1, command: EditorCommand::Insert { after: true } };
        let text = ron::to_string(&binding).unwrap();
        let parsed: KeyBinding = ron::from_str(&text).unwrap();
        assert_eq!(parsed, binding);
    }
}
