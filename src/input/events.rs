//! Normalized input events
//!
//! The platform layer translates its native events into this small stream.
//! Key events carry both a layout-independent physical key and a
//! layout-dependent logical key; commands are dispatched on the logical one.

use serde::{Serialize, Deserialize};

/// Layout-dependent key (what the key types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    Unknown,
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    N1, N2, N3, N4, N5, N6, N7, N8, N9, N0,
    Return, Escape, Backspace, Tab, Space,
    ArrowLeft, ArrowRight, ArrowUp, ArrowDown,
    Insert, Delete, PageUp, PageDown,
    Plus, Minus, Equals,
}

/// Layout-independent key (where the key sits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalKey {
    Unknown,
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    N1, N2, N3, N4, N5, N6, N7, N8, N9, N0,
    Return, Escape, Backspace, Tab, Space,
    ArrowLeft, ArrowRight, ArrowUp, ArrowDown,
    Insert, Delete, PageUp, PageDown,
    Minus, Equals,
}

/// One event from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown { logical: LogicalKey, physical: PhysicalKey },
    KeyUp { logical: LogicalKey, physical: PhysicalKey },
}

impl InputEvent {
    /// Key-down event without physical key information (scripted input)
    #[cfg(test)]
    pub fn key_down(logical: LogicalKey) -> Self {
        InputEvent::KeyDown { logical, physical: PhysicalKey::Unknown }
    }

    /// Logical key of a key-down event
    pub fn pressed(&self) -> Option<LogicalKey> {
        match self {
            InputEvent::KeyDown { logical, .. } => Some(*logical),
            _ => None,
        }
    }
}
