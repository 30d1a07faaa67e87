//! Level editor
//!
//! Keyboard-driven editing of a tube level at three granularities: single
//! floor planes, whole sectors and whole segments.

mod actions;
mod cursor;
mod state;

pub use actions::*;
pub use cursor::*;
pub use state::EditorState;
