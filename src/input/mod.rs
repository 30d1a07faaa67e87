//! Input handling
//!
//! The core only sees `InputEvent`s; the keyboard module is the one place
//! that talks to macroquad's input API.

mod events;
mod keyboard;

pub use events::*;
pub use keyboard::poll_events;
