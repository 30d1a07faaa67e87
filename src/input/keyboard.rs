//! Keyboard polling via macroquad
//!
//! macroquad reports key codes by position only, so the logical key is
//! derived from the code plus the shift state (Shift+= types a plus).

use macroquad::prelude::*;
use super::{InputEvent, LogicalKey, PhysicalKey};

/// Map a macroquad key code to its physical key
pub fn physical_key(code: KeyCode) -> PhysicalKey {
    use PhysicalKey as P;
    match code {
        KeyCode::A => P::A, KeyCode::B => P::B, KeyCode::C => P::C, KeyCode::D => P::D,
        KeyCode::E => P::E, KeyCode::F => P::F, KeyCode::G => P::G, KeyCode::H => P::H,
        KeyCode::I => P::I, KeyCode::J => P::J, KeyCode::K => P::K, KeyCode::L => P::L,
        KeyCode::M => P::M, KeyCode::N => P::N, KeyCode::O => P::O, KeyCode::P => P::P,
        KeyCode::Q => P::Q, KeyCode::R => P::R, KeyCode::S => P::S, KeyCode::T => P::T,
        KeyCode::U => P::U, KeyCode::V => P::V, KeyCode::W => P::W, KeyCode::X => P::X,
        KeyCode::Y => P::Y, KeyCode::Z => P::Z,
        KeyCode::Key1 => P::N1, KeyCode::Key2 => P::N2, KeyCode::Key3 => P::N3,
        KeyCode::Key4 => P::N4, KeyCode::Key5 => P::N5, KeyCode::Key6 => P::N6,
        KeyCode::Key7 => P::N7, KeyCode::Key8 => P::N8, KeyCode::Key9 => P::N9,
        KeyCode::Key0 => P::N0,
        KeyCode::Enter => P::Return,
        KeyCode::Escape => P::Escape,
        KeyCode::Backspace => P::Backspace,
        KeyCode::Tab => P::Tab,
        KeyCode::Space => P::Space,
        KeyCode::Left => P::ArrowLeft,
        KeyCode::Right => P::ArrowRight,
        KeyCode::Up => P::ArrowUp,
        KeyCode::Down => P::ArrowDown,
        KeyCode::Insert => P::Insert,
        KeyCode::Delete => P::Delete,
        KeyCode::PageUp => P::PageUp,
        KeyCode::PageDown => P::PageDown,
        KeyCode::Minus | KeyCode::KpSubtract => P::Minus,
        KeyCode::Equal => P::Equals,
        _ => P::Unknown,
    }
}

/// Map a macroquad key code to the key it types
pub fn logical_key(code: KeyCode, shift: bool) -> LogicalKey {
    use LogicalKey as L;
    match (code, physical_key(code)) {
        (KeyCode::KpAdd, _) => L::Plus,
        (KeyCode::Equal, _) if shift => L::Plus,
        (_, p) => logical_from_physical(p),
    }
}

fn logical_from_physical(key: PhysicalKey) -> LogicalKey {
    use LogicalKey as L;
    use PhysicalKey as P;
    match key {
        P::Unknown => L::Unknown,
        P::A => L::A, P::B => L::B, P::C => L::C, P::D => L::D, P::E => L::E,
        P::F => L::F, P::G => L::G, P::H => L::H, P::I => L::I, P::J => L::J,
        P::K => L::K, P::L => L::L, P::M => L::M, P::N => L::N, P::O => L::O,
        P::P => L::P, P::Q => L::Q, P::R => L::R, P::S => L::S, P::T => L::T,
        P::U => L::U, P::V => L::V, P::W => L::W, P::X => L::X, P::Y => L::Y,
        P::Z => L::Z,
        P::N1 => L::N1, P::N2 => L::N2, P::N3 => L::N3, P::N4 => L::N4, P::N5 => L::N5,
        P::N6 => L::N6, P::N7 => L::N7, P::N8 => L::N8, P::N9 => L::N9, P::N0 => L::N0,
        P::Return => L::Return,
        P::Escape => L::Escape,
        P::Backspace => L::Backspace,
        P::Tab => L::Tab,
        P::Space => L::Space,
        P::ArrowLeft => L::ArrowLeft,
        P::ArrowRight => L::ArrowRight,
        P::ArrowUp => L::ArrowUp,
        P::ArrowDown => L::ArrowDown,
        P::Insert => L::Insert,
        P::Delete => L::Delete,
        P::PageUp => L::PageUp,
        P::PageDown => L::PageDown,
        P::Minus => L::Minus,
        P::Equals => L::Equals,
    }
}

/// Translate this frame's keyboard and window activity into events.
///
/// `prevent_quit()` must have been called at startup so a window close
/// arrives here as `InputEvent::Quit` instead of ending the process.
pub fn poll_events(out: &mut Vec<InputEvent>) {
    if is_quit_requested() {
        out.push(InputEvent::Quit);
    }

    let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);

    // HashSet order is arbitrary; sort so simultaneous presses replay deterministically
    let mut pressed: Vec<KeyCode> = get_keys_pressed().into_iter().collect();
    pressed.sort_by_key(|code| *code as u16);
    for code in pressed {
        let event = InputEvent::KeyDown {
            logical: logical_key(code, shift),
            physical: physical_key(code),
        };
        log::trace!("{:?}", event);
        out.push(event);
    }

    let mut released: Vec<KeyCode> = get_keys_released().into_iter().collect();
    released.sort_by_key(|code| *code as u16);
    for code in released {
        out.push(InputEvent::KeyUp {
            logical: logical_key(code, shift),
            physical: physical_key(code),
        });
    }
}
