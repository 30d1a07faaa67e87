//! Application state and mode dispatch
//!
//! Two modes share one level: the editor and the playing preview. Exactly
//! one is active; `B` switches between them.

use crate::config::AppConfig;
use crate::editor::{create_editor_bindings, EditorState};
use crate::game::PlayingState;
use crate::input::{InputEvent, LogicalKey};
use crate::render::Frame;
use crate::world::{Level, SegmentId};

/// Key that switches between editing and playing
pub const SWITCH_MODE_KEY: LogicalKey = LogicalKey::B;

/// State shared by every mode
pub struct CommonState {
    pub level: Level,
    pub config: AppConfig,
}

/// One application mode
pub trait AppMode {
    fn name(&self) -> &'static str;

    /// Called once at startup
    fn init(&mut self, common: &mut CommonState);

    fn handle_event(&mut self, event: &InputEvent, common: &mut CommonState);

    /// Describe this frame. May advance per-frame state.
    fn render<'a>(&'a mut self, common: &'a CommonState) -> Frame<'a>;

    /// Called on the mode being left and again on the mode being entered
    fn on_switch(&mut self, common: &mut CommonState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveMode {
    Editor,
    Playing,
}

impl ActiveMode {
    pub fn other(self) -> Self {
        match self {
            ActiveMode::Editor => ActiveMode::Playing,
            ActiveMode::Playing => ActiveMode::Editor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    common: CommonState,
    editor: EditorState,
    playing: PlayingState,
    active: ActiveMode,
}

impl App {
    /// Build the app around a level and enter the editor
    pub fn new(level: Level, config: AppConfig) -> Self {
        let bindings = create_editor_bindings().with_overrides(&config.bindings);
        log::debug!("{} editor key bindings ({} from config)", bindings.len(), config.bindings.len());
        let mut app = Self {
            common: CommonState { level, config },
            editor: EditorState::new(bindings),
            playing: PlayingState::new(),
            active: ActiveMode::Editor,
        };

        app.common.level.regenerate_all(&app.common.config.palette);
        app.editor.init(&mut app.common);
        app.playing.init(&mut app.common);
        app.editor.on_switch(&mut app.common);
        app
    }

    fn split(&mut self, mode: ActiveMode) -> (&mut dyn AppMode, &mut CommonState) {
        match mode {
            ActiveMode::Editor => (&mut self.editor, &mut self.common),
            ActiveMode::Playing => (&mut self.playing, &mut self.common),
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> Flow {
        match event {
            InputEvent::Quit => return Flow::Quit,
            InputEvent::KeyDown { logical, .. } if *logical == SWITCH_MODE_KEY => {
                self.switch_mode();
                return Flow::Continue;
            }
            _ => {}
        }

        let active = self.active;
        let (mode, common) = self.split(active);
        mode.handle_event(event, common);
        Flow::Continue
    }

    pub fn switch_mode(&mut self) {
        let leaving = self.active;
        let (mode, common) = self.split(leaving);
        mode.on_switch(common);

        self.active = leaving.other();
        let (mode, common) = self.split(leaving.other());
        mode.on_switch(common);
        log::info!("Switched to {}", mode.name());
    }

    pub fn render(&mut self) -> Frame<'_> {
        match self.active {
            ActiveMode::Editor => self.editor.render(&self.common),
            ActiveMode::Playing => self.playing.render(&self.common),
        }
    }

    /// Segment ids removed since the last call, for GPU-side release
    pub fn drain_released(&mut self) -> Vec<SegmentId> {
        self.common.level.drain_released()
    }

    pub fn status_line(&self) -> String {
        match self.active {
            ActiveMode::Editor => self.editor.status_line(&self.common.level),
            ActiveMode::Playing => self.playing.status_line(),
        }
    }

    #[cfg(test)]
    pub fn active(&self) -> ActiveMode {
        self.active
    }

    #[cfg(test)]
    pub fn common(&self) -> &CommonState {
        &self.common
    }

    #[cfg(test)]
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PRESENT, SELECTED};

    fn app() -> App {
        let config = AppConfig::default();
        let level = Level::blank(&config.blank_level).unwrap();
        App::new(level, config)
    }

    fn press(app: &mut App, key: LogicalKey) -> Flow {
        app.handle_event(&InputEvent::key_down(key))
    }

    #[test]
    fn test_starts_in_editor_with_tile_marked() {
        let app = app();
        assert_eq!(app.active(), ActiveMode::Editor);
        assert_eq!(app.common().level.segment(0).slot(0, 0), PRESENT | SELECTED);
        // Meshes are ready before the first frame
        assert_eq!(app.common().level.segment(0).mesh().vertex_count(), 6 * 20);
    }

    #[test]
    fn test_switching_clears_and_restores_marks() {
        let mut app = app();
        press(&mut app, LogicalKey::ArrowRight);

        assert_eq!(press(&mut app, LogicalKey::B), Flow::Continue);
        assert_eq!(app.active(), ActiveMode::Playing);
        let segment = app.common().level.segment(0);
        assert!(segment.occupancy().iter().all(|&s| s & SELECTED == 0));

        press(&mut app, LogicalKey::B);
        assert_eq!(app.active(), ActiveMode::Editor);
        assert_eq!(app.common().level.segment(0).slot(0, 1), PRESENT | SELECTED);
    }

    #[test]
    fn test_playing_ignores_editor_keys() {
        let mut app = app();
        press(&mut app, LogicalKey::B);
        press(&mut app, LogicalKey::Space);
        press(&mut app, LogicalKey::M);
        press(&mut app, LogicalKey::B);

        assert_eq!(app.common().level.segment(0).slot(0, 0), PRESENT | SELECTED);
        assert_eq!(app.editor().cursor().mode, crate::editor::NavigationMode::Tile);
    }

    #[test]
    fn test_quit_and_key_up() {
        let mut app = app();
        assert_eq!(app.handle_event(&InputEvent::Quit), Flow::Quit);
        let up = InputEvent::KeyUp {
            logical: LogicalKey::Space,
            physical: crate::input::PhysicalKey::Space,
        };
        assert_eq!(app.handle_event(&up), Flow::Continue);
        assert_eq!(app.common().level.segment(0).slot(0, 0), PRESENT | SELECTED);
    }

    #[test]
    fn test_render_uses_active_mode() {
        let mut app = app();
        let editor_frame = app.render();
        // Level plus the default outline overlay
        assert_eq!(editor_frame.draws.len(), 2);

        press(&mut app, LogicalKey::B);
        let playing_frame = app.render();
        assert_eq!(playing_frame.draws.len(), 2);
        assert_eq!(playing_frame.draws[1].source, crate::render::MeshSource::Player);
    }
}
