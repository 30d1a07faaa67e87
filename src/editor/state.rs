//! Editor state
//!
//! The cursor is shown by XOR-ing the `SELECTED` bit into the slots it
//! covers: one spot in Tile granularity, the whole sector in Sector
//! granularity, nothing in Segment granularity. Every command unmarks, moves
//! and re-marks, so applying the same mark twice always restores the level.

use crate::app::{AppMode, CommonState};
use crate::input::InputEvent;
use crate::mesh::{self, MeshKind, VertexBuffer};
use crate::render::{self, DrawCall, Frame, MeshSource};
use crate::world::{load_level, save_level, Level, SegmentGeometry, PRESENT, SELECTED};
use super::{Direction, EditorCommand, EditorCursor, KeyBindings, NavigationMode, VisualizationMode};

/// Segment count ceiling of the level file header
const MAX_SEGMENTS: usize = u16::MAX as usize;

/// Highlight mesh of the current segment, rebuilt when its kind or the
/// segment's shape changes
#[derive(Debug)]
struct Overlay {
    kind: MeshKind,
    geometry: SegmentGeometry,
    buffer: VertexBuffer,
}

/// Editor mode state
#[derive(Debug)]
pub struct EditorState {
    cursor: EditorCursor,
    visualization: VisualizationMode,
    /// Depth of the level's front edge
    cur_z: f32,
    overlay: Option<Overlay>,
    bindings: KeyBindings,
}

impl EditorState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            cursor: EditorCursor::default(),
            visualization: VisualizationMode::default(),
            cur_z: 0.0,
            overlay: None,
            bindings,
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> &EditorCursor {
        &self.cursor
    }

    #[cfg(test)]
    pub fn visualization(&self) -> VisualizationMode {
        self.visualization
    }

    #[cfg(test)]
    pub fn cur_z(&self) -> f32 {
        self.cur_z
    }

    /// Kind of the overlay currently built, if any
    #[cfg(test)]
    pub fn overlay_kind(&self) -> Option<MeshKind> {
        self.overlay.as_ref().map(|o| o.kind)
    }

    pub fn status_line(&self, level: &Level) -> String {
        let segment = level.segment(self.cursor.segment);
        format!(
            "{} | segment {}/{} | sector {}/{} | spot {} | {}",
            self.cursor.mode.label(),
            self.cursor.segment + 1,
            level.len(),
            self.cursor.sector + 1,
            segment.geometry().sectors,
            self.cursor.spot,
            self.visualization.label(),
        )
    }

    /// Run one editor command against the shared level
    pub fn execute(&mut self, command: EditorCommand, common: &mut CommonState) {
        match command {
            EditorCommand::ScrollForward => self.cur_z += common.config.scroll_step,
            EditorCommand::ScrollBackward => self.cur_z -= common.config.scroll_step,
            EditorCommand::CycleMode => self.cycle_mode(common),
            EditorCommand::CycleVisualization => {
                self.visualization = self.visualization.next();
                log::debug!("visualization: {}", self.visualization.label());
            }
            EditorCommand::Navigate(direction) => self.navigate(direction, common),
            EditorCommand::ToggleOccupancy => self.toggle_occupancy(common),
            EditorCommand::Insert { after } => self.insert(after, common),
            EditorCommand::Delete { step_back } => self.delete(step_back, common),
            EditorCommand::Save => self.save(common),
            EditorCommand::Load => self.load(common),
        }
        self.refresh_overlay(common);
    }

    /// XOR the cursor mark into the level; calling twice is a no-op
    fn toggle_marks(&self, level: &mut Level) {
        let segment = level.segment_mut(self.cursor.segment);
        if segment.geometry().is_gap() {
            return;
        }
        match self.cursor.mode {
            NavigationMode::Tile => segment.toggle_spot(self.cursor.sector, self.cursor.spot, SELECTED),
            NavigationMode::Sector => segment.toggle_sector(self.cursor.sector, SELECTED),
            NavigationMode::Segment => {}
        }
    }

    fn regenerate_current(&self, common: &mut CommonState) {
        common
            .level
            .segment_mut(self.cursor.segment)
            .regenerate_mesh(&common.config.palette);
    }

    fn cycle_mode(&mut self, common: &mut CommonState) {
        self.toggle_marks(&mut common.level);
        self.cursor.mode = self.cursor.mode.next();
        self.toggle_marks(&mut common.level);
        self.regenerate_current(common);
        log::debug!("navigation: {}", self.cursor.mode.label());
    }

    fn navigate(&mut self, direction: Direction, common: &mut CommonState) {
        if self.cursor.mode == NavigationMode::Segment {
            let current = self.cursor.segment;
            let target = match direction {
                Direction::Up if current + 1 < common.level.len() => current + 1,
                Direction::Down if current > 0 => current - 1,
                _ => return,
            };
            self.cursor.segment = target;
            self.cursor.sector = 0;
            self.cursor.spot = 0;
            return;
        }

        let geometry = *common.level.segment(self.cursor.segment).geometry();
        let per_sector = geometry.slots_per_sector() as u32;
        if per_sector == 0 {
            log::debug!("segment {} is a gap, nothing to navigate", self.cursor.segment);
            return;
        }

        let (sector, spot) = (self.cursor.sector, self.cursor.spot);
        let (sector, spot) = match (self.cursor.mode, direction) {
            (NavigationMode::Tile, Direction::Left) => (sector, spot.checked_sub(1).unwrap_or(per_sector - 1)),
            (NavigationMode::Tile, Direction::Right) => (sector, (spot + 1) % per_sector),
            // Up stops at the last sector; new sectors only come from Insert
            (_, Direction::Up) if sector + 1 < geometry.sectors => (sector + 1, spot),
            (_, Direction::Down) if sector > 0 => (sector - 1, spot),
            _ => return,
        };

        self.toggle_marks(&mut common.level);
        self.cursor.sector = sector;
        self.cursor.spot = spot;
        self.toggle_marks(&mut common.level);
        self.regenerate_current(common);
    }

    fn toggle_occupancy(&mut self, common: &mut CommonState) {
        if self.cursor.mode != NavigationMode::Tile {
            return;
        }
        let segment = common.level.segment_mut(self.cursor.segment);
        if segment.geometry().is_gap() {
            return;
        }
        segment.toggle_spot(self.cursor.sector, self.cursor.spot, PRESENT);
        self.regenerate_current(common);
    }

    fn insert(&mut self, after: bool, common: &mut CommonState) {
        match self.cursor.mode {
            NavigationMode::Tile => {}
            NavigationMode::Sector => {
                if !common.level.segment(self.cursor.segment).can_grow() {
                    log::warn!("segment {} is at the sector limit", self.cursor.segment);
                    return;
                }
                self.toggle_marks(&mut common.level);
                let segment = common.level.segment_mut(self.cursor.segment);
                self.cursor.sector = segment.insert_sector(self.cursor.sector, after);
                self.toggle_marks(&mut common.level);
                self.regenerate_current(common);
            }
            NavigationMode::Segment => {
                if common.level.len() >= MAX_SEGMENTS {
                    log::warn!("level is at the segment limit");
                    return;
                }
                let template = *common.level.segment(self.cursor.segment).geometry();
                let at = self.cursor.segment + usize::from(after);
                if let Err(e) = common.level.insert_segment(at, &template) {
                    log::error!("Failed to insert segment: {}", e);
                    return;
                }
                self.cursor.segment = at;
                self.cursor.sector = 0;
                self.cursor.spot = 0;
                self.regenerate_current(common);
            }
        }
    }

    fn delete(&mut self, step_back: bool, common: &mut CommonState) {
        match self.cursor.mode {
            NavigationMode::Tile => {}
            NavigationMode::Sector => {
                let segment = common.level.segment_mut(self.cursor.segment);
                if let Err(e) = segment.remove_sector(self.cursor.sector) {
                    log::debug!("{}", e);
                    return;
                }
                let remaining = segment.geometry().sectors;
                if self.cursor.sector == remaining || (step_back && self.cursor.sector > 0) {
                    self.cursor.sector -= 1;
                }
                // The removed sector took its marks with it
                self.toggle_marks(&mut common.level);
                self.regenerate_current(common);
            }
            NavigationMode::Segment => {
                if let Err(e) = common.level.remove_segment(self.cursor.segment) {
                    log::debug!("{}", e);
                    return;
                }
                let remaining = common.level.len();
                if self.cursor.segment == remaining || (step_back && self.cursor.segment > 0) {
                    self.cursor.segment -= 1;
                }
                self.cursor.sector = 0;
                self.cursor.spot = 0;
            }
        }
    }

    fn save(&self, common: &CommonState) {
        let path = &common.config.level_path;
        match save_level(&common.level, path) {
            Ok(()) => log::info!("Saved level '{}'", path.display()),
            Err(e) => log::error!("Failed to save level '{}': {}", path.display(), e),
        }
    }

    fn load(&mut self, common: &mut CommonState) {
        let path = common.config.level_path.clone();
        let loaded = match load_level(&path, &common.config.palette) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Failed to load level '{}': {}", path.display(), e);
                return;
            }
        };

        common.level.replace(loaded.level);
        self.cursor = EditorCursor::default();
        self.toggle_marks(&mut common.level);
        self.regenerate_current(common);
        log::info!(
            "Loaded level '{}' ({} segments, {} warnings)",
            path.display(),
            common.level.len(),
            loaded.warnings.len()
        );
    }

    fn wanted_overlay(&self) -> Option<MeshKind> {
        match self.cursor.mode {
            NavigationMode::Segment => Some(MeshKind::SegmentBlock),
            NavigationMode::Tile | NavigationMode::Sector => self.visualization.mesh_kind(),
        }
    }

    fn refresh_overlay(&mut self, common: &CommonState) {
        let Some(kind) = self.wanted_overlay() else {
            self.overlay = None;
            return;
        };
        let geometry = *common.level.segment(self.cursor.segment).geometry();
        if let Some(overlay) = &self.overlay {
            if overlay.kind == kind && overlay.geometry == geometry {
                return;
            }
        }
        // Overlay kinds never read occupancy
        let buffer = mesh::generate(kind, &geometry, &[], &common.config.palette);
        self.overlay = Some(Overlay { kind, geometry, buffer });
    }
}

impl AppMode for EditorState {
    fn name(&self) -> &'static str {
        "Editor"
    }

    fn init(&mut self, _common: &mut CommonState) {
        self.cursor = EditorCursor::default();
        self.visualization = VisualizationMode::default();
        self.cur_z = 0.0;
        self.overlay = None;
    }

    fn handle_event(&mut self, event: &InputEvent, common: &mut CommonState) {
        let Some(key) = event.pressed() else {
            return;
        };
        if let Some(command) = self.bindings.command_for(key) {
            self.execute(command, common);
        }
    }

    fn render<'a>(&'a mut self, common: &'a CommonState) -> Frame<'a> {
        let level = &common.level;
        let z_scale = common.config.z_scale;
        let mut frame = Frame::new([0.0, 0.0, 0.0]);

        match (&self.overlay, self.cursor.mode) {
            (Some(overlay), NavigationMode::Segment) => {
                let replace = (self.cursor.segment, MeshSource::Overlay, &overlay.buffer);
                render::draw_level(&mut frame, level, z_scale, self.cur_z, Some(replace));
            }
            (overlay, _) => {
                render::draw_level(&mut frame, level, z_scale, self.cur_z, None);
                if let Some(overlay) = overlay {
                    let sectors = level.segment(self.cursor.segment).geometry().sectors;
                    let depth = render::segment_depth(level, self.cursor.segment, z_scale, self.cur_z);
                    frame.push(DrawCall::new(
                        MeshSource::Overlay,
                        &overlay.buffer,
                        render::depth_scale(overlay.kind.depth_span(), sectors, z_scale),
                        [0.0, 0.0, depth],
                    ));
                }
            }
        }
        frame
    }

    fn on_switch(&mut self, common: &mut CommonState) {
        self.toggle_marks(&mut common.level);
        self.regenerate_current(common);
        self.refresh_overlay(common);
    }
}
