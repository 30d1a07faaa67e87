//! Playing mode
//!
//! A scrolling preview of the level: the tube slides towards the viewer at a
//! constant speed while a flat player sprite stands on the bottom floor of
//! the first segment.

use crate::app::{AppMode, CommonState};
use crate::input::InputEvent;
use crate::mesh::{Primitive, Rgb, Vertex, VertexBuffer};
use crate::render::{self, DrawCall, Frame, MeshSource};

const PLAYER_COLOR: Rgb = [1.0, 0.2, 0.0];

/// Unit quad standing on y=0, one unit wide and one unit tall
pub fn player_model() -> VertexBuffer {
    let vertices = vec![
        Vertex::new(-0.5, 0.0, 0.0, PLAYER_COLOR),
        Vertex::new(0.5, 0.0, 0.0, PLAYER_COLOR),
        Vertex::new(-0.5, 1.0, 0.0, PLAYER_COLOR),
        Vertex::new(0.5, 1.0, 0.0, PLAYER_COLOR),
    ];
    VertexBuffer::new(vertices, Primitive::TriangleStrip)
}

pub struct PlayingState {
    cur_z: f32,
    speed: f32,
    player: VertexBuffer,
}

impl PlayingState {
    pub fn new() -> Self {
        Self { cur_z: 0.0, speed: 0.0, player: player_model() }
    }

    #[cfg(test)]
    pub fn cur_z(&self) -> f32 {
        self.cur_z
    }

    #[cfg(test)]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn status_line(&self) -> String {
        format!("Playing | depth {:.3}", self.cur_z)
    }
}

impl Default for PlayingState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppMode for PlayingState {
    fn name(&self) -> &'static str {
        "Playing"
    }

    fn init(&mut self, _common: &mut CommonState) {
        self.cur_z = 0.0;
        self.speed = 0.0;
    }

    fn handle_event(&mut self, _event: &InputEvent, _common: &mut CommonState) {}

    fn render<'a>(&'a mut self, common: &'a CommonState) -> Frame<'a> {
        let config = &common.config;
        let mut frame = Frame::new([0.0, 0.0, 0.0]);

        self.cur_z += self.speed;
        render::draw_level(&mut frame, &common.level, config.z_scale, self.cur_z + config.player_z_offset, None);

        let extents = common.level.segment(0).extents();
        frame.push(DrawCall::new(
            MeshSource::Player,
            &self.player,
            [extents.plane_width, config.player_height, config.z_scale],
            [0.0, extents.y_val, config.player_z_offset],
        ));
        frame
    }

    fn on_switch(&mut self, common: &mut CommonState) {
        self.cur_z = 0.0;
        self.speed = common.config.play_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::world::Level;

    fn common() -> CommonState {
        let config = AppConfig::default();
        let mut level = Level::blank(&config.blank_level).unwrap();
        level.regenerate_all(&config.palette);
        CommonState { level, config }
    }

    #[test]
    fn test_depth_advances_each_frame() {
        let mut common = common();
        let mut playing = PlayingState::new();
        playing.init(&mut common);
        playing.on_switch(&mut common);
        assert_eq!(playing.speed(), 0.002);

        for _ in 0..3 {
            let _ = playing.render(&common);
        }
        assert!((playing.cur_z() - 0.006).abs() < 1e-6);

        playing.on_switch(&mut common);
        assert_eq!(playing.cur_z(), 0.0);
    }

    #[test]
    fn test_player_stands_on_bottom_floor() {
        let mut common = common();
        let mut playing = PlayingState::new();
        playing.init(&mut common);
        let extents = *common.level.segment(0).extents();

        let frame = playing.render(&common);
        assert_eq!(frame.draws.len(), 2);
        let level_draw = &frame.draws[0];
        assert_eq!(level_draw.displacement[2], -0.08);

        let player = &frame.draws[1];
        assert_eq!(player.source, MeshSource::Player);
        assert_eq!(player.primitive, Primitive::TriangleStrip);
        assert_eq!(player.vertex_count, 4);
        assert_eq!(player.scale, [extents.plane_width, 0.4, 0.04]);
        assert_eq!(player.displacement, [0.0, extents.y_val, -0.08]);
    }
}
