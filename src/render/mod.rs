//! Render contract
//!
//! Modes describe a frame as a list of draw calls over vertex buffers they
//! own; the backend uploads and draws them. Nothing here touches the GPU.

mod backend;

pub use backend::{clear_color, GpuMeshCache};

use crate::mesh::{DepthSpan, Primitive, Rgb, VertexBuffer};
use crate::world::{Level, SegmentId};

/// Who owns a vertex buffer; the backend caches uploads per source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSource {
    Segment(SegmentId),
    /// Editor highlight of the current segment
    Overlay,
    Player,
}

/// One draw: a buffer plus the uniform transform applied to it
///
/// The buffer's positions are first multiplied by `scale`, then offset by
/// `displacement`.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub source: MeshSource,
    pub mesh: &'a VertexBuffer,
    pub primitive: Primitive,
    pub vertex_count: usize,
    pub scale: [f32; 3],
    pub displacement: [f32; 3],
}

impl<'a> DrawCall<'a> {
    pub fn new(source: MeshSource, mesh: &'a VertexBuffer, scale: [f32; 3], displacement: [f32; 3]) -> Self {
        Self {
            source,
            mesh,
            primitive: mesh.primitive(),
            vertex_count: mesh.vertex_count(),
            scale,
            displacement,
        }
    }
}

/// Everything a mode wants drawn this frame
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub clear_color: Rgb,
    pub draws: Vec<DrawCall<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(clear_color: Rgb) -> Self {
        Self { clear_color, draws: Vec::new() }
    }

    /// Queue a draw; empty buffers are skipped
    pub fn push(&mut self, call: DrawCall<'a>) {
        if call.vertex_count > 0 {
            self.draws.push(call);
        }
    }
}

/// Scale for a stream of the given depth span over a segment
pub fn depth_scale(span: DepthSpan, sectors: u32, z_scale: f32) -> [f32; 3] {
    match span {
        DepthSpan::PerSector => [1.0, 1.0, z_scale],
        DepthSpan::WholeSegment => [1.0, 1.0, z_scale * sectors as f32],
    }
}

/// Depth at which segment `index` starts when the level starts at `cur_z`
pub fn segment_depth(level: &Level, index: usize, z_scale: f32, cur_z: f32) -> f32 {
    cur_z - z_scale * level.sectors_before(index) as f32
}

/// Queue every segment's solid mesh, stacked along depth from `cur_z`.
///
/// With `replace` set, the segment at that index is drawn as the given
/// whole-segment buffer under the given source instead of its own mesh.
pub fn draw_level<'a>(
    frame: &mut Frame<'a>,
    level: &'a Level,
    z_scale: f32,
    cur_z: f32,
    replace: Option<(usize, MeshSource, &'a VertexBuffer)>,
) {
    let mut z = cur_z;
    for (index, (id, segment)) in level.iter().enumerate() {
        let sectors = segment.geometry().sectors;
        match replace {
            Some((at, source, mesh)) if at == index => {
                let scale = depth_scale(DepthSpan::WholeSegment, sectors, z_scale);
                frame.push(DrawCall::new(source, mesh, scale, [0.0, 0.0, z]));
            }
            _ => {
                let scale = depth_scale(DepthSpan::PerSector, sectors, z_scale);
                frame.push(DrawCall::new(MeshSource::Segment(id), segment.mesh(), scale, [0.0, 0.0, z]));
            }
        }
        z -= z_scale * sectors as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{generate, MeshKind, Palette};
    use crate::world::Segment;

    fn three_segment_level() -> Level {
        let mut level = Level::from_segments(vec![
            Segment::new(4, 5, 3, true).unwrap(),
            Segment::new(0, 0, 2, false).unwrap(),
            Segment::new(3, 1, 1, true).unwrap(),
        ])
        .unwrap();
        level.regenerate_all(&Palette::default());
        level
    }

    #[test]
    fn test_segments_stack_along_depth() {
        let level = three_segment_level();
        let mut frame = Frame::new([0.0; 3]);
        draw_level(&mut frame, &level, 0.5, 1.0, None);

        // The gap segment has an empty mesh and is skipped
        assert_eq!(frame.draws.len(), 2);
        assert_eq!(frame.draws[0].displacement, [0.0, 0.0, 1.0]);
        assert_eq!(frame.draws[0].vertex_count, 6 * 60);
        assert_eq!(frame.draws[0].source, MeshSource::Segment(level.id_at(0)));
        // 3 + 2 sectors before the last segment
        assert_eq!(frame.draws[1].displacement, [0.0, 0.0, 1.0 - 0.5 * 5.0]);
        assert_eq!(frame.draws[1].scale, [1.0, 1.0, 0.5]);
        assert_eq!(segment_depth(&level, 2, 0.5, 1.0), 1.0 - 2.5);
    }

    #[test]
    fn test_replaced_segment_spans_its_sectors() {
        let level = three_segment_level();
        let block = generate(MeshKind::SegmentBlock, level.segment(0).geometry(), &[], &Palette::default());
        let mut frame = Frame::new([0.0; 3]);
        draw_level(&mut frame, &level, 0.04, 0.0, Some((0, MeshSource::Overlay, &block)));

        let first = &frame.draws[0];
        assert_eq!(first.source, MeshSource::Overlay);
        assert_eq!(first.primitive, Primitive::Triangles);
        assert_eq!(first.vertex_count, 6 * 4);
        assert!((first.scale[2] - 0.12).abs() < 1e-6);
    }
}
