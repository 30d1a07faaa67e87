//! Segment mesh generation
//!
//! Turns a segment's occupancy into interleaved position/colour vertex
//! streams. Layout of every stream:
//! - Sector 0 starts at Z=0, sector n spans Z=-n to Z=-(n+1)
//! - All XY coordinates lie on the unit circle ring
//! - Floors and planes run counter-clockwise from the bottom floor
//!
//! Buffers are sized exactly before generation and never grow while filling.

mod palette;

pub use palette::*;

use std::sync::atomic::{AtomicU64, Ordering};
use bytemuck::{Pod, Zeroable};
use crate::geometry::{interpolate_along_floor, ring_vertex, FloorEdge};
use crate::world::SegmentGeometry;

/// One interleaved vertex: position then colour
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub col: [f32; 3],
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, col: Rgb) -> Self {
        Self { pos: [x, y, z], col }
    }
}

/// How the renderer should assemble a vertex stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    #[default]
    Triangles,
    Lines,
    TriangleStrip,
}

/// Depth covered by a generated stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSpan {
    /// One unit of Z per sector; drawn with the per-sector Z scale
    PerSector,
    /// One unit of Z for the whole segment; drawn scaled by the sector count
    WholeSegment,
}

/// The kinds of stream the generator can build for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshKind {
    /// Two triangles per drawn slot
    #[default]
    Solid,
    /// Front, back and one side edge per floor
    Outline,
    /// Side line plus every sector boundary per floor
    SectorWire,
    /// Plane division lines plus every sector boundary per floor
    SlotWire,
    /// One full-width panel per floor, highlighting the whole segment
    SegmentBlock,
}

impl MeshKind {
    pub fn primitive(self) -> Primitive {
        match self {
            MeshKind::Solid | MeshKind::SegmentBlock => Primitive::Triangles,
            MeshKind::Outline | MeshKind::SectorWire | MeshKind::SlotWire => Primitive::Lines,
        }
    }

    pub fn depth_span(self) -> DepthSpan {
        match self {
            MeshKind::Outline | MeshKind::SegmentBlock => DepthSpan::WholeSegment,
            MeshKind::Solid | MeshKind::SectorWire | MeshKind::SlotWire => DepthSpan::PerSector,
        }
    }

    /// Exact number of vertices `generate` emits for this kind
    pub fn vertex_count(self, geo: &SegmentGeometry, occupancy: &[u8]) -> usize {
        let floors = geo.floors as usize;
        let sectors = geo.sectors as usize;
        match self {
            MeshKind::Solid => 6 * occupancy.iter().filter(|&&s| s & 0b11 != 0).count(),
            MeshKind::Outline | MeshKind::SegmentBlock => 6 * floors,
            MeshKind::SectorWire => 2 * floors * (sectors + 2),
            MeshKind::SlotWire => 2 * floors * (geo.floor_planes as usize + sectors + 1),
        }
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// A generated vertex stream, ready for upload
///
/// Each generation gets a process-unique revision, so an uploader can tell
/// whether its copy is stale by comparing revisions.
#[derive(Debug, Clone, Default)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
    primitive: Primitive,
    revision: u64,
}

impl VertexBuffer {
    pub fn new(vertices: Vec<Vertex>, primitive: Primitive) -> Self {
        Self {
            vertices,
            primitive,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Interleaved `(x, y, z, r, g, b)` floats
    #[allow(dead_code)]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex count for the draw call
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Build a vertex stream of `kind` for a segment
pub fn generate(kind: MeshKind, geo: &SegmentGeometry, occupancy: &[u8], palette: &Palette) -> VertexBuffer {
    let count = kind.vertex_count(geo, occupancy);
    let mut out = Vec::with_capacity(count);

    if !geo.is_gap() {
        match kind {
            MeshKind::Solid => emit_solid(&mut out, geo, occupancy, palette),
            MeshKind::Outline => emit_outline(&mut out, geo, palette.overlay),
            MeshKind::SectorWire => emit_sector_wire(&mut out, geo, palette.overlay),
            MeshKind::SlotWire => emit_slot_wire(&mut out, geo, palette.overlay),
            MeshKind::SegmentBlock => emit_block(&mut out, geo, palette.block),
        }
    }

    debug_assert_eq!(out.len(), count, "{:?} emitted a different count than declared", kind);
    VertexBuffer::new(out, kind.primitive())
}

fn edges(geo: &SegmentGeometry) -> impl Iterator<Item = FloorEdge> {
    let floors = geo.floors;
    (0..floors).map(move |floor| ring_vertex(floor, floors))
}

fn push_line(out: &mut Vec<Vertex>, a: (f32, f32, f32), b: (f32, f32, f32), col: Rgb) {
    out.push(Vertex::new(a.0, a.1, a.2, col));
    out.push(Vertex::new(b.0, b.1, b.2, col));
}

/// Two triangles between corners `p0`/`p1` spanning depth `z0..z1`
fn push_panel(out: &mut Vec<Vertex>, p0: (f32, f32), p1: (f32, f32), z0: f32, z1: f32, col: Rgb) {
    out.push(Vertex::new(p0.0, p0.1, z0, col));
    out.push(Vertex::new(p1.0, p1.1, z0, col));
    out.push(Vertex::new(p1.0, p1.1, z1, col));

    out.push(Vertex::new(p1.0, p1.1, z1, col));
    out.push(Vertex::new(p0.0, p0.1, z1, col));
    out.push(Vertex::new(p0.0, p0.1, z0, col));
}

fn emit_solid(out: &mut Vec<Vertex>, geo: &SegmentGeometry, occupancy: &[u8], palette: &Palette) {
    let planes = geo.floor_planes as f32;
    // Ring corners are the same for every sector
    let ring: Vec<FloorEdge> = edges(geo).collect();
    let mut slots = occupancy.iter();

    for sector in 0..geo.sectors {
        let z0 = -(sector as f32);
        let z1 = z0 - 1.0;
        for edge in &ring {
            for plane in 0..geo.floor_planes {
                let Some(&state) = slots.next() else { return };
                let Some(color) = palette.slot_color(state) else { continue };
                let p0 = interpolate_along_floor(edge, plane as f32 / planes);
                let p1 = interpolate_along_floor(edge, (plane + 1) as f32 / planes);
                push_panel(out, p0, p1, z0, z1, color);
            }
        }
    }
}

fn emit_outline(out: &mut Vec<Vertex>, geo: &SegmentGeometry, col: Rgb) {
    for e in edges(geo) {
        push_line(out, (e.xl, e.yl, 0.0), (e.xr, e.yr, 0.0), col);
        push_line(out, (e.xl, e.yl, -1.0), (e.xr, e.yr, -1.0), col);
        push_line(out, (e.xl, e.yl, 0.0), (e.xl, e.yl, -1.0), col);
    }
}

fn emit_sector_boundaries(out: &mut Vec<Vertex>, e: &FloorEdge, sectors: u32, col: Rgb) {
    for boundary in 0..=sectors {
        let z = -(boundary as f32);
        push_line(out, (e.xl, e.yl, z), (e.xr, e.yr, z), col);
    }
}

fn emit_sector_wire(out: &mut Vec<Vertex>, geo: &SegmentGeometry, col: Rgb) {
    let depth = -(geo.sectors as f32);
    for e in edges(geo) {
        push_line(out, (e.xl, e.yl, 0.0), (e.xl, e.yl, depth), col);
        emit_sector_boundaries(out, &e, geo.sectors, col);
    }
}

fn emit_slot_wire(out: &mut Vec<Vertex>, geo: &SegmentGeometry, col: Rgb) {
    let depth = -(geo.sectors as f32);
    let planes = geo.floor_planes as f32;
    for e in edges(geo) {
        for plane in 0..geo.floor_planes {
            let (x, y) = interpolate_along_floor(&e, plane as f32 / planes);
            push_line(out, (x, y, 0.0), (x, y, depth), col);
        }
        emit_sector_boundaries(out, &e, geo.sectors, col);
    }
}

fn emit_block(out: &mut Vec<Vertex>, geo: &SegmentGeometry, col: Rgb) {
    for e in edges(geo) {
        push_panel(out, (e.xl, e.yl), (e.xr, e.yr), 0.0, -1.0, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Segment, PRESENT, SELECTED};

    fn mesh_of(kind: MeshKind, seg: &Segment) -> VertexBuffer {
        generate(kind, seg.geometry(), seg.occupancy(), &Palette::default())
    }

    #[test]
    fn test_solid_count_is_six_per_present_slot() {
        let mut seg = Segment::new(4, 5, 3, true).unwrap();
        seg.toggle_spot(0, 2, PRESENT);
        seg.toggle_spot(2, 19, PRESENT);
        let mesh = mesh_of(MeshKind::Solid, &seg);
        assert_eq!(mesh.vertex_count(), 6 * 58);
        assert_eq!(mesh.as_floats().len(), 6 * 6 * 58);
        assert_eq!(mesh.primitive(), Primitive::Triangles);
    }

    #[test]
    fn test_selected_empty_slot_draws_dim_panel() {
        let palette = Palette::default();
        let mut seg = Segment::new(3, 1, 1, false).unwrap();
        assert!(mesh_of(MeshKind::Solid, &seg).is_empty());

        seg.toggle_spot(0, 1, SELECTED);
        let mesh = mesh_of(MeshKind::Solid, &seg);
        assert_eq!(mesh.vertex_count(), 6);
        assert!(mesh.vertices().iter().all(|v| v.col == palette.slots[2]));
    }

    #[test]
    fn test_solid_panel_spans_one_sector() {
        let mut seg = Segment::new(4, 1, 3, false).unwrap();
        seg.toggle_spot(2, 0, PRESENT);
        let mesh = mesh_of(MeshKind::Solid, &seg);
        let zs: Vec<f32> = mesh.vertices().iter().map(|v| v.pos[2]).collect();
        assert_eq!(zs, vec![-2.0, -2.0, -3.0, -3.0, -3.0, -2.0]);

        // Bottom floor with one plane covers the whole bottom edge
        let edge = ring_vertex(0, 4);
        assert_eq!(mesh.vertices()[0].pos[0], edge.xl);
        assert!((mesh.vertices()[1].pos[0] - edge.xr).abs() < 1e-6);
    }

    #[test]
    fn test_outline_counts() {
        let seg = Segment::new(5, 3, 4, true).unwrap();
        let mesh = mesh_of(MeshKind::Outline, &seg);
        assert_eq!(mesh.vertex_count(), 6 * 5);
        // Three position floats per vertex: 18 per floor
        assert_eq!(mesh.vertex_count() * 3, 18 * 5);
        assert_eq!(mesh.primitive(), Primitive::Lines);
        assert!(mesh.vertices().iter().all(|v| v.pos[2] == 0.0 || v.pos[2] == -1.0));
    }

    #[test]
    fn test_sector_wire_count() {
        let seg = Segment::new(6, 2, 3, true).unwrap();
        let mesh = mesh_of(MeshKind::SectorWire, &seg);
        assert_eq!(mesh.vertex_count(), (3 + 2) * 6 * 2);
        let deepest = mesh.vertices().iter().map(|v| v.pos[2]).fold(0.0f32, f32::min);
        assert_eq!(deepest, -3.0);
    }

    #[test]
    fn test_slot_wire_count() {
        let seg = Segment::new(4, 5, 2, false).unwrap();
        let mesh = mesh_of(MeshKind::SlotWire, &seg);
        assert_eq!(mesh.vertex_count(), 2 * 4 * (5 + 2 + 1));
    }

    #[test]
    fn test_block_is_one_panel_per_floor() {
        let seg = Segment::new(8, 2, 7, false).unwrap();
        let mesh = mesh_of(MeshKind::SegmentBlock, &seg);
        assert_eq!(mesh.vertex_count(), 6 * 8);
        assert_eq!(MeshKind::SegmentBlock.depth_span(), DepthSpan::WholeSegment);
    }

    #[test]
    fn test_gap_segment_emits_nothing() {
        let seg = Segment::new(0, 0, 3, true).unwrap();
        for kind in [MeshKind::Solid, MeshKind::Outline, MeshKind::SectorWire, MeshKind::SlotWire, MeshKind::SegmentBlock] {
            assert!(mesh_of(kind, &seg).is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_revisions_are_unique() {
        let seg = Segment::new(2, 2, 1, true).unwrap();
        let a = mesh_of(MeshKind::Solid, &seg);
        let b = mesh_of(MeshKind::Solid, &seg);
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a.vertices(), b.vertices());
    }
}
