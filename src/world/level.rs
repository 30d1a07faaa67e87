//! Level model: an ordered run of segments
//!
//! Order is traversal order along the depth axis: segment 0 is nearest the
//! viewer and later segments extend away from it. A level always holds at
//! least one segment.

use serde::{Serialize, Deserialize};
use crate::mesh::Palette;
use super::{Segment, SegmentArena, SegmentGeometry, SegmentId, WorldError, PRESENT};

/// Geometry and fill used to build a fresh level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTemplate {
    pub floors: u32,
    pub floor_planes: u32,
    pub sectors: u32,
    pub filled: bool,
}

impl Default for SegmentTemplate {
    fn default() -> Self {
        Self { floors: 4, floor_planes: 5, sectors: 1, filled: true }
    }
}

/// Built-in sample: 5 planes per 4 floors, 2 full sectors then 2 with holes
const SAMPLE_LEVEL: [u8; 80] = [
    1, 0, 0, 1, 1,   1, 1, 1, 1, 1,   1, 1, 1, 1, 1,   1, 1, 1, 1, 1,
    1, 1, 1, 1, 1,   1, 1, 1, 1, 1,   1, 1, 1, 1, 1,   1, 1, 1, 1, 1,
    1, 0, 1, 0, 1,   1, 1, 1, 1, 1,   0, 0, 0, 0, 0,   1, 1, 1, 1, 1,
    1, 1, 1, 0, 1,   1, 0, 0, 1, 1,   0, 0, 1, 0, 0,   1, 1, 1, 1, 1,
];

/// The full traversable level
#[derive(Debug, Clone)]
pub struct Level {
    arena: SegmentArena,
    order: Vec<SegmentId>,
    /// Ids of removed segments whose GPU-side buffers still need freeing
    released: Vec<SegmentId>,
}

impl Level {
    /// Level holding a single segment
    pub fn new(first: Segment) -> Self {
        let mut arena = SegmentArena::new();
        let id = arena.insert(first);
        Self { arena, order: vec![id], released: Vec::new() }
    }

    /// Build a level from segments in traversal order
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, WorldError> {
        if segments.is_empty() {
            return Err(WorldError::EmptyLevel);
        }
        let mut arena = SegmentArena::new();
        let order = segments.into_iter().map(|s| arena.insert(s)).collect();
        Ok(Self { arena, order, released: Vec::new() })
    }

    /// Default level on editor startup
    pub fn blank(template: &SegmentTemplate) -> Result<Self, WorldError> {
        let segment = Segment::new(template.floors, template.floor_planes, template.sectors, template.filled)?;
        Ok(Self::new(segment))
    }

    /// Built-in demonstration level
    pub fn sample() -> Self {
        let geometry = SegmentGeometry::new(4, 5, 4);
        let occupancy = SAMPLE_LEVEL.iter().map(|&b| b * PRESENT).collect();
        match Segment::from_occupancy(geometry, occupancy) {
            Ok(segment) => Self::new(segment),
            Err(e) => unreachable!("sample level is well formed: {}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn id_at(&self, index: usize) -> SegmentId {
        self.order[index]
    }

    /// Segment at traversal position `index`
    pub fn segment(&self, index: usize) -> &Segment {
        let id = self.order[index];
        match self.arena.get(id) {
            Some(segment) => segment,
            None => unreachable!("ordered id {:?} missing from arena", id),
        }
    }

    pub fn segment_mut(&mut self, index: usize) -> &mut Segment {
        let id = self.order[index];
        match self.arena.get_mut(id) {
            Some(segment) => segment,
            None => unreachable!("ordered id {:?} missing from arena", id),
        }
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.arena.get(id)
    }

    /// Segments in traversal order
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.order.iter().map(move |&id| (id, self.segment_by_id(id)))
    }

    fn segment_by_id(&self, id: SegmentId) -> &Segment {
        match self.arena.get(id) {
            Some(segment) => segment,
            None => unreachable!("ordered id {:?} missing from arena", id),
        }
    }

    /// Insert an empty one-sector segment at `at`, copying floors and planes
    /// from `template`
    pub fn insert_segment(&mut self, at: usize, template: &SegmentGeometry) -> Result<SegmentId, WorldError> {
        let segment = Segment::new(template.floors, template.floor_planes, 1, false)?;
        let id = self.arena.insert(segment);
        self.order.insert(at, id);
        Ok(id)
    }

    /// Remove the segment at `at`, keeping at least one segment.
    /// The removed id is queued for GPU-side release.
    pub fn remove_segment(&mut self, at: usize) -> Result<Segment, WorldError> {
        if self.order.len() <= 1 {
            return Err(WorldError::LastSegmentProtected);
        }
        let id = self.order.remove(at);
        self.released.push(id);
        match self.arena.remove(id) {
            Some(segment) => Ok(segment),
            None => unreachable!("ordered id {:?} missing from arena", id),
        }
    }

    /// Swap in another level, queueing every current segment for release
    pub fn replace(&mut self, other: Level) {
        let old_ids = std::mem::take(&mut self.order);
        let old_released = std::mem::take(&mut self.released);
        *self = other;
        self.released.extend(old_released);
        self.released.extend(old_ids);
    }

    /// Ids removed since the last call
    pub fn drain_released(&mut self) -> Vec<SegmentId> {
        std::mem::take(&mut self.released)
    }

    /// Refresh extents and meshes of every segment
    pub fn regenerate_all(&mut self, palette: &Palette) {
        for index in 0..self.order.len() {
            let segment = self.segment_mut(index);
            segment.recompute_floor_extents();
            segment.regenerate_mesh(palette);
        }
    }

    /// Total number of sectors before traversal position `index`
    pub fn sectors_before(&self, index: usize) -> u32 {
        self.order[..index]
            .iter()
            .map(|&id| self.segment_by_id(id).geometry().sectors)
            .sum()
    }
}
