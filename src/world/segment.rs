//! Segment model: ring configuration plus flat occupancy buffer

use serde::{Serialize, Deserialize};
use crate::geometry::{main_floor_extents, FloorExtents};
use crate::mesh::{self, MeshKind, Palette, VertexBuffer};
use super::WorldError;

/// Occupancy bit: a floor plane is present
pub const PRESENT: u8 = 1 << 0;
/// Occupancy bit: the slot is highlighted by the editor cursor (never persisted)
pub const SELECTED: u8 = 1 << 1;

/// Limits imposed by the level file's packed headers
pub mod limits {
    pub const MAX_FLOORS: u32 = u8::MAX as u32;
    pub const MAX_FLOOR_PLANES: u32 = u8::MAX as u32;
    pub const MAX_SECTORS: u32 = u16::MAX as u32;
}

/// Ring configuration of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentGeometry {
    /// Number of standable floors; 0 marks a gap segment
    pub floors: u32,
    /// Divisions (tiles) per floor
    pub floor_planes: u32,
    /// Rings stacked along the depth axis
    pub sectors: u32,
}

impl SegmentGeometry {
    pub fn new(floors: u32, floor_planes: u32, sectors: u32) -> Self {
        Self { floors, floor_planes, sectors }
    }

    /// Reject configurations the rest of the model or the level file cannot represent
    pub fn validate(&self) -> Result<(), WorldError> {
        let empty = (self.floors > 0 && self.floor_planes == 0) || self.sectors == 0;
        let oversized = self.floors > limits::MAX_FLOORS
            || self.floor_planes > limits::MAX_FLOOR_PLANES
            || self.sectors > limits::MAX_SECTORS;
        if empty || oversized {
            return Err(WorldError::InvalidGeometry {
                floors: self.floors,
                floor_planes: self.floor_planes,
            });
        }
        Ok(())
    }

    /// Gap segments have no occupancy slots
    pub fn is_gap(&self) -> bool {
        self.floors == 0
    }

    /// Slots in one sector (one full ring)
    pub fn slots_per_sector(&self) -> usize {
        self.floors as usize * self.floor_planes as usize
    }

    pub fn slot_count(&self) -> usize {
        self.slots_per_sector() * self.sectors as usize
    }

    /// Flat index of a plane: `sector * (floors*planes) + floor * planes + plane`
    pub fn slot_index(&self, sector: u32, floor: u32, plane: u32) -> usize {
        self.spot_index(sector, floor * self.floor_planes + plane)
    }

    /// Flat index of a spot, where `spot = floor * planes + plane`
    pub fn spot_index(&self, sector: u32, spot: u32) -> usize {
        sector as usize * self.slots_per_sector() + spot as usize
    }
}

/// One depth-wise slice of the level
///
/// The mesh and floor extents are caches derived from geometry and occupancy;
/// regenerating them from the same occupancy always gives the same result.
#[derive(Debug, Clone)]
pub struct Segment {
    geometry: SegmentGeometry,
    extents: FloorExtents,
    occupancy: Vec<u8>,
    mesh: VertexBuffer,
}

impl Segment {
    /// Create a segment with every slot set to `fill`
    pub fn new(floors: u32, floor_planes: u32, sectors: u32, fill: bool) -> Result<Self, WorldError> {
        let geometry = SegmentGeometry::new(floors, floor_planes, sectors);
        geometry.validate()?;
        let value = if fill { PRESENT } else { 0 };
        Ok(Self::build(geometry, vec![value; geometry.slot_count()]))
    }

    /// Create a segment from an existing occupancy buffer (used by the loader)
    pub fn from_occupancy(geometry: SegmentGeometry, occupancy: Vec<u8>) -> Result<Self, WorldError> {
        geometry.validate()?;
        if occupancy.len() != geometry.slot_count() {
            return Err(WorldError::InvalidGeometry {
                floors: geometry.floors,
                floor_planes: geometry.floor_planes,
            });
        }
        Ok(Self::build(geometry, occupancy))
    }

    fn build(geometry: SegmentGeometry, occupancy: Vec<u8>) -> Self {
        let mut segment = Self {
            geometry,
            extents: FloorExtents::default(),
            occupancy,
            mesh: VertexBuffer::default(),
        };
        segment.recompute_floor_extents();
        segment
    }

    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    pub fn extents(&self) -> &FloorExtents {
        &self.extents
    }

    pub fn occupancy(&self) -> &[u8] {
        &self.occupancy
    }

    /// Solid mesh built by the last `regenerate_mesh` call
    pub fn mesh(&self) -> &VertexBuffer {
        &self.mesh
    }

    pub fn slot(&self, sector: u32, spot: u32) -> u8 {
        self.occupancy[self.geometry.spot_index(sector, spot)]
    }

    /// XOR `mask` into one plane. Indices must be in range.
    pub fn toggle_slot(&mut self, sector: u32, floor: u32, plane: u32, mask: u8) {
        let index = self.geometry.slot_index(sector, floor, plane);
        self.occupancy[index] ^= mask;
    }

    /// XOR `mask` into one spot of a sector. Indices must be in range.
    pub fn toggle_spot(&mut self, sector: u32, spot: u32, mask: u8) {
        let index = self.geometry.spot_index(sector, spot);
        self.occupancy[index] ^= mask;
    }

    /// XOR `mask` into every slot of a sector
    pub fn toggle_sector(&mut self, sector: u32, mask: u8) {
        let per = self.geometry.slots_per_sector();
        let start = sector as usize * per;
        for slot in &mut self.occupancy[start..start + per] {
            *slot ^= mask;
        }
    }

    /// Whether another sector fits in the file format
    pub fn can_grow(&self) -> bool {
        self.geometry.sectors < limits::MAX_SECTORS
    }

    /// Insert an empty sector before (or after) `at`. Returns the new sector's index.
    pub fn insert_sector(&mut self, at: u32, after: bool) -> u32 {
        let index = if after { at + 1 } else { at };
        let per = self.geometry.slots_per_sector();
        let offset = index as usize * per;
        self.occupancy.splice(offset..offset, std::iter::repeat(0).take(per));
        self.geometry.sectors += 1;
        index
    }

    /// Remove sector `at`, keeping at least one sector
    pub fn remove_sector(&mut self, at: u32) -> Result<(), WorldError> {
        if self.geometry.sectors <= 1 {
            return Err(WorldError::LastSectorProtected);
        }
        let per = self.geometry.slots_per_sector();
        let start = at as usize * per;
        self.occupancy.drain(start..start + per);
        self.geometry.sectors -= 1;
        Ok(())
    }

    /// Refresh the bottom floor extents after floors/planes change
    pub fn recompute_floor_extents(&mut self) {
        self.extents = main_floor_extents(self.geometry.floors, self.geometry.floor_planes);
    }

    /// Rebuild the solid mesh from occupancy
    pub fn regenerate_mesh(&mut self, palette: &Palette) {
        self.mesh = mesh::generate(MeshKind::Solid, &self.geometry, &self.occupancy, palette);
        log::debug!(
            "regenerated segment mesh: {} vertices ({} sectors)",
            self.mesh.vertex_count(),
            self.geometry.sectors
        );
    }

    /// Presence bit of every slot; highlight bits are dropped
    pub fn persistent_occupancy(&self) -> impl Iterator<Item = bool> + '_ {
        self.occupancy.iter().map(|&s| s & PRESENT != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sizes_occupancy() {
        let seg = Segment::new(4, 5, 3, true).unwrap();
        assert_eq!(seg.occupancy().len(), 60);
        assert!(seg.occupancy().iter().all(|&s| s == PRESENT));

        let empty = Segment::new(3, 2, 2, false).unwrap();
        assert!(empty.occupancy().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_create_rejects_zero_planes() {
        assert_eq!(
            Segment::new(4, 0, 1, true).unwrap_err(),
            WorldError::InvalidGeometry { floors: 4, floor_planes: 0 }
        );
        // Gap segments may have no planes
        let gap = Segment::new(0, 0, 2, true).unwrap();
        assert!(gap.geometry().is_gap());
        assert!(gap.occupancy().is_empty());
    }

    #[test]
    fn test_create_rejects_oversized_geometry() {
        assert_eq!(
            Segment::new(300, 1, 1, true).unwrap_err(),
            WorldError::InvalidGeometry { floors: 300, floor_planes: 1 }
        );
        assert!(Segment::new(4, 256, 1, true).is_err());
        assert!(Segment::new(1, 1, limits::MAX_SECTORS + 1, false).is_err());

        let widest = Segment::new(limits::MAX_FLOORS, 1, 1, false).unwrap();
        assert_eq!(widest.geometry().floors, 255);
    }

    #[test]
    fn test_slot_index_layout() {
        let geo = SegmentGeometry::new(4, 5, 3);
        assert_eq!(geo.slot_index(0, 0, 0), 0);
        assert_eq!(geo.slot_index(0, 1, 2), 7);
        assert_eq!(geo.slot_index(2, 3, 4), 2 * 20 + 3 * 5 + 4);
        assert_eq!(geo.spot_index(1, 7), geo.slot_index(1, 1, 2));
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut seg = Segment::new(3, 2, 2, false).unwrap();
        let before = seg.occupancy().to_vec();
        seg.toggle_slot(1, 2, 1, PRESENT | SELECTED);
        assert_eq!(seg.slot(1, 5), PRESENT | SELECTED);
        seg.toggle_slot(1, 2, 1, PRESENT | SELECTED);
        assert_eq!(seg.occupancy(), &before[..]);
    }

    #[test]
    fn test_toggle_sector_only_touches_that_sector() {
        let mut seg = Segment::new(2, 2, 3, true).unwrap();
        seg.toggle_sector(1, SELECTED);
        for spot in 0..4 {
            assert_eq!(seg.slot(0, spot), PRESENT);
            assert_eq!(seg.slot(1, spot), PRESENT | SELECTED);
            assert_eq!(seg.slot(2, spot), PRESENT);
        }
    }

    #[test]
    fn test_insert_then_remove_restores_other_sectors() {
        let mut seg = Segment::new(2, 3, 3, false).unwrap();
        // Make each sector distinguishable
        seg.toggle_spot(0, 1, PRESENT);
        seg.toggle_spot(1, 4, PRESENT);
        seg.toggle_spot(2, 5, PRESENT);
        let before = seg.occupancy().to_vec();

        let index = seg.insert_sector(1, false);
        assert_eq!(index, 1);
        assert_eq!(seg.geometry().sectors, 4);
        assert!((0..6).all(|spot| seg.slot(1, spot) == 0));
        assert_eq!(seg.slot(2, 4), PRESENT);

        seg.remove_sector(index).unwrap();
        assert_eq!(seg.geometry().sectors, 3);
        assert_eq!(seg.occupancy(), &before[..]);
    }

    #[test]
    fn test_insert_after_last_sector() {
        let mut seg = Segment::new(1, 2, 1, true).unwrap();
        assert_eq!(seg.insert_sector(0, true), 1);
        assert_eq!(seg.occupancy(), &[PRESENT, PRESENT, 0, 0]);
    }

    #[test]
    fn test_last_sector_protected() {
        let mut seg = Segment::new(2, 2, 1, true).unwrap();
        assert_eq!(seg.remove_sector(0), Err(WorldError::LastSectorProtected));
        assert_eq!(seg.geometry().sectors, 1);
        assert_eq!(seg.occupancy().len(), 4);
    }

    #[test]
    fn test_extents_follow_geometry() {
        let seg = Segment::new(4, 5, 1, true).unwrap();
        let ext = seg.extents();
        assert!(ext.y_val < 0.0);
        assert!((ext.plane_width * 5.0 - (ext.x_max - ext.x_min)).abs() < 1e-6);
    }

    #[test]
    fn test_regenerate_is_reproducible() {
        let palette = Palette::default();
        let mut seg = Segment::new(3, 2, 2, true).unwrap();
        seg.toggle_spot(0, 3, PRESENT);
        seg.regenerate_mesh(&palette);
        let first = seg.mesh().vertices().to_vec();
        seg.regenerate_mesh(&palette);
        assert_eq!(seg.mesh().vertices(), &first[..]);
        assert_eq!(seg.mesh().vertex_count(), 6 * 11);
    }
}
