//! Segment storage with generational handles
//!
//! Segments are addressed by `SegmentId` (slot index + generation):
//! - Removing a segment frees its slot and bumps the slot's generation
//! - A freed slot is reused by the next insert
//! - Ids held by the renderer for a removed segment stop resolving, so a
//!   reused slot is never mistaken for the segment that used to live there

use super::Segment;

/// Stable handle to a segment stored in a `SegmentArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId {
    index: u32,
    generation: u32,
}

impl SegmentId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    segment: Option<Segment>,
}

/// Owns every segment of a level
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    slots: Vec<Slot>,
    /// Free slots available for reuse (LIFO)
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a segment and hand back its id
    pub fn insert(&mut self, segment: Segment) -> SegmentId {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped on removal
            let slot = &mut self.slots[index as usize];
            slot.segment = Some(segment);
            SegmentId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, segment: Some(segment) });
            SegmentId { index, generation: 0 }
        }
    }

    /// Take a segment out of the arena, invalidating its id
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        if !self.contains(id) {
            return None;
        }
        let slot = &mut self.slots[id.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(id.index);
        self.alive_count -= 1;
        slot.segment.take()
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.slots
            .get(id.index as usize)
            .map(|slot| slot.generation == id.generation && slot.segment.is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_ref())
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_mut())
    }

    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }
}
