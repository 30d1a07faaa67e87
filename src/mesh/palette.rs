//! Colours used by the mesh generator

use serde::{Serialize, Deserialize};

pub type Rgb = [f32; 3];

/// Slot colours indexed by the 2-bit occupancy state, plus overlay colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// 0 = empty (skipped), 1 = present, 2 = selected empty, 3 = selected present
    pub slots: [Rgb; 4],
    /// Wireframe highlight of the current segment
    pub overlay: Rgb,
    /// Solid block drawn over the current segment in Segment granularity
    pub block: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            slots: [
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 1.0],
                [0.2, 0.2, 0.2],
                [0.0, 1.0, 0.0],
            ],
            overlay: [1.0, 0.85, 0.2],
            block: [0.3, 0.5, 1.0],
        }
    }
}

impl Palette {
    /// Colour for an occupancy state, or `None` when the slot emits no geometry
    pub fn slot_color(&self, state: u8) -> Option<Rgb> {
        match state & 0b11 {
            0 => None,
            index => self.slots.get(usize::from(index)).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_has_no_color() {
        let palette = Palette::default();
        assert_eq!(palette.slot_color(0), None);
        assert_eq!(palette.slot_color(1), Some([1.0, 1.0, 1.0]));
        assert_eq!(palette.slot_color(2), Some([0.2, 0.2, 0.2]));
        assert_eq!(palette.slot_color(3), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_high_bits_are_ignored() {
        let palette = Palette::default();
        assert_eq!(palette.slot_color(0b101), palette.slot_color(1));
        assert_eq!(palette.slot_color(0b100), None);
    }
}
