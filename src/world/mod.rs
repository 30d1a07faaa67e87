//! World module - segmented tube levels
//!
//! A level is an ordered run of segments stacked along the depth axis:
//! - Each segment has its own ring configuration (floors, planes, sectors)
//! - Occupancy is a flat byte buffer, one entry per floor plane
//! - Segments live in a generational arena so GPU-side buffers can be
//!   released by handle when a segment goes away
//!
//! Note: some model accessors are only reached from tests and debug output.

#![allow(dead_code)]

mod arena;
mod io;
mod level;
mod segment;

pub use arena::*;
pub use io::*;
pub use level::*;
pub use segment::*;

use std::fmt;

/// Structural errors raised by the level model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Missing planes or sectors, or counts past the level file limits
    InvalidGeometry { floors: u32, floor_planes: u32 },
    /// A segment must keep at least one sector
    LastSectorProtected,
    /// A level must keep at least one segment
    LastSegmentProtected,
    /// A level was built from zero segments
    EmptyLevel,
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::InvalidGeometry { floors, floor_planes } => write!(
                f,
                "invalid geometry: {} floors with {} planes per floor",
                floors, floor_planes
            ),
            WorldError::LastSectorProtected => write!(f, "cannot remove the last sector of a segment"),
            WorldError::LastSegmentProtected => write!(f, "cannot remove the last segment of a level"),
            WorldError::EmptyLevel => write!(f, "level has no segments"),
        }
    }
}

impl std::error::Error for WorldError {}
