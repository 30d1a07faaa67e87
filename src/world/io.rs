//! Level loading and saving
//!
//! Compact little-endian binary format:
//! - Level header: `u16 version | u16 segment count`, packed into one u32
//! - Per segment: `u16 sectors | u8 floor planes | u8 floors`, packed into one u32
//! - Per segment payload: presence bits, 8 slots per byte, zero padded
//!
//! Only the presence bit is stored; editor highlight bits never reach disk.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use crate::mesh::Palette;
use super::{limits, Level, Segment, SegmentGeometry, PRESENT};

/// Version stamped into every saved file
pub const FORMAT_VERSION: u16 = 2;

/// Error type for level loading and saving
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    /// The file decoded into something that is not a valid level
    Corrupt(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::Corrupt(e) => write!(f, "Corrupt level: {}", e),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::IoError(e) => Some(e),
            LevelError::Corrupt(_) => None,
        }
    }
}

/// Non-fatal problems found while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The file was written by a different format version; loaded anyway
    VersionMismatch { found: u16, expected: u16 },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::VersionMismatch { found, expected } => write!(
                f,
                "level format version {} differs from current version {}",
                found, expected
            ),
        }
    }
}

/// A successfully decoded level plus anything worth telling the user
#[derive(Debug)]
pub struct LoadedLevel {
    pub level: Level,
    pub warnings: Vec<LoadWarning>,
}

fn level_header(segment_count: u16) -> u32 {
    u32::from(FORMAT_VERSION) | (u32::from(segment_count) << 16)
}

fn segment_header(geo: &SegmentGeometry) -> u32 {
    (geo.sectors & 0xFFFF) | ((geo.floor_planes & 0xFF) << 16) | ((geo.floors & 0xFF) << 24)
}

fn unpack_segment_header(hdr: u32) -> SegmentGeometry {
    SegmentGeometry::new(hdr >> 24, (hdr >> 16) & 0xFF, hdr & 0xFFFF)
}

/// Serialize a level to bytes.
///
/// Panics if the level exceeds the header limits; the editor never builds
/// such a level.
pub fn serialize_level(level: &Level) -> Vec<u8> {
    assert!(level.len() <= usize::from(u16::MAX), "too many segments ({})", level.len());

    let mut out = Vec::new();
    out.extend_from_slice(&level_header(level.len() as u16).to_le_bytes());

    for (_, segment) in level.iter() {
        let geo = segment.geometry();
        assert!(geo.floors <= limits::MAX_FLOORS, "too many floors ({})", geo.floors);
        assert!(geo.floor_planes <= limits::MAX_FLOOR_PLANES, "too many floor planes ({})", geo.floor_planes);
        assert!(geo.sectors <= limits::MAX_SECTORS, "too many sectors ({})", geo.sectors);

        out.extend_from_slice(&segment_header(geo).to_le_bytes());

        // Pack the slots in a bit array, padded with 0s if necessary
        let mut packed = vec![0u8; geo.slot_count().div_ceil(8)];
        for (s, present) in segment.persistent_occupancy().enumerate() {
            packed[s / 8] |= u8::from(present) << (s & 7);
        }
        out.extend_from_slice(&packed);
    }

    out
}

fn read_u32(reader: &mut &[u8], what: &str) -> Result<u32, LevelError> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|_| LevelError::Corrupt(format!("truncated {}", what)))?;
    Ok(u32::from_le_bytes(buf))
}

/// Parse level data from bytes, regenerating every segment's derived data
pub fn parse_level_data(bytes: &[u8], palette: &Palette) -> Result<LoadedLevel, LevelError> {
    let mut reader = bytes;
    let mut warnings = Vec::new();

    let hdr = read_u32(&mut reader, "level header")?;
    let version = (hdr & 0xFFFF) as u16;
    let segment_count = (hdr >> 16) as usize;

    if version != FORMAT_VERSION {
        let warning = LoadWarning::VersionMismatch { found: version, expected: FORMAT_VERSION };
        log::warn!("{}, loading anyway", warning);
        warnings.push(warning);
    }
    if segment_count == 0 {
        return Err(LevelError::Corrupt("level has no segments".to_string()));
    }

    let mut segments = Vec::with_capacity(segment_count);
    for index in 0..segment_count {
        let geo = unpack_segment_header(read_u32(&mut reader, "segment header")?);
        let slots = geo.slot_count();

        // Check against the remaining input before trusting the header's sizes
        let needed = slots.div_ceil(8);
        if reader.len() < needed {
            return Err(LevelError::Corrupt(format!(
                "segment {}: truncated occupancy ({} of {} bytes)",
                index,
                reader.len(),
                needed
            )));
        }
        let (packed, rest) = reader.split_at(needed);
        reader = rest;

        let occupancy = (0..slots)
            .map(|s| ((packed[s / 8] >> (s & 7)) & 1) * PRESENT)
            .collect();
        let segment = Segment::from_occupancy(geo, occupancy)
            .map_err(|e| LevelError::Corrupt(format!("segment {}: {}", index, e)))?;
        segments.push(segment);
    }

    if !reader.is_empty() {
        log::warn!("ignoring {} trailing bytes after level data", reader.len());
    }

    let mut level = Level::from_segments(segments)
        .map_err(|e| LevelError::Corrupt(e.to_string()))?;
    level.regenerate_all(palette);

    Ok(LoadedLevel { level, warnings })
}

/// Save a level to a file
pub fn save_level<P: AsRef<Path>>(level: &Level, path: P) -> Result<(), LevelError> {
    let data = serialize_level(level);
    fs::write(path, data)?;
    Ok(())
}

/// Load a level from a file
pub fn load_level<P: AsRef<Path>>(path: P, palette: &Palette) -> Result<LoadedLevel, LevelError> {
    let bytes = fs::read(path)?;
    parse_level_data(&bytes, palette)
}
