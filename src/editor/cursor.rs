//! Editor cursor and display modes

use crate::mesh::MeshKind;

/// Navigation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// One floor plane at a time
    #[default]
    Tile,
    /// A whole sector ring
    Sector,
    /// A whole segment
    Segment,
}

impl NavigationMode {
    /// Tile -> Sector -> Segment -> Tile
    pub fn next(self) -> Self {
        match self {
            NavigationMode::Tile => NavigationMode::Sector,
            NavigationMode::Sector => NavigationMode::Segment,
            NavigationMode::Segment => NavigationMode::Tile,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavigationMode::Tile => "Tile",
            NavigationMode::Sector => "Sector",
            NavigationMode::Segment => "Segment",
        }
    }
}

/// Highlight drawn over the current segment in Tile and Sector granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualizationMode {
    None,
    #[default]
    Outline,
    SectorWire,
    SlotWire,
}

impl VisualizationMode {
    pub fn next(self) -> Self {
        match self {
            VisualizationMode::None => VisualizationMode::Outline,
            VisualizationMode::Outline => VisualizationMode::SectorWire,
            VisualizationMode::SectorWire => VisualizationMode::SlotWire,
            VisualizationMode::SlotWire => VisualizationMode::None,
        }
    }

    /// Stream kind for the overlay, if any
    pub fn mesh_kind(self) -> Option<MeshKind> {
        match self {
            VisualizationMode::None => None,
            VisualizationMode::Outline => Some(MeshKind::Outline),
            VisualizationMode::SectorWire => Some(MeshKind::SectorWire),
            VisualizationMode::SlotWire => Some(MeshKind::SlotWire),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisualizationMode::None => "None",
            VisualizationMode::Outline => "Outline",
            VisualizationMode::SectorWire => "Sector wire",
            VisualizationMode::SlotWire => "Slot wire",
        }
    }
}

/// Where the editor is pointing
///
/// `spot` indexes the `floors * floor_planes` slots of one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorCursor {
    pub segment: usize,
    pub sector: u32,
    pub spot: u32,
    pub mode: NavigationMode,
}
