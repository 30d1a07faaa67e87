//! Ring geometry for the tube cross-section
//!
//! A cross-section is a regular polygon inscribed in the unit circle. Each edge
//! is a "floor"; floor 0 sits flat at the bottom and the remaining floors follow
//! counter-clockwise. All trig is done in f64 and narrowed to f32 at the end so
//! the output is reproducible across platforms.

use std::f64::consts::PI;

/// Left and right corners of one floor edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorEdge {
    pub xl: f32,
    pub yl: f32,
    pub xr: f32,
    pub yr: f32,
}

/// Corners of floor `floor` on a ring of `floors` equal wedges.
///
/// Wedge `i` spans `[i*phi - phi/2, i*phi + phi/2]` with `phi = 2pi/floors`;
/// a corner at angle `a` sits at `(sin a, -cos a)`.
pub fn ring_vertex(floor: u32, floors: u32) -> FloorEdge {
    debug_assert!(floors > 0, "ring with no floors");
    let phi = 2.0 * PI / f64::from(floors);
    let angle = f64::from(floor) * phi;
    FloorEdge {
        xl: (angle - phi / 2.0).sin() as f32,
        yl: (-(angle - phi / 2.0).cos()) as f32,
        xr: (angle + phi / 2.0).sin() as f32,
        yr: (-(angle + phi / 2.0).cos()) as f32,
    }
}

/// Point at `fraction` of the way from the left to the right corner
pub fn interpolate_along_floor(edge: &FloorEdge, fraction: f32) -> (f32, f32) {
    (
        edge.xl + fraction * (edge.xr - edge.xl),
        edge.yl + fraction * (edge.yr - edge.yl),
    )
}

/// Extents of the bottom floor, used to place the player sprite
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloorExtents {
    /// Height of the bottom floor (negative, below the ring centre)
    pub y_val: f32,
    pub x_min: f32,
    pub x_max: f32,
    /// Width of one floor plane
    pub plane_width: f32,
}

/// Bottom floor extents for a ring. Gap rings (no floors) have zero extents.
pub fn main_floor_extents(floors: u32, floor_planes: u32) -> FloorExtents {
    if floors == 0 {
        return FloorExtents::default();
    }
    let half = PI / f64::from(floors);
    let x_max = half.sin() as f32;
    let plane_width = if floor_planes == 0 {
        0.0
    } else {
        2.0 * x_max / floor_planes as f32
    };
    FloorExtents {
        y_val: (-half.cos()) as f32,
        x_min: -x_max,
        x_max,
        plane_width,
    }
}
