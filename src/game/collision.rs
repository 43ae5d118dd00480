//! Bounding-box and radius checks against the static city.

use serde::{Deserialize, Serialize};

use crate::game::geometry::Position;

/// Axis-aligned building footprint centred on `(x, z)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

impl Building {
    /// True when `(x, z)` lies strictly inside the footprint grown by
    /// `padding` on every side.
    pub fn blocks(&self, x: f32, z: f32, padding: f32) -> bool {
        let half_width = self.width / 2.0 + padding;
        let half_depth = self.depth / 2.0 + padding;

        x > self.x - half_width
            && x < self.x + half_width
            && z > self.z - half_depth
            && z < self.z + half_depth
    }
}

/// Returns the first building in list order that blocks the point.
pub fn first_blocking(buildings: &[Building], x: f32, z: f32, padding: f32) -> Option<&Building> {
    buildings.iter().find(|b| b.blocks(x, z, padding))
}

pub fn out_of_bounds(x: f32, z: f32, half_extent: f32) -> bool {
    x.abs() > half_extent || z.abs() > half_extent
}

/// Strict proximity test used for pickups, deliveries and boosters.
pub fn within_radius(a: &Position, b: &Position, radius: f32) -> bool {
    a.distance_to(b) < radius
}
