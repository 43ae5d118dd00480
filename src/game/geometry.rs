//! Planar coordinates on the ground plane (x, z).

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// A point on the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, z: 0.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Euclidean distance on the ground plane.
    pub fn distance_to(&self, other: &Position) -> f32 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

/// Position plus heading around the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub z: f32,
    #[serde(default)]
    pub rotation: f32,
}

impl Pose {
    pub const fn new(x: f32, z: f32, rotation: f32) -> Self {
        Self { x, z, rotation }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.z)
    }
}

pub fn lerp(from: f32, to: f32, factor: f32) -> f32 {
    from + (to - from) * factor
}

/// Folds an angle difference into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}
