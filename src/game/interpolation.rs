//! Smooths remote players toward the last pose received from the server.

use crate::game::geometry::{Pose, lerp, wrap_angle};

pub const INTERPOLATION_FACTOR: f32 = 0.15;

/// A remote player as drawn locally.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteRider {
    pub current: Pose,
    pub target: Pose,
}

impl RemoteRider {
    pub fn new(pose: Pose) -> Self {
        Self {
            current: pose,
            target: pose,
        }
    }

    pub fn set_target(&mut self, target: Pose) {
        self.target = target;
    }

    /// Moves one frame toward the target, turning the short way round.
    pub fn step(&mut self) {
        self.current = interpolate(&self.current, &self.target, INTERPOLATION_FACTOR);
    }
}

pub fn interpolate(current: &Pose, target: &Pose, factor: f32) -> Pose {
    let turn = wrap_angle(target.rotation - current.rotation);
    Pose {
        x: lerp(current.x, target.x, factor),
        z: lerp(current.z, target.z, factor),
        rotation: current.rotation + turn * factor,
    }
}
