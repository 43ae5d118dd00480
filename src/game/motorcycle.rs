//! Arcade motorcycle physics: acceleration, friction, steering and blocking
//! against buildings and the city edge.

use serde::{Deserialize, Serialize};

use crate::game::collision::{Building, first_blocking, out_of_bounds};
use crate::game::config::GameConfig;
use crate::game::geometry::{Pose, Position};

/// Player input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Horizontal joystick deflection in `[-1, 1]`, positive to the right.
    #[serde(default)]
    pub joystick: Option<f32>,
}

/// What happened to the motorcycle during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    HitBuilding,
    HitBoundary,
    /// Both a building and the city edge were in the way.
    HitBuildingAndBoundary,
}

impl StepOutcome {
    pub fn moved(self) -> bool {
        matches!(self, StepOutcome::Moved)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Motorcycle {
    pub position: Position,
    /// Heading in radians; zero faces +z.
    pub rotation: f32,
    pub speed: f32,
    /// Temporary addition to the speed cap granted by boosters.
    pub speed_boost: f32,
    pub distance_traveled: f32,
}

impl Motorcycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position.x, self.position.z, self.rotation)
    }

    pub fn speed_cap(&self, config: &GameConfig) -> f32 {
        config.max_speed + self.speed_boost
    }

    /// Advances the bike by one frame of `delta` seconds.
    pub fn step(
        &mut self,
        controls: &Controls,
        delta: f32,
        buildings: &[Building],
        config: &GameConfig,
    ) -> StepOutcome {
        self.apply_throttle(controls, config);
        self.apply_steering(controls, config);

        let new_x = self.position.x + self.rotation.sin() * self.speed * delta;
        let new_z = self.position.z + self.rotation.cos() * self.speed * delta;

        let hit_building = first_blocking(buildings, new_x, new_z, config.building_padding).is_some();
        if hit_building {
            self.speed *= config.building_bounce;
        }

        let hit_boundary = out_of_bounds(new_x, new_z, config.playable_half_extent());
        if hit_boundary {
            self.speed *= config.boundary_bounce;
        }

        match (hit_building, hit_boundary) {
            (false, false) => {
                let next = Position::new(new_x, new_z);
                self.distance_traveled += self.position.distance_to(&next);
                self.position = next;
                StepOutcome::Moved
            }
            (true, false) => StepOutcome::HitBuilding,
            (false, true) => StepOutcome::HitBoundary,
            (true, true) => StepOutcome::HitBuildingAndBoundary,
        }
    }

    fn apply_throttle(&mut self, controls: &Controls, config: &GameConfig) {
        if controls.forward {
            self.speed = (self.speed + config.acceleration).min(self.speed_cap(config));
        } else if controls.backward {
            self.speed = (self.speed - config.brake_power).max(config.reverse_speed);
        } else {
            self.speed *= 1.0 - config.friction;
            if self.speed.abs() < config.stop_threshold {
                self.speed = 0.0;
            }
        }
    }

    fn apply_steering(&mut self, controls: &Controls, config: &GameConfig) {
        if self.speed.abs() <= config.min_turn_speed {
            return;
        }

        let turn = config.turn_speed * (self.speed.abs() / config.full_turn_speed).min(1.0);

        match controls.joystick {
            Some(axis) if axis != 0.0 => {
                self.rotation -= turn * axis * config.joystick_turn_scale;
            }
            _ => {
                if controls.left {
                    self.rotation += turn;
                }
                if controls.right {
                    self.rotation -= turn;
                }
            }
        }
    }
}
