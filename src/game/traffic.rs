//! Ambient traffic cars that cruise along the street grid and wrap around
//! the city edge.

use std::f32::consts::{FRAC_PI_2, PI};

use rand::Rng;
use serde::Serialize;

use crate::game::config::{GRID_SPACING, GameConfig};
use crate::game::geometry::Position;

const LANE_OFFSET: f32 = 4.0;
/// Cars spawn within this share of the city along their street.
const SPAWN_SPREAD: f32 = 0.8;
const MIN_SPEED: f32 = 0.03;
const SPEED_SPREAD: f32 = 0.05;
/// Car speeds are tuned per frame at this rate.
const REFERENCE_FPS: f32 = 60.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrafficCar {
    pub position: Position,
    /// Heading in radians; zero faces +z.
    pub heading: f32,
    /// Distance per reference frame.
    pub speed: f32,
    pub street_index: i32,
}

impl TrafficCar {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> Self {
        let street_index = rng.gen_range(-2..=2);
        let horizontal = rng.gen_bool(0.5);
        let half_spread = config.city_size * SPAWN_SPREAD / 2.0;
        let along = rng.gen_range(-half_spread..half_spread);
        let lane = if rng.gen_bool(0.5) {
            LANE_OFFSET
        } else {
            -LANE_OFFSET
        };
        let street = street_index as f32 * GRID_SPACING + lane;

        // Horizontal streets have constant z and run along x.
        let (position, heading) = if horizontal {
            let heading = if lane > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            (Position::new(along, street), heading)
        } else {
            let heading = if lane > 0.0 { 0.0 } else { PI };
            (Position::new(street, along), heading)
        };

        Self {
            position,
            heading,
            speed: MIN_SPEED + rng.gen_range(0.0..SPEED_SPREAD),
            street_index,
        }
    }

    pub fn advance(&mut self, delta: f32, half_city: f32) {
        let distance = self.speed * delta * REFERENCE_FPS;
        self.position.x += self.heading.sin() * distance;
        self.position.z += self.heading.cos() * distance;

        self.position.x = wrap(self.position.x, half_city);
        self.position.z = wrap(self.position.z, half_city);
    }
}

fn wrap(value: f32, half: f32) -> f32 {
    if value > half {
        -half
    } else if value < -half {
        half
    } else {
        value
    }
}

#[derive(Clone, Debug, Default)]
pub struct Traffic {
    pub cars: Vec<TrafficCar>,
}

impl Traffic {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> Self {
        let cars = (0..config.traffic_cars)
            .map(|_| TrafficCar::spawn(rng, config))
            .collect();
        Self { cars }
    }

    pub fn update(&mut self, delta: f32, config: &GameConfig) {
        let half = config.half_city();
        for car in &mut self.cars {
            car.advance(delta, half);
        }
    }
}
