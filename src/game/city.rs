//! Static city layout: street grid, landmarks and generated buildings.

use rand::Rng;
use serde::Serialize;

use crate::game::collision::Building;
use crate::game::config::{BLOCK_SIZE, GRID_SPACING, GameConfig, STREET_INDICES, STREET_WIDTH};
use crate::game::geometry::Position;

/// A named place a courier picks up from or delivers to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Landmark {
    pub name: &'static str,
    pub emoji: &'static str,
    pub position: Position,
}

impl Landmark {
    const fn new(name: &'static str, emoji: &'static str, x: f32, z: f32) -> Self {
        Self {
            name,
            emoji,
            position: Position::new(x, z),
        }
    }
}

pub const RESTAURANTS: [Landmark; 6] = [
    Landmark::new("Pizza Place", "🍕", -120.0, -120.0),
    Landmark::new("Burger King", "🍔", 120.0, -120.0),
    Landmark::new("Sushi House", "🍣", -120.0, 120.0),
    Landmark::new("Taco Bell", "🌮", 120.0, 120.0),
    Landmark::new("Noodle Bar", "🍜", 0.0, -160.0),
    Landmark::new("Chicken Spot", "🍗", 0.0, 160.0),
];

pub const CUSTOMERS: [Landmark; 6] = [
    Landmark::new("Casa do João", "🏠", -160.0, 0.0),
    Landmark::new("Apt. Maria", "🏢", 160.0, 0.0),
    Landmark::new("Escritório Tech", "💼", -40.0, -160.0),
    Landmark::new("Festa da Ana", "🎉", 40.0, 160.0),
    Landmark::new("Casa do Pedro", "🏡", 160.0, -120.0),
    Landmark::new("Dormitório UFC", "🎓", -160.0, 120.0),
];

/// Buildings keep at least this distance from any landmark.
const LANDMARK_CLEARANCE: f32 = 20.0;
/// Extra clearance on each side of a street.
const STREET_CLEARANCE: f32 = 2.0;
/// Offsets keep buildings this far inside the block edge.
const BLOCK_INSET: f32 = 12.0;
const MIN_FOOTPRINT: f32 = 8.0;
const MAX_FOOTPRINT: f32 = 16.0;

pub fn landmarks() -> impl Iterator<Item = &'static Landmark> {
    RESTAURANTS.iter().chain(CUSTOMERS.iter())
}

pub fn is_near_landmark(x: f32, z: f32, margin: f32) -> bool {
    let point = Position::new(x, z);
    landmarks().any(|landmark| landmark.position.distance_to(&point) < margin)
}

pub fn is_on_street(x: f32, z: f32) -> bool {
    let reach = STREET_WIDTH / 2.0 + STREET_CLEARANCE;
    STREET_INDICES.into_iter().any(|i| {
        let street = i as f32 * GRID_SPACING;
        (x - street).abs() < reach || (z - street).abs() < reach
    })
}

/// Scatters at most one building per city block, away from streets and
/// landmarks. Each block is built on with `config.building_chance`.
pub fn generate_buildings<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> Vec<Building> {
    let max_offset = BLOCK_SIZE / 2.0 - BLOCK_INSET;
    let chance = config.building_chance.clamp(0.0, 1.0);
    let mut buildings = Vec::new();

    for bx in -2..2 {
        for bz in -2..2 {
            if !rng.gen_bool(chance) {
                continue;
            }

            let center_x = bx as f32 * GRID_SPACING + GRID_SPACING / 2.0;
            let center_z = bz as f32 * GRID_SPACING + GRID_SPACING / 2.0;
            let x = center_x + rng.gen_range(-max_offset..max_offset);
            let z = center_z + rng.gen_range(-max_offset..max_offset);

            if is_near_landmark(x, z, LANDMARK_CLEARANCE) || is_on_street(x, z) {
                continue;
            }

            buildings.push(Building {
                x,
                z,
                width: rng.gen_range(MIN_FOOTPRINT..MAX_FOOTPRINT),
                depth: rng.gen_range(MIN_FOOTPRINT..MAX_FOOTPRINT),
            });
        }
    }

    buildings
}

/// Everything static the rules need to know about the world.
#[derive(Clone, Debug, Default)]
pub struct City {
    pub buildings: Vec<Building>,
}

impl City {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> Self {
        Self {
            buildings: generate_buildings(rng, config),
        }
    }

    /// A city without buildings.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn restaurants(&self) -> &'static [Landmark] {
        &RESTAURANTS
    }

    pub fn customers(&self) -> &'static [Landmark] {
        &CUSTOMERS
    }

    pub fn restaurant(&self, name: &str) -> Option<&'static Landmark> {
        RESTAURANTS.iter().find(|r| r.name == name)
    }

    pub fn customer(&self, name: &str) -> Option<&'static Landmark> {
        CUSTOMERS.iter().find(|c| c.name == name)
    }
}
