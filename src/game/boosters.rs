//! Fire booster pads that temporarily raise the speed cap.

use crate::game::collision::within_radius;
use crate::game::geometry::Position;
use crate::game::motorcycle::Motorcycle;

pub const BOOST_AMOUNT: f32 = 15.0;
pub const BOOST_DURATION_MS: u64 = 3_000;
pub const RESPAWN_MS: u64 = 10_000;
pub const PICKUP_RADIUS: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreetDirection {
    Horizontal,
    Vertical,
}

/// Pads sit on street segments between intersections.
pub const BOOSTER_SPOTS: [(f32, f32, StreetDirection); 5] = [
    (-120.0, 0.0, StreetDirection::Horizontal),
    (120.0, 80.0, StreetDirection::Horizontal),
    (-40.0, -80.0, StreetDirection::Horizontal),
    (0.0, -120.0, StreetDirection::Vertical),
    (80.0, 40.0, StreetDirection::Vertical),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Booster {
    pub position: Position,
    pub direction: StreetDirection,
    /// `None` while the pad is available.
    pub respawn_at: Option<u64>,
}

impl Booster {
    pub fn is_active(&self) -> bool {
        self.respawn_at.is_none()
    }
}

/// All pads plus the currently running boost.
#[derive(Clone, Debug)]
pub struct BoosterField {
    pub boosters: Vec<Booster>,
    boost_ends_at: Option<u64>,
}

impl Default for BoosterField {
    fn default() -> Self {
        Self::new()
    }
}

impl BoosterField {
    pub fn new() -> Self {
        let boosters = BOOSTER_SPOTS
            .iter()
            .map(|&(x, z, direction)| Booster {
                position: Position::new(x, z),
                direction,
                respawn_at: None,
            })
            .collect();

        Self {
            boosters,
            boost_ends_at: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn boost_active(&self) -> bool {
        self.boost_ends_at.is_some()
    }

    /// Respawns used pads and ends an expired boost. `now_ms` is a monotonic
    /// millisecond clock.
    pub fn update(&mut self, bike: &mut Motorcycle, now_ms: u64) {
        for booster in &mut self.boosters {
            if booster.respawn_at.is_some_and(|at| now_ms >= at) {
                booster.respawn_at = None;
            }
        }

        if self.boost_ends_at.is_some_and(|end| now_ms >= end) {
            self.boost_ends_at = None;
            bike.speed_boost = 0.0;
        }
    }

    /// Activates every available pad under the bike. Returns how many fired.
    pub fn collect(&mut self, bike: &mut Motorcycle, now_ms: u64) -> usize {
        let mut fired = 0;
        for booster in &mut self.boosters {
            if !booster.is_active() || !within_radius(&bike.position, &booster.position, PICKUP_RADIUS) {
                continue;
            }

            bike.speed_boost = BOOST_AMOUNT;
            bike.speed += BOOST_AMOUNT;
            self.boost_ends_at = Some(now_ms + BOOST_DURATION_MS);
            booster.respawn_at = Some(now_ms + RESPAWN_MS);
            fired += 1;
        }
        fired
    }
}
