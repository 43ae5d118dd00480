//! Tuning constants for the arcade driving rules.

use serde::{Deserialize, Serialize};

/// Distance between parallel streets.
pub const GRID_SPACING: f32 = 80.0;
/// Width of every street.
pub const STREET_WIDTH: f32 = 20.0;
/// Size of the city block enclosed by four streets.
pub const BLOCK_SIZE: f32 = GRID_SPACING - STREET_WIDTH;
/// Streets run at `i * GRID_SPACING` for `i` in this range.
pub const STREET_INDICES: std::ops::RangeInclusive<i32> = -2..=2;

/// Name used for players that never picked one.
pub const DEFAULT_PLAYER_NAME: &str = "Entregador";

/// Gameplay parameters shared by the single-player session and its
/// subsystems. Speeds and accelerations are expressed per rendered frame,
/// positions in world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round length in seconds.
    pub game_time: f32,
    pub city_size: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub brake_power: f32,
    /// Lowest (reverse) speed reachable while braking.
    pub reverse_speed: f32,
    pub turn_speed: f32,
    pub friction: f32,
    /// Coasting speeds below this snap to zero.
    pub stop_threshold: f32,
    /// Turning only happens above this speed.
    pub min_turn_speed: f32,
    /// Speed at which turning reaches full strength.
    pub full_turn_speed: f32,
    pub joystick_turn_scale: f32,
    /// Distance kept between the bike and the city edge.
    pub driving_margin: f32,
    pub building_padding: f32,
    pub building_bounce: f32,
    pub boundary_bounce: f32,
    pub pickup_radius: f32,
    pub delivery_base_reward: i32,
    pub delivery_max_bonus: i32,
    pub traffic_cars: usize,
    /// Chance that a city block receives a building.
    pub building_chance: f64,
    /// Size of the local leaderboard.
    pub leaderboard_entries: usize,
    /// Seconds left when the timer turns urgent.
    pub urgent_time: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_time: 300.0,
            city_size: 400.0,
            max_speed: 25.0,
            acceleration: 0.08,
            brake_power: 0.15,
            reverse_speed: -15.0,
            turn_speed: 0.035,
            friction: 0.03,
            stop_threshold: 0.1,
            min_turn_speed: 1.0,
            full_turn_speed: 30.0,
            joystick_turn_scale: 0.6,
            driving_margin: 10.0,
            building_padding: 1.0,
            building_bounce: -0.3,
            boundary_bounce: -0.5,
            pickup_radius: 4.0,
            delivery_base_reward: 15,
            delivery_max_bonus: 10,
            traffic_cars: 8,
            building_chance: 0.6,
            leaderboard_entries: 10,
            urgent_time: 30.0,
        }
    }
}

impl GameConfig {
    /// Half of the city side; traffic wraps around at this coordinate.
    pub fn half_city(&self) -> f32 {
        self.city_size / 2.0
    }

    /// Largest absolute coordinate the motorcycle may reach.
    pub fn playable_half_extent(&self) -> f32 {
        self.half_city() - self.driving_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_extents() {
        let config = GameConfig::default();
        assert_eq!(config.half_city(), 200.0);
        assert_eq!(config.playable_half_extent(), 190.0);
        assert_eq!(BLOCK_SIZE, 60.0);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"max_speed": 40.0}"#).unwrap();
        assert_eq!(config.max_speed, 40.0);
        assert_eq!(config.game_time, 300.0);
    }
}
