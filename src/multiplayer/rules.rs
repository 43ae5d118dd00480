use serde::{Deserialize, Serialize};

/// Server-side gameplay limits for multiplayer rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplayerRules {
    /// Round length in seconds announced to clients.
    pub round_time: u32,
    pub city_size: f32,
    pub delivery_base_reward: i32,
    pub delivery_max_bonus: i32,
    pub pickup_radius: f32,
    /// Extra slack on top of `pickup_radius` for network lag.
    pub position_tolerance: f32,
    /// Moves closer together than this are dropped.
    pub move_throttle_ms: i64,
    /// Reported positions are kept this far inside the city edge.
    pub edge_margin: f32,
    pub leaderboard_limit: usize,
}

impl Default for MultiplayerRules {
    fn default() -> Self {
        Self {
            round_time: 180,
            city_size: 400.0,
            delivery_base_reward: 15,
            delivery_max_bonus: 10,
            pickup_radius: 4.0,
            position_tolerance: 2.0,
            move_throttle_ms: 50,
            edge_margin: 10.0,
            leaderboard_limit: 10,
        }
    }
}

impl MultiplayerRules {
    /// Largest absolute coordinate a player may report.
    pub fn position_limit(&self) -> f32 {
        self.city_size / 2.0 - self.edge_margin
    }

    /// Distance within which pickups and deliveries are accepted.
    pub fn reach(&self) -> f32 {
        self.pickup_radius + self.position_tolerance
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let limit = self.position_limit();
        value.clamp(-limit, limit)
    }
}
