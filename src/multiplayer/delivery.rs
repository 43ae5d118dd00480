//! Server-assigned deliveries with the reward fixed up front.

use rand::Rng;
use serde::Serialize;

use crate::game::city::{City, Landmark};
use crate::game::orders::{Order, roll_reward};
use crate::multiplayer::rules::MultiplayerRules;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub restaurant: &'static Landmark,
    pub customer: &'static Landmark,
    pub reward: i32,
    /// Unix milliseconds.
    pub assigned_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picked_up_at: Option<i64>,
}

impl Delivery {
    pub fn assign<R: Rng + ?Sized>(
        rng: &mut R,
        rules: &MultiplayerRules,
        city: &City,
        now_ms: i64,
    ) -> Self {
        let order = Order::random(rng, city);
        Self {
            restaurant: order.restaurant,
            customer: order.customer,
            reward: roll_reward(rng, rules.delivery_base_reward, rules.delivery_max_bonus),
            assigned_at: now_ms,
            picked_up_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn wire_shape() {
        let mut rng = StdRng::seed_from_u64(4);
        let delivery = Delivery::assign(&mut rng, &MultiplayerRules::default(), &City::open(), 1_000);
        assert!((15..25).contains(&delivery.reward));

        let json = serde_json::to_value(&delivery).unwrap();
        assert_eq!(json["assignedAt"], 1_000);
        assert!(json.get("pickedUpAt").is_none());
        assert!(json["restaurant"]["name"].is_string());
        assert!(json["customer"]["position"]["x"].is_number());
    }
}
