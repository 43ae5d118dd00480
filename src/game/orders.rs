//! Food orders: who to pick up from, who to deliver to, and what it pays.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::game::city::{City, Landmark};
use crate::game::collision::within_radius;
use crate::game::config::GameConfig;
use crate::game::geometry::Position;

/// One pickup / drop-off pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    pub restaurant: &'static Landmark,
    pub customer: &'static Landmark,
}

impl Order {
    /// Picks one of the city's restaurants and customers uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, city: &City) -> Self {
        let restaurants = city.restaurants();
        let customers = city.customers();
        Self {
            restaurant: restaurants.choose(rng).unwrap_or(&restaurants[0]),
            customer: customers.choose(rng).unwrap_or(&customers[0]),
        }
    }
}

/// `base` plus a whole bonus in `[0, max_bonus)`.
pub fn roll_reward<R: Rng + ?Sized>(rng: &mut R, base: i32, max_bonus: i32) -> i32 {
    if max_bonus <= 0 {
        return base;
    }
    base + rng.gen_range(0..max_bonus)
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    PickedUp { restaurant: &'static Landmark },
    Delivered { customer: &'static Landmark, reward: i32 },
}

/// Order progress and earnings of a single-player courier.
#[derive(Clone, Debug, Default)]
pub struct Courier {
    pub order: Option<Order>,
    pub has_food: bool,
    pub score: i32,
    pub deliveries: u32,
}

impl Courier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn assign<R: Rng + ?Sized>(&mut self, rng: &mut R, city: &City) -> &Order {
        self.has_food = false;
        self.order.insert(Order::random(rng, city))
    }

    /// Where the courier should head next, if it has an order.
    pub fn target(&self) -> Option<&'static Landmark> {
        let order = self.order.as_ref()?;
        Some(if self.has_food {
            order.customer
        } else {
            order.restaurant
        })
    }

    /// Picks up or delivers when `position` is within the pickup radius of
    /// the current target. A delivery rolls the reward and immediately assigns
    /// a new order from `city`.
    pub fn check<R: Rng + ?Sized>(
        &mut self,
        position: &Position,
        config: &GameConfig,
        city: &City,
        rng: &mut R,
    ) -> Option<OrderEvent> {
        let order = self.order.as_ref()?;
        let radius = config.pickup_radius;

        if !self.has_food {
            if within_radius(position, &order.restaurant.position, radius) {
                self.has_food = true;
                return Some(OrderEvent::PickedUp {
                    restaurant: order.restaurant,
                });
            }
            return None;
        }

        if !within_radius(position, &order.customer.position, radius) {
            return None;
        }

        let customer = order.customer;
        let reward = roll_reward(rng, config.delivery_base_reward, config.delivery_max_bonus);
        self.score += reward;
        self.deliveries += 1;
        self.assign(rng, city);

        Some(OrderEvent::Delivered { customer, reward })
    }
}
