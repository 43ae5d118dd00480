//! A single-player round: drive, pick up, deliver, beat the clock.

use rand::Rng;
use serde::Serialize;

use crate::game::boosters::BoosterField;
use crate::game::city::{City, Landmark};
use crate::game::config::GameConfig;
use crate::game::motorcycle::{Controls, Motorcycle, StepOutcome};
use crate::game::orders::{Courier, OrderEvent};
use crate::game::traffic::Traffic;

/// Totals reported when the timer runs out.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub score: i32,
    pub deliveries: u32,
    pub distance_km: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickEvent {
    PickedUp { restaurant: &'static Landmark },
    Delivered { customer: &'static Landmark, reward: i32 },
    Boosted,
    Ended(RoundSummary),
}

pub fn distance_km(distance: f32) -> f32 {
    (distance / 100.0).round() / 10.0
}

/// Renders whole seconds as `m:ss`.
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,
    pub city: City,
    pub bike: Motorcycle,
    pub courier: Courier,
    pub boosters: BoosterField,
    pub traffic: Traffic,
    time_left: f32,
    running: bool,
}

impl GameSession {
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        let city = City::generate(rng, &config);
        Self::with_city(config, city, rng)
    }

    pub fn with_city<R: Rng + ?Sized>(config: GameConfig, city: City, rng: &mut R) -> Self {
        let traffic = Traffic::spawn(rng, &config);
        Self {
            time_left: config.game_time,
            config,
            city,
            bike: Motorcycle::new(),
            courier: Courier::new(),
            boosters: BoosterField::new(),
            traffic,
            running: false,
        }
    }

    /// Resets the bike, the score and the clock, then issues the first order.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bike = Motorcycle::new();
        self.courier.reset();
        self.boosters.reset();
        self.time_left = self.config.game_time;
        self.courier.assign(rng, &self.city);
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_left(&self) -> f32 {
        self.time_left.max(0.0)
    }

    pub fn is_urgent(&self) -> bool {
        self.time_left() <= self.config.urgent_time
    }

    pub fn formatted_time(&self) -> String {
        format_time(self.time_left())
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.courier.score,
            deliveries: self.courier.deliveries,
            distance_km: distance_km(self.bike.distance_traveled),
        }
    }

    /// Advances the round by `delta` seconds. Does nothing once the round
    /// has ended.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        controls: &Controls,
        delta: f32,
        now_ms: u64,
        rng: &mut R,
    ) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        let outcome = self
            .bike
            .step(controls, delta, &self.city.buildings, &self.config);
        if outcome != StepOutcome::Moved {
            log::debug!("bike blocked: {outcome:?}");
        }

        self.traffic.update(delta, &self.config);

        self.boosters.update(&mut self.bike, now_ms);
        if self.boosters.collect(&mut self.bike, now_ms) > 0 {
            events.push(TickEvent::Boosted);
        }

        let order_event = self
            .courier
            .check(&self.bike.position, &self.config, &self.city, rng);
        match order_event {
            Some(OrderEvent::PickedUp { restaurant }) => {
                events.push(TickEvent::PickedUp { restaurant });
            }
            Some(OrderEvent::Delivered { customer, reward }) => {
                events.push(TickEvent::Delivered { customer, reward });
            }
            None => {}
        }

        self.time_left -= delta;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.running = false;
            events.push(TickEvent::Ended(self.summary()));
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::geometry::Position;

    fn session(rng: &mut StdRng) -> GameSession {
        let mut session = GameSession::with_city(GameConfig::default(), City::open(), rng);
        session.start(rng);
        session
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(300.0), "5:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(9.0), "0:09");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn distance_rounds_to_a_tenth_of_a_km() {
        assert_eq!(distance_km(0.0), 0.0);
        assert_eq!(distance_km(1234.0), 1.2);
        assert_eq!(distance_km(1260.0), 1.3);
    }

    #[test]
    fn start_resets_everything() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = session(&mut rng);
        session.bike.position = Position::new(50.0, 0.0);
        session.bike.speed = 12.0;
        session.bike.distance_traveled = 900.0;
        session.courier.score = 40;

        session.start(&mut rng);
        assert_eq!(session.bike, Motorcycle::new());
        assert_eq!(session.courier.score, 0);
        assert_eq!(session.courier.deliveries, 0);
        assert!(session.courier.order.is_some());
        assert_eq!(session.formatted_time(), "5:00");
        assert!(!session.is_urgent());
    }

    #[test]
    fn timer_runs_out_with_a_summary() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = session(&mut rng);
        session.courier.score = 42;
        session.courier.deliveries = 3;
        session.bike.distance_traveled = 2_460.0;

        let events = session.tick(&Controls::default(), 280.0, 0, &mut rng);
        assert!(events.is_empty());
        assert!(session.is_urgent());
        assert_eq!(session.formatted_time(), "0:20");

        let events = session.tick(&Controls::default(), 20.0, 0, &mut rng);
        assert_eq!(
            events,
            vec![TickEvent::Ended(RoundSummary {
                score: 42,
                deliveries: 3,
                distance_km: 2.5,
            })]
        );
        assert!(!session.is_running());
        assert!(session.tick(&Controls::default(), 1.0, 0, &mut rng).is_empty());
    }

    #[test]
    fn parked_on_a_restaurant_picks_up() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut session = session(&mut rng);
        let restaurant = session.courier.target().unwrap();
        session.bike.position = restaurant.position;

        let events = session.tick(&Controls::default(), 0.016, 0, &mut rng);
        assert!(events.contains(&TickEvent::PickedUp { restaurant }));
        assert!(session.courier.has_food);
    }

    #[test]
    fn riding_over_a_pad_boosts() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut session = session(&mut rng);
        session.bike.position = Position::new(80.0, 40.0);

        let events = session.tick(&Controls::default(), 0.0, 100, &mut rng);
        assert!(events.contains(&TickEvent::Boosted));
        assert_eq!(session.bike.speed_boost, 15.0);
    }
}
