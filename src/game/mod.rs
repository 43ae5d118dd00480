//! Headless arcade rules: city, motorcycle, orders, boosters, traffic and
//! the single-player round built from them.

pub mod boosters;
pub mod city;
pub mod collision;
pub mod config;
pub mod geometry;
pub mod interpolation;
pub mod leaderboard;
pub mod motorcycle;
pub mod orders;
pub mod session;
pub mod traffic;

pub use config::GameConfig;
pub use geometry::{Pose, Position};
pub use session::{GameSession, RoundSummary, TickEvent};
