//! Database rows and configuration models.

pub mod auth_session;
pub mod config;
pub mod round;
pub mod user;
