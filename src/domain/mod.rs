//! Domain aggregates exposed by the Food Rush service layer.

pub mod auth_session;
pub mod round;
pub mod types;
pub mod user;
