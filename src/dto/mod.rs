//! JSON bodies returned by the REST routes.

pub mod api;
