//! Axum HTTP surface for the Emberfall battle engine.

pub mod error;
pub mod routes;
pub mod state;
