//! Emberfall — Combat & Turn-Loop bounded context.
//!
//! The domain layer owns the battle aggregate, immutable combat
//! snapshots, the action-resolution pipeline, and turn-order
//! computation. The application layer drives one asynchronous turn
//! loop per active battle and routes player input into it.

pub mod application;
pub mod domain;

#[cfg(test)]
pub(crate) mod testing;
