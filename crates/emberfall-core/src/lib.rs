//! Emberfall Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the battle
//! engine and its infrastructure depend on. It contains no game rules
//! and no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod notifier;
pub mod rng;
