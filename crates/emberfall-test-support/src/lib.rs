//! Shared test mocks and utilities for the Emberfall battle engine.

mod clock;
mod notifier;
mod rng;

pub use clock::FixedClock;
pub use notifier::RecordingNotifier;
pub use rng::{MockRng, RollSequenceRng, SequenceRng};
