//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use emberfall_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range` and `0.0`
/// for `next_f64`. Suitable for tests that do not depend on specific
/// random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns integer values from a predetermined sequence.
/// Panics if the sequence is exhausted. Used in tests that need
/// specific, repeatable integer outcomes (e.g., monster target picks).
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns `f64` rolls from a predetermined sequence and
/// falls back to `0.99` once the sequence is exhausted. Used to pin
/// hit, critical, and status-chance rolls.
#[derive(Debug)]
pub struct RollSequenceRng {
    rolls: Vec<f64>,
    index: usize,
}

impl RollSequenceRng {
    /// Create a new `RollSequenceRng` with the given rolls.
    #[must_use]
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, index: 0 }
    }
}

impl DeterministicRng for RollSequenceRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        let roll = self.rolls.get(self.index).copied().unwrap_or(0.99);
        self.index += 1;
        roll
    }
}
