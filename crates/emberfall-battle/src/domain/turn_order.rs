//! Initiative ordering.
//!
//! Turn order is a pure function of the living participant set and the
//! injected RNG: descending by effective speed, then priority (players
//! act before monsters at equal speed), then a random tiebreak. The
//! random component is last-resort only and sits behind
//! `DeterministicRng` so tests can pin it.

use std::collections::HashMap;

use emberfall_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::combat_state::{CombatState, ParticipantKey, ParticipantType};

/// One slot in the initiative sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnEntry {
    /// The participant acting in this slot.
    pub key: ParticipantKey,
    /// Effective speed at the time the order was computed.
    pub speed: u32,
    /// Tiebreak priority; players outrank monsters.
    pub priority: u8,
}

/// Computes and recomputes initiative ordering.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurnOrderService;

impl TurnOrderService {
    /// Priority assigned per participant type at equal speed.
    fn priority_of(participant_type: ParticipantType) -> u8 {
        match participant_type {
            ParticipantType::Player => 1,
            ParticipantType::Monster => 0,
        }
    }

    /// Computes the initial turn order from all living participants.
    #[must_use]
    pub fn calculate_initial_turn_order(
        participants: &HashMap<ParticipantKey, CombatState>,
        rng: &mut dyn DeterministicRng,
    ) -> Vec<TurnEntry> {
        Self::order(participants.values().filter(|s| s.is_alive()), rng)
    }

    /// Recomputes the turn order at a round boundary: participants that
    /// died during the previous round are dropped, participants that
    /// joined mid-round are slotted in, and the whole order is re-sorted
    /// against current effective speeds.
    #[must_use]
    pub fn recalculate_turn_order_for_next_round(
        participants: &HashMap<ParticipantKey, CombatState>,
        previous_order: &[TurnEntry],
        rng: &mut dyn DeterministicRng,
    ) -> Vec<TurnEntry> {
        let known: std::collections::HashSet<ParticipantKey> =
            previous_order.iter().map(|entry| entry.key).collect();
        let survivors = previous_order
            .iter()
            .filter_map(|entry| participants.get(&entry.key))
            .filter(|state| state.is_alive());
        let joiners = participants
            .values()
            .filter(|state| state.is_alive() && !known.contains(&state.key()));
        Self::order(survivors.chain(joiners), rng)
    }

    /// Returns the entry at `index`, or `None` past the end of the round.
    #[must_use]
    pub fn get_next_actor(order: &[TurnEntry], index: usize) -> Option<&TurnEntry> {
        order.get(index)
    }

    fn order<'a>(
        states: impl Iterator<Item = &'a CombatState>,
        rng: &mut dyn DeterministicRng,
    ) -> Vec<TurnEntry> {
        let mut keyed: Vec<(TurnEntry, f64)> = states
            .map(|state| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let speed = state.calculate_current_speed().round() as u32;
                let entry = TurnEntry {
                    key: state.key(),
                    speed,
                    priority: Self::priority_of(state.participant_type),
                };
                (entry, rng.next_f64())
            })
            .collect();

        keyed.sort_by(|(a, ra), (b, rb)| {
            b.speed
                .cmp(&a.speed)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| rb.partial_cmp(ra).unwrap_or(std::cmp::Ordering::Equal))
        });

        keyed.into_iter().map(|(entry, _)| entry).collect()
    }
}
