//! Passive identity decay applied on a fixed cadence while a dream is running.

use crate::constants::{
    DEGRADATION_ANCHOR_FACTOR, DEGRADATION_ARTIFACT_RELIEF, DEGRADATION_BASE,
    DEGRADATION_COMPANION_RELIEF, DEGRADATION_CONSCIOUSNESS_FACTOR,
    DEGRADATION_KARMA_PRESSURE, DEGRADATION_KARMA_PRESSURE_THRESHOLD, DEGRADATION_PER_DEPTH,
    DEGRADATION_SUPERPOSITION_COHERENCE, DEGRADATION_SUPERPOSITION_ROLL,
    DEGRADATION_UNSTABLE_COHERENCE, DEGRADATION_UNSTABLE_PRESSURE, DEGRADATION_UNSTABLE_ROLL,
    STAT_MAX,
};
use crate::identity::{Identity, QuantumState};
use crate::numbers::len_to_f32;
use crate::rng::{RandomSource, RollStream};
use serde::{Deserialize, Serialize};

/// Summary of a single degradation tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationTick {
    /// Coherence lost this tick; negative when artifacts and companions
    /// outweigh the pressure.
    pub total: f32,
    pub coherence: f32,
    pub consciousness: f32,
    pub reality_anchor: f32,
    /// Quantum state written by this tick, if any.
    pub quantum_shift: Option<QuantumState>,
}

/// Coherence lost per tick for the given identity.
#[must_use]
pub fn degradation_rate(identity: &Identity) -> f32 {
    let mut total = DEGRADATION_PER_DEPTH.mul_add(f32::from(identity.dream_depth), DEGRADATION_BASE);
    if identity.karma.abs() > DEGRADATION_KARMA_PRESSURE_THRESHOLD {
        total += DEGRADATION_KARMA_PRESSURE;
    }
    if identity.quantum_state == QuantumState::Unstable {
        total += DEGRADATION_UNSTABLE_PRESSURE;
    }
    total -= DEGRADATION_ARTIFACT_RELIEF * len_to_f32(identity.artifacts.len());
    total -= DEGRADATION_COMPANION_RELIEF * len_to_f32(identity.dream_companions.len());
    total
}

/// Apply one tick of decay in place.
///
/// The quantum rolls overwrite the state outright, so a collapsed or stable
/// dreamer under pressure can be pushed straight back into instability.
pub fn tick(identity: &mut Identity, rng: &mut dyn RandomSource) -> DegradationTick {
    let total = degradation_rate(identity);
    identity.adjust_coherence(-total);
    identity.adjust_consciousness(-total * DEGRADATION_CONSCIOUSNESS_FACTOR);
    let drift = DEGRADATION_ANCHOR_FACTOR * (1.0 - identity.consciousness / STAT_MAX);
    identity.adjust_reality_anchor(-drift);

    let mut quantum_shift = None;
    if identity.coherence < DEGRADATION_UNSTABLE_COHERENCE
        && rng.roll(RollStream::Degradation) > DEGRADATION_UNSTABLE_ROLL
    {
        quantum_shift = Some(QuantumState::Unstable);
    } else if identity.coherence < DEGRADATION_SUPERPOSITION_COHERENCE
        && rng.roll(RollStream::Degradation) > DEGRADATION_SUPERPOSITION_ROLL
    {
        quantum_shift = Some(QuantumState::Superposition);
    }
    if let Some(state) = quantum_shift {
        identity.quantum_state = state;
    }

    log::trace!(
        "degradation tick: -{total:.2} coherence -> {:.2}, consciousness {:.2}, anchor {:.2}",
        identity.coherence,
        identity.consciousness,
        identity.reality_anchor
    );

    DegradationTick {
        total,
        coherence: identity.coherence,
        consciousness: identity.consciousness,
        reality_anchor: identity.reality_anchor,
        quantum_shift,
    }
}
