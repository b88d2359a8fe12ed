//! Player side actions outside of scene choices: descending a layer,
//! searching for artifacts and invoking dream powers.

use crate::constants::{
    ARTIFACT_ANCHOR_CRISIS, ARTIFACT_ANCHOR_ROLL, ARTIFACT_CRISIS_COHERENCE, ARTIFACT_CRISIS_ROLL,
    ARTIFACT_RARE_CHANCE, ARTIFACT_RARE_CHANCE_DEEP, ARTIFACT_RARE_DEPTH,
    ARTIFACT_STRONG_COHERENCE_BOOST, DEEP_DREAM_DEPTH, DEEPER_DREAM_COHERENCE_COST,
    DEEPER_DREAM_CONSCIOUSNESS_COST, DREAM_DEPTH_MAX, NECROMANCY_STRENGTH, NECROMANCY_WINDOW,
    TIMELINE_SIGHT_CONSCIOUSNESS, TRUE_NAMING_COHERENCE, UNDEAD_MEMORY_PREFIX,
};
use crate::error::InvalidState;
use crate::identity::{Artifact, Identity};
use crate::narrator::true_name;
use crate::numbers::{i32_to_f32, unit_to_index};
use crate::rng::{RandomSource, RollStream};
use serde::{Deserialize, Serialize};

/// Result of descending one dream layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descent {
    pub depth: u8,
    /// This descent crossed into the deep dreams.
    pub entered_deep: bool,
}

/// Descend one layer: depth +1, coherence -15, consciousness -10.
///
/// # Errors
///
/// Returns [`InvalidState::MaxDepth`] at the deepest layer without touching
/// the identity.
pub fn descend(identity: &mut Identity) -> Result<Descent, InvalidState> {
    if identity.dream_depth >= DREAM_DEPTH_MAX {
        return Err(InvalidState::MaxDepth);
    }
    let depth = identity.shift_depth(1);
    identity.adjust_coherence(-DEEPER_DREAM_COHERENCE_COST);
    identity.adjust_consciousness(-DEEPER_DREAM_CONSCIOUSNESS_COST);
    log::debug!("descended to depth {depth}");
    Ok(Descent {
        depth,
        entered_deep: depth == DEEP_DREAM_DEPTH,
    })
}

/// An artifact pulled from the search table and already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFind {
    pub artifact: Artifact,
    pub message: String,
}

fn pick_artifact<'a>(
    table: &'a [Artifact],
    identity: &Identity,
    rng: &mut dyn RandomSource,
) -> Option<&'a Artifact> {
    let first = table.first()?;
    if identity.coherence < ARTIFACT_CRISIS_COHERENCE
        && rng.roll(RollStream::Artifact) > ARTIFACT_CRISIS_ROLL
    {
        return Some(
            table
                .iter()
                .find(|a| a.coherence_boost > ARTIFACT_STRONG_COHERENCE_BOOST)
                .unwrap_or(first),
        );
    }
    if identity.reality_anchor < ARTIFACT_ANCHOR_CRISIS
        && rng.roll(RollStream::Artifact) > ARTIFACT_ANCHOR_ROLL
    {
        return Some(
            table
                .iter()
                .find(|a| a.reality_anchor_boost > 0)
                .unwrap_or(first),
        );
    }

    let rare_chance = if identity.dream_depth > ARTIFACT_RARE_DEPTH {
        ARTIFACT_RARE_CHANCE_DEEP
    } else {
        ARTIFACT_RARE_CHANCE
    };
    if rng.roll(RollStream::Artifact) < rare_chance {
        let rare: Vec<&Artifact> = table.iter().filter(|a| a.rare).collect();
        if let Some(idx) = unit_to_index(rng.roll(RollStream::Artifact), rare.len()) {
            return rare.get(idx).copied();
        }
    }
    let idx = unit_to_index(rng.roll(RollStream::Artifact), table.len())?;
    table.get(idx)
}

/// Search the artifact table, favouring whatever the dreamer lacks most, and
/// apply the find. Returns `None` only for an empty table.
pub fn search_artifact(
    table: &[Artifact],
    identity: &mut Identity,
    rng: &mut dyn RandomSource,
) -> Option<ArtifactFind> {
    let artifact = pick_artifact(table, identity, rng)?.clone();

    identity.adjust_coherence(i32_to_f32(artifact.coherence_boost));
    identity.adjust_reality_anchor(i32_to_f32(artifact.reality_anchor_boost));
    identity.adjust_consciousness(i32_to_f32(artifact.consciousness_boost));
    if artifact.karma_balance {
        identity.karma = identity.karma.div_euclid(2);
    }
    identity.artifacts.push(artifact.clone());

    let mut message = format!("You found: {}. {}", artifact.name, artifact.description);
    if artifact.rare {
        message.push_str(" (RARE)");
    }
    log::debug!(
        "artifact search found `{}` (rare: {})",
        artifact.name,
        artifact.rare
    );
    Some(ArtifactFind { artifact, message })
}

/// Dream powers with an active use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DreamPower {
    TimelineSight,
    TrueNaming,
    EchoMastery,
    MemoryNecromancy,
}

impl DreamPower {
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "timeline_sight" => Some(Self::TimelineSight),
            "true_naming" => Some(Self::TrueNaming),
            "echo_mastery" => Some(Self::EchoMastery),
            "memory_necromancy" => Some(Self::MemoryNecromancy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowerOutcome {
    pub message: Option<String>,
    /// Memory echoes should be cleared.
    pub silence_echoes: bool,
}

/// Invoke an owned power.
///
/// Owned powers without an active use succeed quietly.
///
/// # Errors
///
/// Returns [`InvalidState::UnownedPower`] when the dreamer does not hold
/// `power`.
pub fn use_power(
    identity: &mut Identity,
    power: &str,
    rng: &mut dyn RandomSource,
) -> Result<PowerOutcome, InvalidState> {
    if !identity.has_power(power) {
        return Err(InvalidState::UnownedPower(power.to_string()));
    }
    let Some(active) = DreamPower::from_key(power) else {
        return Ok(PowerOutcome::default());
    };
    log::debug!("power used: {power}");

    let outcome = match active {
        DreamPower::TimelineSight => {
            identity.adjust_consciousness(TIMELINE_SIGHT_CONSCIOUSNESS);
            PowerOutcome {
                message: Some(
                    "You glimpse parallel timelines. In one, you never started dreaming. \
                     In another, you became the dream itself."
                        .to_string(),
                ),
                silence_echoes: false,
            }
        }
        DreamPower::TrueNaming => {
            let name = true_name(identity, rng);
            identity.adjust_coherence(TRUE_NAMING_COHERENCE);
            PowerOutcome {
                message: Some(format!(
                    "You speak your true name: \"{name}\". Reality solidifies around you."
                )),
                silence_echoes: false,
            }
        }
        DreamPower::EchoMastery => PowerOutcome {
            message: Some(
                "You conduct the symphony of echoes into silence. Peace, at last.".to_string(),
            ),
            silence_echoes: true,
        },
        DreamPower::MemoryNecromancy => {
            let window = identity.memories.len().min(NECROMANCY_WINDOW);
            let revived = unit_to_index(rng.roll(RollStream::Flavor), window)
                .and_then(|idx| identity.memories.get(idx))
                .cloned();
            let message = revived.map(|mut memory| {
                let message = format!(
                    "You resurrect a dead memory: \"{}\". It shambles back to life, changed.",
                    memory.id
                );
                memory.id = format!("{UNDEAD_MEMORY_PREFIX}{}", memory.id);
                memory.strength = NECROMANCY_STRENGTH;
                identity.push_memory(memory);
                message
            });
            PowerOutcome {
                message,
                silence_echoes: false,
            }
        }
    };
    Ok(outcome)
}
