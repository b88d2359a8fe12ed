//! Ending evaluation.
use crate::constants::{
    DREAM_DEPTH_MAX, DREAM_FAMILY_COMPANIONS, DREAM_FAMILY_KARMA, ENLIGHTENED_ARTIFACTS,
    ENLIGHTENED_COHERENCE, ENLIGHTENED_KARMA, ETERNAL_RETURN_LOOPS, KARMA_MIN,
    QUANTUM_ENDING_FORKS, SHATTERED_ENDING_FRAGMENTS, STAT_MIN, VOID_MERGED_WHISPERS,
};
use crate::identity::{Identity, QuantumState};
use serde::{Deserialize, Serialize};

/// Possible ways a dream can end, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingKind {
    /// Coherence and consciousness both gone
    Oblivion,
    Enlightened,
    Quantum,
    Shattered,
    /// Reached the deepest dream layer
    Abyss,
    NightmareLord,
    VoidMerged,
    DreamFamily,
    EternalReturn,
    /// Coherence gone while awareness lingers
    Forgotten,
}

impl EndingKind {
    pub const ALL: [Self; 10] = [
        Self::Oblivion,
        Self::Enlightened,
        Self::Quantum,
        Self::Shattered,
        Self::Abyss,
        Self::NightmareLord,
        Self::VoidMerged,
        Self::DreamFamily,
        Self::EternalReturn,
        Self::Forgotten,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Oblivion => "oblivion",
            Self::Enlightened => "enlightened",
            Self::Quantum => "quantum",
            Self::Shattered => "shattered",
            Self::Abyss => "abyss",
            Self::NightmareLord => "nightmare_lord",
            Self::VoidMerged => "void_merged",
            Self::DreamFamily => "dream_family",
            Self::EternalReturn => "eternal_return",
            Self::Forgotten => "forgotten",
        }
    }

    /// Whether this ending's condition holds for the given state.
    #[must_use]
    pub fn is_met(self, identity: &Identity, quantum_forks: usize) -> bool {
        match self {
            Self::Oblivion => {
                identity.coherence <= STAT_MIN && identity.consciousness <= STAT_MIN
            }
            Self::Enlightened => {
                identity.coherence >= ENLIGHTENED_COHERENCE
                    && identity.artifacts.len() >= ENLIGHTENED_ARTIFACTS
                    && identity.karma > ENLIGHTENED_KARMA
            }
            Self::Quantum => {
                identity.quantum_state == QuantumState::Superposition
                    && quantum_forks > QUANTUM_ENDING_FORKS
            }
            Self::Shattered => identity.fragmented_self.len() >= SHATTERED_ENDING_FRAGMENTS,
            Self::Abyss => identity.dream_depth >= DREAM_DEPTH_MAX,
            Self::NightmareLord => identity.karma <= KARMA_MIN,
            Self::VoidMerged => identity.void_whispers.len() > VOID_MERGED_WHISPERS,
            Self::DreamFamily => {
                identity.dream_companions.len() >= DREAM_FAMILY_COMPANIONS
                    && identity.karma > DREAM_FAMILY_KARMA
            }
            Self::EternalReturn => identity.temporal_loops > ETERNAL_RETURN_LOOPS,
            Self::Forgotten => identity.coherence <= STAT_MIN,
        }
    }

    #[must_use]
    pub fn ending(self) -> Ending {
        let (title, description, can_restart, special, unlock) = match self {
            Self::Oblivion => (
                "TOTAL OBLIVION",
                "You have ceased to exist in any form. Even the dream cannot remember you.",
                true,
                false,
                None,
            ),
            Self::Enlightened => (
                "DREAM ENLIGHTENMENT",
                "You have transcended the dream while maintaining your true self. You are awake within sleep.",
                false,
                true,
                Some("enlightened_start"),
            ),
            Self::Quantum => (
                "QUANTUM EXISTENCE",
                "You exist in all states simultaneously. Every choice and its opposite are equally you.",
                true,
                true,
                Some("quantum_start"),
            ),
            Self::Shattered => (
                "INFINITE FRACTURE",
                "You have become a constellation of selves, each star a different you.",
                true,
                false,
                Some("fractal_mode"),
            ),
            Self::Abyss => (
                "DREAM ABYSS",
                "You have descended beyond all boundaries. Here, at the bottom of consciousness, you find...",
                true,
                true,
                Some("abyss_knowledge"),
            ),
            Self::NightmareLord => (
                "NIGHTMARE INCARNATE",
                "You have become the terror that haunts all dreams. The darkness bows to you.",
                true,
                false,
                Some("nightmare_powers"),
            ),
            Self::VoidMerged => (
                "ONE WITH VOID",
                "The whispers were true. You were nothing all along. And nothing is everything.",
                true,
                true,
                None,
            ),
            Self::DreamFamily => (
                "FOUND FAMILY",
                "You may have lost yourself, but you found others. Together, you create a new reality.",
                false,
                true,
                None,
            ),
            Self::EternalReturn => (
                "ETERNAL RECURSION",
                "You are the loop. The loop is you. Beginning is end is beginning is...",
                true,
                false,
                Some("loop_mastery"),
            ),
            Self::Forgotten => (
                "FORGOTTEN",
                "The dream no longer remembers you. You have become nothing.",
                true,
                false,
                None,
            ),
        };
        Ending {
            kind: self,
            title: title.to_string(),
            description: description.to_string(),
            can_restart,
            special,
            unlock: unlock.map(str::to_string),
        }
    }
}

impl std::fmt::Display for EndingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A terminal outcome. Once present the playthrough accepts no further choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    pub kind: EndingKind,
    pub title: String,
    pub description: String,
    pub can_restart: bool,
    /// Counts toward discovered secret endings.
    pub special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock: Option<String>,
}

/// First ending whose condition holds, in fixed priority order.
#[must_use]
pub fn evaluate(identity: &Identity, quantum_forks: usize) -> Option<Ending> {
    let kind = EndingKind::ALL
        .into_iter()
        .find(|kind| kind.is_met(identity, quantum_forks))?;
    log::info!("ending reached: {kind}");
    Some(kind.ending())
}
