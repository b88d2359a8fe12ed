//! Idempotent achievement evaluation.

use crate::constants::{
    COLLECTOR_ARTIFACTS, DEEP_DREAMER_DEPTH, DREAM_MASTER_POWERS, KARMA_MAX, KARMA_MIN,
    SHATTERED_FRAGMENTS,
};
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    Collector,
    Saint,
    Nightmare,
    DeepDreamer,
    Shattered,
    DreamMaster,
    PerfectBalance,
}

impl Achievement {
    pub const ALL: [Self; 7] = [
        Self::Collector,
        Self::Saint,
        Self::Nightmare,
        Self::DeepDreamer,
        Self::Shattered,
        Self::DreamMaster,
        Self::PerfectBalance,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Collector => "collector",
            Self::Saint => "saint",
            Self::Nightmare => "nightmare",
            Self::DeepDreamer => "deep_dreamer",
            Self::Shattered => "shattered",
            Self::DreamMaster => "dream_master",
            Self::PerfectBalance => "perfect_balance",
        }
    }

    /// Whether the identity currently satisfies this achievement's condition.
    #[must_use]
    pub fn is_met(self, identity: &Identity) -> bool {
        match self {
            Self::Collector => identity.artifacts.len() >= COLLECTOR_ARTIFACTS,
            Self::Saint => identity.karma >= KARMA_MAX,
            Self::Nightmare => identity.karma <= KARMA_MIN,
            Self::DeepDreamer => identity.dream_depth >= DEEP_DREAMER_DEPTH,
            Self::Shattered => identity.fragmented_self.len() >= SHATTERED_FRAGMENTS,
            Self::DreamMaster => identity.dream_powers.len() >= DREAM_MASTER_POWERS,
            Self::PerfectBalance => identity.traits.is_balanced(),
        }
    }
}

/// Unlock every newly satisfied achievement, returning only the fresh ones.
pub fn award(identity: &mut Identity) -> Vec<Achievement> {
    let mut unlocked = Vec::new();
    for achievement in Achievement::ALL {
        if achievement.is_met(identity) && identity.unlock(achievement) {
            log::debug!("achievement unlocked: {}", achievement.key());
            unlocked.push(achievement);
        }
    }
    unlocked
}
