//! Advisory events emitted alongside state changes, plus selection telemetry.
//!
//! Events never carry authority: the identity snapshot is the truth, events
//! only tell a presentation layer what just happened.

use crate::achievements::Achievement;
use crate::data::{BossId, EnvironmentOverride, GamePhase};
use serde::{Deserialize, Serialize};

/// Named narrative flags raised by resolution and side actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEvent {
    BossTrigger,
    KarmaExtreme,
    DeepDream,
    EnteredDeepDreams,
    /// Any other `special` tag carried by content.
    Tagged(String),
}

impl SpecialEvent {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "boss_trigger" => Self::BossTrigger,
            "karma_extreme" => Self::KarmaExtreme,
            "deep_dream" => Self::DeepDream,
            "entered_deep_dreams" => Self::EnteredDeepDreams,
            other => Self::Tagged(other.to_string()),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::BossTrigger => "boss_trigger",
            Self::KarmaExtreme => "karma_extreme",
            Self::DeepDream => "deep_dream",
            Self::EnteredDeepDreams => "entered_deep_dreams",
            Self::Tagged(tag) => tag,
        }
    }
}

/// Tint of a floating memory echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoColor {
    Golden,
    Crimson,
    Silver,
    White,
    Purple,
}

impl EchoColor {
    /// Echo tint for a choice's karma sign.
    #[must_use]
    pub const fn for_karma(karma: i32) -> Self {
        if karma > 0 {
            Self::Golden
        } else if karma < 0 {
            Self::Crimson
        } else {
            Self::Silver
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEcho {
    pub text: String,
    pub color: EchoColor,
    pub at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Special { event: SpecialEvent },
    EnvironmentChanged { change: EnvironmentOverride },
    TimeDistortion { factor: f32 },
    MemoryEcho { echo: MemoryEcho },
    EchoesSilenced,
    QuantumSplit,
    BossEncountered { boss: BossId },
    BossDefeated { boss: BossId },
    PhaseChanged { phase: GamePhase },
    AchievementUnlocked { achievement: Achievement },
    /// Scene filters left nothing; the first catalog entry was used.
    ContentGap,
}

/// Explainability telemetry for weighted scene selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecisionTrace {
    /// Identifier for the selection pool.
    pub pool_id: String,
    /// Unit roll that drove the linear scan.
    pub roll: f64,
    pub candidates: Vec<WeightedCandidate>,
    pub chosen_id: String,
}

/// Candidate weight telemetry captured during selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCandidate {
    pub id: String,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_tags_round_trip_through_keys() {
        for tag in ["boss_trigger", "karma_extreme", "deep_dream", "entered_deep_dreams", "odd"] {
            assert_eq!(SpecialEvent::from_tag(tag).key(), tag);
        }
    }

    #[test]
    fn echo_color_follows_karma_sign() {
        assert_eq!(EchoColor::for_karma(5), EchoColor::Golden);
        assert_eq!(EchoColor::for_karma(-1), EchoColor::Crimson);
        assert_eq!(EchoColor::for_karma(0), EchoColor::Silver);
    }
}
