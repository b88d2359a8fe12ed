use std::fmt;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use reverie_engine::{Choice, Identity, Scene, TraitKind};
use serde::{Deserialize, Serialize};

/// What the automated dreamer does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Choose(String),
    DeeperDream,
    SearchArtifact,
    UsePower(String),
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PlayerAction,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: PlayerAction, rationale: Option<String>) -> Self {
        Self { action, rationale }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide the next action for the current scene.
    fn decide(&mut self, identity: &Identity, scene: &Scene) -> PolicyDecision;
}

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Balanced,
    Kind,
    Cruel,
    Chaotic,
    Random,
}

impl Strategy {
    pub const ALL: [Self; 5] = [
        Self::Balanced,
        Self::Kind,
        Self::Cruel,
        Self::Chaotic,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Kind => "Kind",
            Self::Cruel => "Cruel",
            Self::Chaotic => "Chaotic",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Kind => Box::new(KindPolicy),
            Self::Cruel => Box::new(CruelPolicy),
            Self::Chaotic => Box::new(ChaoticPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct BalancedPolicy;
struct KindPolicy;
struct CruelPolicy;
struct ChaoticPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn delta(choice: &Choice, kind: TraitKind) -> i32 {
    choice.traits.get(&kind).copied().unwrap_or(0)
}

/// Highest-scoring available choice; falls back to the first listed choice so
/// a fully gated scene still yields an attempt.
fn best_choice(scene: &Scene, score: impl Fn(&Choice) -> i32) -> PolicyDecision {
    let best = scene
        .available_choices()
        .map(|presented| (presented.id(), score(&presented.choice)))
        .max_by_key(|(_, score)| *score);
    match best {
        Some((id, score)) => PolicyDecision::new(
            PlayerAction::Choose(id.to_string()),
            Some(format!("score {score}")),
        ),
        None => PolicyDecision::new(
            PlayerAction::Choose(
                scene
                    .choices
                    .first()
                    .map(|choice| choice.id().to_string())
                    .unwrap_or_default(),
            ),
            Some("no available choice".to_string()),
        ),
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn decide(&mut self, identity: &Identity, scene: &Scene) -> PolicyDecision {
        if identity.coherence < 40.0 && identity.has_power("true_naming") {
            return PolicyDecision::new(
                PlayerAction::UsePower("true_naming".to_string()),
                Some("recover coherence".to_string()),
            );
        }
        if identity.coherence < 40.0 {
            return PolicyDecision::new(
                PlayerAction::SearchArtifact,
                Some("low coherence".to_string()),
            );
        }
        best_choice(scene, |choice| {
            let mut traits = identity.traits;
            traits.apply(&choice.traits);
            -traits.iter().map(|(_, value)| (value - 50).abs()).sum::<i32>()
                - (identity.karma + choice.effects.karma).abs()
        })
    }
}

impl PlayerPolicy for KindPolicy {
    fn name(&self) -> &'static str {
        "Kind"
    }

    fn decide(&mut self, _identity: &Identity, scene: &Scene) -> PolicyDecision {
        best_choice(scene, |choice| {
            choice.effects.karma + delta(choice, TraitKind::Kind)
                - delta(choice, TraitKind::Cruel)
                + i32::try_from(choice.effects.companions.len()).unwrap_or(0) * 10
        })
    }
}

impl PlayerPolicy for CruelPolicy {
    fn name(&self) -> &'static str {
        "Cruel"
    }

    fn decide(&mut self, _identity: &Identity, scene: &Scene) -> PolicyDecision {
        best_choice(scene, |choice| {
            delta(choice, TraitKind::Cruel) - delta(choice, TraitKind::Kind) - choice.effects.karma
        })
    }
}

impl PlayerPolicy for ChaoticPolicy {
    fn name(&self) -> &'static str {
        "Chaotic"
    }

    fn decide(&mut self, identity: &Identity, scene: &Scene) -> PolicyDecision {
        if identity.coherence > 60.0 && identity.dream_depth < 9 {
            return PolicyDecision::new(PlayerAction::DeeperDream, Some("dive".to_string()));
        }
        best_choice(scene, |choice| {
            let effects = &choice.effects;
            delta(choice, TraitKind::Chaotic) - delta(choice, TraitKind::Orderly)
                + if effects.quantum_effect.is_some() { 25 } else { 0 }
                + if effects.fragment_self { 20 } else { 0 }
                + if effects.temporal_loop { 15 } else { 0 }
        })
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&mut self, identity: &Identity, scene: &Scene) -> PolicyDecision {
        let roll = self.rng.gen_range(0..10);
        if roll == 0 && identity.dream_depth < 10 {
            return PolicyDecision::new(PlayerAction::DeeperDream, None);
        }
        if roll == 1 {
            return PolicyDecision::new(PlayerAction::SearchArtifact, None);
        }
        if roll == 2 && !identity.dream_powers.is_empty() {
            let idx = self.rng.gen_range(0..identity.dream_powers.len());
            return PolicyDecision::new(
                PlayerAction::UsePower(identity.dream_powers[idx].clone()),
                None,
            );
        }
        let available: Vec<&str> = scene.available_choices().map(|c| c.id()).collect();
        if available.is_empty() {
            return best_choice(scene, |_| 0);
        }
        let idx = self.rng.gen_range(0..available.len());
        PolicyDecision::new(PlayerAction::Choose(available[idx].to_string()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_engine::{SceneChoice, SceneKind, TraitDeltas};

    fn choice(id: &str, traits: TraitDeltas, karma: i32, available: bool) -> SceneChoice {
        let mut choice: Choice = serde_json::from_value(serde_json::json!({
            "text": id,
            "memory": id,
        }))
        .unwrap();
        choice.traits = traits;
        choice.effects.karma = karma;
        SceneChoice { choice, available }
    }

    fn scene() -> Scene {
        Scene {
            id: "test".to_string(),
            kind: SceneKind::Catalog,
            description: String::new(),
            choices: vec![
                choice("helped", TraitDeltas::from([(TraitKind::Kind, 20)]), 20, true),
                choice("hurt", TraitDeltas::from([(TraitKind::Cruel, 25)]), -30, true),
                choice("locked", TraitDeltas::from([(TraitKind::Kind, 90)]), 90, false),
            ],
        }
    }

    #[test]
    fn kind_and_cruel_pick_opposites() {
        let identity = Identity::new();
        let kind = Strategy::Kind.create_policy(1).decide(&identity, &scene());
        assert_eq!(kind.action, PlayerAction::Choose("helped".to_string()));
        let cruel = Strategy::Cruel.create_policy(1).decide(&identity, &scene());
        assert_eq!(cruel.action, PlayerAction::Choose("hurt".to_string()));
    }

    #[test]
    fn balanced_searches_when_coherence_is_low() {
        let mut identity = Identity::new();
        identity.coherence = 20.0;
        let decision = Strategy::Balanced.create_policy(1).decide(&identity, &scene());
        assert_eq!(decision.action, PlayerAction::SearchArtifact);
    }

    #[test]
    fn chaotic_dives_while_coherent() {
        let identity = Identity::new();
        let decision = Strategy::Chaotic.create_policy(1).decide(&identity, &scene());
        assert_eq!(decision.action, PlayerAction::DeeperDream);
    }

    #[test]
    fn random_policy_never_picks_locked_choices() {
        let identity = Identity::new();
        let mut policy = Strategy::Random.create_policy(9);
        for _ in 0..50 {
            if let PlayerAction::Choose(id) = policy.decide(&identity, &scene()).action {
                assert_ne!(id, "locked");
            }
        }
    }
}
