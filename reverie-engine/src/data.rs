use crate::identity::{Artifact, Identity, TraitDeltas, TraitKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bosses that can interrupt the normal scene flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossId {
    MirrorSelf,
    VoidWhisperer,
}

impl BossId {
    pub const ALL: [Self; 2] = [Self::MirrorSelf, Self::VoidWhisperer];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MirrorSelf => "mirror_self",
            Self::VoidWhisperer => "void_whisperer",
        }
    }
}

/// Per-boss encounter bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BossStatus {
    pub encountered: bool,
    pub defeated: bool,
}

/// Encounter state for every boss seen so far this playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BossProgress {
    bosses: BTreeMap<BossId, BossStatus>,
}

impl BossProgress {
    #[must_use]
    pub fn status(&self, boss: BossId) -> BossStatus {
        self.bosses.get(&boss).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn encountered(&self, boss: BossId) -> bool {
        self.status(boss).encountered
    }

    #[must_use]
    pub fn defeated(&self, boss: BossId) -> bool {
        self.status(boss).defeated
    }

    pub fn mark_encountered(&mut self, boss: BossId) {
        self.bosses.entry(boss).or_default().encountered = true;
    }

    pub fn mark_defeated(&mut self, boss: BossId) {
        let status = self.bosses.entry(boss).or_default();
        status.encountered = true;
        status.defeated = true;
    }
}

/// Coarse narrative phase of a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Introduction,
    Middle,
    Late,
    Deep,
}

/// Phase gate on a scene template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePhase {
    #[default]
    Any,
    Introduction,
    Middle,
    Late,
    Deep,
}

impl ScenePhase {
    #[must_use]
    pub const fn admits(self, phase: GamePhase) -> bool {
        matches!(
            (self, phase),
            (Self::Any, _)
                | (Self::Introduction, GamePhase::Introduction)
                | (Self::Middle, GamePhase::Middle)
                | (Self::Late, GamePhase::Late)
                | (Self::Deep, GamePhase::Deep)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumEffect {
    Stabilize,
    Destabilize,
    Superposition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reality {
    Stable,
    Fluid,
    Fractured,
    Dissolved,
    Shattered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFlow {
    Forward,
    Backwards,
    Looped,
    AllAtOnce,
}

/// Advisory environment override carried by a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<Reality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_flow: Option<TimeFlow>,
}

/// Everything besides trait deltas a choice may do. Absent fields are inert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    pub karma: i32,
    /// Replaces the contradiction/consistency coherence rule when present.
    pub coherence_change: Option<i32>,
    pub consciousness: i32,
    pub cost: u32,
    pub dream_currency: u32,
    pub dream_depth_change: i32,
    pub dream_power: Option<String>,
    pub artifact: Option<Artifact>,
    pub companions: Vec<String>,
    pub secret: Option<String>,
    pub special: Option<String>,
    pub boss_encounter: Option<BossId>,
    pub defeat_boss: bool,
    pub quantum_effect: Option<QuantumEffect>,
    pub fragment_self: bool,
    pub unify_selves: bool,
    pub reset_traits: bool,
    pub invert_traits: bool,
    pub remove_traits: TraitDeltas,
    pub temporal_loop: bool,
    /// Chance that `temporal_loop` is set when the scene is materialized.
    pub temporal_loop_chance: Option<f64>,
    pub environment_change: Option<EnvironmentOverride>,
    pub time_effect: Option<f32>,
    pub void_whisper: Option<String>,
    pub metamemory: Option<String>,
}

/// Predicate over the identity used for requirements and conditional text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Condition {
    CoherenceAbove { value: f32 },
    CoherenceBelow { value: f32 },
    TraitAbove {
        #[serde(rename = "trait")]
        trait_kind: TraitKind,
        value: i32,
    },
    SecretsAtLeast { value: u32 },
    CurrencyAbove { value: u32 },
    CurrencyAtLeast { value: u32 },
    MemoriesAtLeast { value: usize },
    BossNotEncountered { boss: BossId },
}

/// Context a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub identity: &'a Identity,
    pub bosses: &'a BossProgress,
}

impl Condition {
    #[must_use]
    pub fn holds(&self, ctx: &ConditionContext<'_>) -> bool {
        let identity = ctx.identity;
        match self {
            Self::CoherenceAbove { value } => identity.coherence > *value,
            Self::CoherenceBelow { value } => identity.coherence < *value,
            Self::TraitAbove { trait_kind, value } => identity.traits.get(*trait_kind) > *value,
            Self::SecretsAtLeast { value } => identity.secrets_found >= *value,
            Self::CurrencyAbove { value } => identity.dream_currency > *value,
            Self::CurrencyAtLeast { value } => identity.dream_currency >= *value,
            Self::MemoriesAtLeast { value } => identity.memories.len() >= *value,
            Self::BossNotEncountered { boss } => !ctx.bosses.encountered(*boss),
        }
    }

    /// Boss this condition refers to, if any.
    #[must_use]
    pub const fn boss(&self) -> Option<BossId> {
        match self {
            Self::BossNotEncountered { boss } => Some(*boss),
            _ => None,
        }
    }
}

/// Threshold line in a coherence-tiered description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceTier {
    pub above: f32,
    pub text: String,
}

/// Piece of a scene description. Segments are concatenated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSegment {
    Text {
        text: String,
    },
    /// First tier whose `above` is exceeded by coherence, else `otherwise`.
    ByCoherence {
        tiers: Vec<CoherenceTier>,
        otherwise: String,
    },
    When {
        condition: Condition,
        then: String,
        #[serde(default)]
        otherwise: String,
    },
}

impl TextSegment {
    fn render<'a>(&'a self, ctx: &ConditionContext<'_>) -> &'a str {
        match self {
            Self::Text { text } => text.as_str(),
            Self::ByCoherence { tiers, otherwise } => tiers
                .iter()
                .find(|tier| ctx.identity.coherence > tier.above)
                .map_or(otherwise.as_str(), |tier| tier.text.as_str()),
            Self::When {
                condition,
                then,
                otherwise,
            } => {
                if condition.holds(ctx) {
                    then.as_str()
                } else {
                    otherwise.as_str()
                }
            }
        }
    }
}

/// Render a description, substituting `{dream_currency}` and `{loop_number}`.
#[must_use]
pub fn render_description(segments: &[TextSegment], ctx: &ConditionContext<'_>) -> String {
    let raw: String = segments.iter().map(|segment| segment.render(ctx)).collect();
    raw.replace(
        "{dream_currency}",
        &ctx.identity.dream_currency.to_string(),
    )
    .replace(
        "{loop_number}",
        &ctx.identity.temporal_loops.saturating_add(1).to_string(),
    )
}

/// A choice as authored in the catalog. Its `memory` id doubles as the choice id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub memory: String,
    #[serde(default)]
    pub traits: TraitDeltas,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Condition>,
    #[serde(default)]
    pub effects: Effects,
}

impl Choice {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.memory
    }

    /// The mirrored choice recorded alongside a quantum fork.
    #[must_use]
    pub fn alternate(&self, prefix: &str) -> Self {
        let mut alt = self.clone();
        alt.traits = self
            .traits
            .iter()
            .map(|(k, v)| (*k, v.saturating_neg()))
            .collect();
        alt.effects.karma = self.effects.karma.saturating_neg();
        alt.memory = format!("{prefix}{}", self.memory);
        alt
    }

    /// Largest single trait swing this choice carries.
    #[must_use]
    pub fn peak_delta(&self) -> i32 {
        self.traits.values().map(|v| v.saturating_abs()).max().unwrap_or(0)
    }
}

/// Weighted, gated entry in the scene catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    pub id: String,
    pub weight: f64,
    #[serde(default)]
    pub min_depth: u8,
    #[serde(default)]
    pub phase: ScenePhase,
    pub description: Vec<TextSegment>,
    pub choices: Vec<Choice>,
}

/// Scene reachable only through an explicit boss trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTemplate {
    pub boss: BossId,
    pub description: Vec<TextSegment>,
    pub choices: Vec<Choice>,
}

/// Body of the procedural temporal-loop scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopTemplate {
    pub description: Vec<TextSegment>,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "boss", rename_all = "snake_case")]
pub enum SceneKind {
    Catalog,
    Boss(BossId),
    TemporalLoop,
}

/// A choice as presented to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneChoice {
    pub choice: Choice,
    /// False when the requirement failed at materialization time.
    pub available: bool,
}

impl SceneChoice {
    #[must_use]
    pub fn id(&self) -> &str {
        self.choice.id()
    }
}

/// Materialized scene. Rebuilt every step, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub kind: SceneKind,
    pub description: String,
    pub choices: Vec<SceneChoice>,
}

impl Scene {
    #[must_use]
    pub fn choice(&self, id: &str) -> Option<&SceneChoice> {
        self.choices.iter().find(|c| c.id() == id)
    }

    pub fn available_choices(&self) -> impl Iterator<Item = &SceneChoice> {
        self.choices.iter().filter(|c| c.available)
    }
}
