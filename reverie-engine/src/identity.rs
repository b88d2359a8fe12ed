//! The player's identity record and its bounded mutation helpers.

use crate::achievements::Achievement;
use crate::constants::{
    COMPANION_STARTING_LOYALTY, DREAM_DEPTH_MAX, KARMA_MAX, KARMA_MIN, MEMORY_CAPACITY, STAT_MAX,
    STAT_MIN, TRAIT_BASELINE, TRAIT_MAX, TRAIT_MIN,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// One of the twelve personality axes. Traits come in opposed pairs but are
/// stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    Kind,
    Cruel,
    Brave,
    Fearful,
    Logical,
    Emotional,
    Orderly,
    Chaotic,
    Truthful,
    Deceptive,
    Curious,
    Indifferent,
}

impl TraitKind {
    pub const ALL: [Self; 12] = [
        Self::Kind,
        Self::Cruel,
        Self::Brave,
        Self::Fearful,
        Self::Logical,
        Self::Emotional,
        Self::Orderly,
        Self::Chaotic,
        Self::Truthful,
        Self::Deceptive,
        Self::Curious,
        Self::Indifferent,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::Cruel => "cruel",
            Self::Brave => "brave",
            Self::Fearful => "fearful",
            Self::Logical => "logical",
            Self::Emotional => "emotional",
            Self::Orderly => "orderly",
            Self::Chaotic => "chaotic",
            Self::Truthful => "truthful",
            Self::Deceptive => "deceptive",
            Self::Curious => "curious",
            Self::Indifferent => "indifferent",
        }
    }

    /// The opposing axis of the pair this trait belongs to.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Kind => Self::Cruel,
            Self::Cruel => Self::Kind,
            Self::Brave => Self::Fearful,
            Self::Fearful => Self::Brave,
            Self::Logical => Self::Emotional,
            Self::Emotional => Self::Logical,
            Self::Orderly => Self::Chaotic,
            Self::Chaotic => Self::Orderly,
            Self::Truthful => Self::Deceptive,
            Self::Deceptive => Self::Truthful,
            Self::Curious => Self::Indifferent,
            Self::Indifferent => Self::Curious,
        }
    }
}

/// Sparse per-trait adjustments carried by choices and memories.
pub type TraitDeltas = BTreeMap<TraitKind, i32>;

/// Full trait vector, each value in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Traits {
    pub kind: i32,
    pub cruel: i32,
    pub brave: i32,
    pub fearful: i32,
    pub logical: i32,
    pub emotional: i32,
    pub orderly: i32,
    pub chaotic: i32,
    pub truthful: i32,
    pub deceptive: i32,
    pub curious: i32,
    pub indifferent: i32,
}

impl Default for Traits {
    fn default() -> Self {
        Self::uniform(TRAIT_BASELINE)
    }
}

impl Traits {
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self {
            kind: value,
            cruel: value,
            brave: value,
            fearful: value,
            logical: value,
            emotional: value,
            orderly: value,
            chaotic: value,
            truthful: value,
            deceptive: value,
            curious: value,
            indifferent: value,
        }
    }

    #[must_use]
    pub const fn get(&self, kind: TraitKind) -> i32 {
        match kind {
            TraitKind::Kind => self.kind,
            TraitKind::Cruel => self.cruel,
            TraitKind::Brave => self.brave,
            TraitKind::Fearful => self.fearful,
            TraitKind::Logical => self.logical,
            TraitKind::Emotional => self.emotional,
            TraitKind::Orderly => self.orderly,
            TraitKind::Chaotic => self.chaotic,
            TraitKind::Truthful => self.truthful,
            TraitKind::Deceptive => self.deceptive,
            TraitKind::Curious => self.curious,
            TraitKind::Indifferent => self.indifferent,
        }
    }

    const fn slot(&mut self, kind: TraitKind) -> &mut i32 {
        match kind {
            TraitKind::Kind => &mut self.kind,
            TraitKind::Cruel => &mut self.cruel,
            TraitKind::Brave => &mut self.brave,
            TraitKind::Fearful => &mut self.fearful,
            TraitKind::Logical => &mut self.logical,
            TraitKind::Emotional => &mut self.emotional,
            TraitKind::Orderly => &mut self.orderly,
            TraitKind::Chaotic => &mut self.chaotic,
            TraitKind::Truthful => &mut self.truthful,
            TraitKind::Deceptive => &mut self.deceptive,
            TraitKind::Curious => &mut self.curious,
            TraitKind::Indifferent => &mut self.indifferent,
        }
    }

    /// Overwrite a trait, clamping into range.
    pub fn set(&mut self, kind: TraitKind, value: i32) {
        *self.slot(kind) = value.clamp(TRAIT_MIN, TRAIT_MAX);
    }

    /// Add `delta` to a trait and clamp. Returns the new value.
    pub fn adjust(&mut self, kind: TraitKind, delta: i32) -> i32 {
        let next = self.get(kind).saturating_add(delta);
        self.set(kind, next);
        self.get(kind)
    }

    /// Apply every delta in a sparse map.
    pub fn apply(&mut self, deltas: &TraitDeltas) {
        for (kind, delta) in deltas {
            self.adjust(*kind, *delta);
        }
    }

    pub fn clamp(&mut self) {
        for kind in TraitKind::ALL {
            let value = self.get(kind);
            self.set(kind, value);
        }
    }

    /// Mirror every trait around the midpoint (`100 - v`).
    #[must_use]
    pub fn inverted(&self) -> Self {
        let mut out = *self;
        for kind in TraitKind::ALL {
            out.set(kind, TRAIT_MAX - self.get(kind));
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (TraitKind, i32)> + '_ {
        TraitKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// True when every trait sits exactly on the baseline.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.iter().all(|(_, value)| value == TRAIT_BASELINE)
    }

    /// Trait with the highest value; ties resolve to the first in canonical order.
    #[must_use]
    pub fn dominant(&self) -> TraitKind {
        self.iter()
            .fold((TraitKind::Kind, i32::MIN), |best, (kind, value)| {
                if value > best.1 { (kind, value) } else { best }
            })
            .0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumState {
    #[default]
    Stable,
    Unstable,
    Superposition,
    Collapsed,
}

impl QuantumState {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Unstable => "unstable",
            Self::Superposition => "superposition",
            Self::Collapsed => "collapsed",
        }
    }
}

/// A remembered choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    /// Coherence at the moment the memory formed.
    pub strength: f32,
    pub timestamp: u64,
    #[serde(default)]
    pub traits: TraitDeltas,
    pub scene: String,
    pub dream_depth: u8,
    #[serde(default)]
    pub karma: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

/// Short window of memories carried by a fragment.
pub type MemoryWindow = SmallVec<[Memory; 5]>;

/// A split-off partial self.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub traits: Traits,
    pub split_at: u64,
    #[serde(default)]
    pub memories: MemoryWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub id: String,
    pub loyalty: i32,
    pub joined_at: u64,
}

impl Companion {
    #[must_use]
    pub fn new(id: impl Into<String>, joined_at: u64) -> Self {
        Self {
            id: id.into(),
            loyalty: COMPANION_STARTING_LOYALTY,
            joined_at,
        }
    }
}

/// An artifact, either from the search table or granted by a choice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coherence_boost: i32,
    #[serde(default)]
    pub reality_anchor_boost: i32,
    #[serde(default)]
    pub consciousness_boost: i32,
    /// Halves karma (floored) when found.
    #[serde(default)]
    pub karma_balance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_effect: Option<f32>,
    #[serde(default)]
    pub rare: bool,
    #[serde(default)]
    pub special: bool,
}

/// Canonical mutable narrative state for one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub traits: Traits,
    pub coherence: f32,
    pub consciousness: f32,
    pub reality_anchor: f32,
    pub karma: i32,
    pub dream_depth: u8,
    pub quantum_state: QuantumState,
    pub memories: Vec<Memory>,
    pub fragmented_self: Vec<Fragment>,
    pub artifacts: Vec<Artifact>,
    pub dream_powers: Vec<String>,
    pub dream_companions: Vec<Companion>,
    pub achievements: Vec<Achievement>,
    pub void_whispers: Vec<String>,
    pub metamemories: Vec<String>,
    pub dream_currency: u32,
    pub secrets_found: u32,
    pub temporal_loops: u32,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            traits: Traits::default(),
            coherence: STAT_MAX,
            consciousness: STAT_MAX,
            reality_anchor: STAT_MAX,
            karma: 0,
            dream_depth: 0,
            quantum_state: QuantumState::Stable,
            memories: Vec::new(),
            fragmented_self: Vec::new(),
            artifacts: Vec::new(),
            dream_powers: Vec::new(),
            dream_companions: Vec::new(),
            achievements: Vec::new(),
            void_whispers: Vec::new(),
            metamemories: Vec::new(),
            dream_currency: 0,
            secrets_found: 0,
            temporal_loops: 0,
        }
    }
}

fn clamp_stat(value: f32) -> f32 {
    if value.is_nan() {
        return STAT_MIN;
    }
    value.clamp(STAT_MIN, STAT_MAX)
}

impl Identity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every bounded field back into range and trim the memory log.
    pub fn clamp(&mut self) {
        self.traits.clamp();
        self.coherence = clamp_stat(self.coherence);
        self.consciousness = clamp_stat(self.consciousness);
        self.reality_anchor = clamp_stat(self.reality_anchor);
        self.karma = self.karma.clamp(KARMA_MIN, KARMA_MAX);
        self.dream_depth = self.dream_depth.min(DREAM_DEPTH_MAX);
        self.truncate_memories();
    }

    pub fn adjust_coherence(&mut self, delta: f32) {
        self.coherence = clamp_stat(self.coherence + delta);
    }

    pub fn adjust_consciousness(&mut self, delta: f32) {
        self.consciousness = clamp_stat(self.consciousness + delta);
    }

    pub fn adjust_reality_anchor(&mut self, delta: f32) {
        self.reality_anchor = clamp_stat(self.reality_anchor + delta);
    }

    pub fn adjust_karma(&mut self, delta: i32) {
        self.karma = self.karma.saturating_add(delta).clamp(KARMA_MIN, KARMA_MAX);
    }

    /// Move dream depth by `delta`, clamped to `[0, 10]`. Returns the new depth.
    pub fn shift_depth(&mut self, delta: i32) -> u8 {
        let next = i32::from(self.dream_depth)
            .saturating_add(delta)
            .clamp(0, i32::from(DREAM_DEPTH_MAX));
        self.dream_depth = u8::try_from(next).unwrap_or(DREAM_DEPTH_MAX);
        self.dream_depth
    }

    /// Append a memory, evicting the oldest beyond capacity.
    pub fn push_memory(&mut self, memory: Memory) {
        self.memories.push(memory);
        self.truncate_memories();
    }

    fn truncate_memories(&mut self) {
        if self.memories.len() > MEMORY_CAPACITY {
            let excess = self.memories.len() - MEMORY_CAPACITY;
            self.memories.drain(..excess);
        }
    }

    /// The most recent `count` memories, oldest first.
    #[must_use]
    pub fn recent_memories(&self, count: usize) -> MemoryWindow {
        let start = self.memories.len().saturating_sub(count);
        self.memories[start..].iter().cloned().collect()
    }

    #[must_use]
    pub fn has_power(&self, power: &str) -> bool {
        self.dream_powers.iter().any(|owned| owned == power)
    }

    /// Grant a dream power; returns false when already owned.
    pub fn grant_power(&mut self, power: &str) -> bool {
        if self.has_power(power) {
            return false;
        }
        self.dream_powers.push(power.to_string());
        true
    }

    /// Recruit a companion; returns false when one with the same id exists.
    pub fn recruit(&mut self, id: &str, joined_at: u64) -> bool {
        if self.dream_companions.iter().any(|c| c.id == id) {
            return false;
        }
        self.dream_companions.push(Companion::new(id, joined_at));
        true
    }

    /// Record an achievement; returns false when it was already unlocked.
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        if self.achievements.contains(&achievement) {
            return false;
        }
        self.achievements.push(achievement);
        true
    }

    /// Debit currency. Leaves the balance untouched and returns false when short.
    pub fn spend(&mut self, cost: u32) -> bool {
        match self.dream_currency.checked_sub(cost) {
            Some(rest) => {
                self.dream_currency = rest;
                true
            }
            None => false,
        }
    }

    /// Stable digest of the full record, used for regression comparisons.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        hasher.finish()
    }
}
