//! Centralized balance and tuning constants for the Reverie engine.
//!
//! Narrative content lives in the catalog asset; the numbers that shape how
//! identity drifts, degrades and resolves into endings stay here so that they
//! only change through reviewed code.

// Identity bounds ----------------------------------------------------------
pub(crate) const STAT_MIN: f32 = 0.0;
pub(crate) const STAT_MAX: f32 = 100.0;
pub(crate) const TRAIT_MIN: i32 = 0;
pub(crate) const TRAIT_MAX: i32 = 100;
pub(crate) const TRAIT_BASELINE: i32 = 50;
pub(crate) const KARMA_MIN: i32 = -100;
pub(crate) const KARMA_MAX: i32 = 100;
pub(crate) const DREAM_DEPTH_MAX: u8 = 10;
pub(crate) const MEMORY_CAPACITY: usize = 30;
pub(crate) const FRAGMENT_MEMORY_WINDOW: usize = 5;
pub(crate) const COMPANION_STARTING_LOYALTY: i32 = 50;

// Choice resolution --------------------------------------------------------
pub(crate) const NOTABLE_TRAIT_CHANGE: i32 = 10;
/// Largest magnitude any authored effect number may carry.
pub(crate) const EFFECT_MAGNITUDE_MAX: i32 = 1000;
pub(crate) const CONTRADICTION_COHERENCE_DELTA: f32 = -15.0;
pub(crate) const CONSISTENT_COHERENCE_DELTA: f32 = 5.0;
pub(crate) const UNIFICATION_COHERENCE_BONUS: f32 = 30.0;
pub(crate) const QUANTUM_FORK_THRESHOLD: f64 = 0.5;
pub(crate) const QUANTUM_COLLAPSE_THRESHOLD: f64 = 0.7;
pub(crate) const QUANTUM_FORK_COHERENCE_COST: f32 = 10.0;
pub(crate) const DEEP_DREAM_DEPTH: u8 = 5;
pub(crate) const JOURNAL_ROLL_THRESHOLD: f64 = 0.8;
pub(crate) const JOURNAL_SIGNIFICANT_MARKER: &str = "significant";
pub(crate) const RELATIONSHIP_KARMA_DIVISOR: f32 = 10.0;
pub(crate) const ECHO_CAPACITY: usize = 20;
pub(crate) const DIALOGUE_CAPACITY: usize = 100;
pub(crate) const QUANTUM_ALTERNATE_PREFIX: &str = "anti_";

// Scene selection ----------------------------------------------------------
pub(crate) const BOSS_TRIGGER_WEIGHT: f64 = 5.0;
pub(crate) const TEMPORAL_LOOP_THRESHOLD: f64 = 0.7;
pub(crate) const TEMPORAL_LOOP_SCENE_ID: &str = "temporal_loop";
pub(crate) const BOSS_SCENE_PREFIX: &str = "boss_";
pub(crate) const SCENE_POOL_ID: &str = "reverie.scenes";

// Passive degradation ------------------------------------------------------
pub(crate) const DEGRADATION_PERIOD_MS: u64 = 2_000;
pub(crate) const DEGRADATION_BASE: f32 = 0.5;
pub(crate) const DEGRADATION_PER_DEPTH: f32 = 0.2;
pub(crate) const DEGRADATION_KARMA_PRESSURE: f32 = 0.2;
pub(crate) const DEGRADATION_KARMA_PRESSURE_THRESHOLD: i32 = 50;
pub(crate) const DEGRADATION_UNSTABLE_PRESSURE: f32 = 0.3;
pub(crate) const DEGRADATION_ARTIFACT_RELIEF: f32 = 0.1;
pub(crate) const DEGRADATION_COMPANION_RELIEF: f32 = 0.05;
pub(crate) const DEGRADATION_CONSCIOUSNESS_FACTOR: f32 = 0.5;
pub(crate) const DEGRADATION_ANCHOR_FACTOR: f32 = 0.2;
pub(crate) const DEGRADATION_UNSTABLE_COHERENCE: f32 = 30.0;
pub(crate) const DEGRADATION_UNSTABLE_ROLL: f64 = 0.9;
pub(crate) const DEGRADATION_SUPERPOSITION_COHERENCE: f32 = 50.0;
pub(crate) const DEGRADATION_SUPERPOSITION_ROLL: f64 = 0.95;

// Phases -------------------------------------------------------------------
pub(crate) const MIDDLE_PHASE_CHOICES: u32 = 5;
pub(crate) const LATE_PHASE_CHOICES: u32 = 12;

// Side actions -------------------------------------------------------------
pub(crate) const DEEPER_DREAM_COHERENCE_COST: f32 = 15.0;
pub(crate) const DEEPER_DREAM_CONSCIOUSNESS_COST: f32 = 10.0;
pub(crate) const ARTIFACT_CRISIS_COHERENCE: f32 = 30.0;
pub(crate) const ARTIFACT_CRISIS_ROLL: f64 = 0.3;
pub(crate) const ARTIFACT_STRONG_COHERENCE_BOOST: i32 = 20;
pub(crate) const ARTIFACT_ANCHOR_CRISIS: f32 = 30.0;
pub(crate) const ARTIFACT_ANCHOR_ROLL: f64 = 0.5;
pub(crate) const ARTIFACT_RARE_CHANCE_DEEP: f64 = 0.2;
pub(crate) const ARTIFACT_RARE_CHANCE: f64 = 0.05;
pub(crate) const ARTIFACT_RARE_DEPTH: u8 = 3;
pub(crate) const TIMELINE_SIGHT_CONSCIOUSNESS: f32 = 10.0;
pub(crate) const TRUE_NAMING_COHERENCE: f32 = 20.0;
pub(crate) const NECROMANCY_WINDOW: usize = 5;
pub(crate) const NECROMANCY_STRENGTH: f32 = 50.0;
pub(crate) const UNDEAD_MEMORY_PREFIX: &str = "undead_";

// Narrator -----------------------------------------------------------------
pub(crate) const NARRATOR_HIGH_COHERENCE: f32 = 70.0;
pub(crate) const NARRATOR_MEDIUM_COHERENCE: f32 = 40.0;
pub(crate) const NARRATOR_KARMA_TIER: i32 = 50;
pub(crate) const NARRATOR_DRAMATIC_CHANGE: i32 = 20;
pub(crate) const NARRATOR_LOYAL_COMPANION: i32 = 70;
pub(crate) const NARRATOR_DEEP_DEPTH: u8 = 3;
pub(crate) const NARRATOR_COHERENCE_ALARM: f32 = 20.0;
pub(crate) const NARRATOR_CONSCIOUSNESS_ALARM: f32 = 30.0;
pub(crate) const TRUE_NAME_TRAIT_THRESHOLD: i32 = 70;
pub(crate) const TRUE_NAME_HIGH_COHERENCE: f32 = 70.0;
pub(crate) const TRUE_NAME_LOW_COHERENCE: f32 = 30.0;

// Environment --------------------------------------------------------------
pub(crate) const GLITCH_COHERENCE_STEP: f32 = 15.0;
pub(crate) const GRAVITY_PER_GLITCH: f32 = 0.15;
pub(crate) const GRAVITY_PER_DEPTH: f32 = 0.1;
pub(crate) const COLOR_SHIFT_PER_COHERENCE: f32 = 3.6;
pub(crate) const TIME_FLOW_BACKWARDS_COHERENCE: f32 = 30.0;
pub(crate) const TIME_FLOW_LOOPED_LOOPS: u32 = 3;
pub(crate) const REALITY_STABLE: f32 = 70.0;
pub(crate) const REALITY_FLUID: f32 = 40.0;
pub(crate) const REALITY_FRACTURED: f32 = 20.0;
pub(crate) const FOUR_D_DEPTH: u8 = 3;
pub(crate) const WEATHER_KARMA: i32 = 50;
pub(crate) const TEMPERATURE_TRAIT: i32 = 70;

// Achievements -------------------------------------------------------------
pub(crate) const COLLECTOR_ARTIFACTS: usize = 10;
pub(crate) const DEEP_DREAMER_DEPTH: u8 = 5;
pub(crate) const SHATTERED_FRAGMENTS: usize = 5;
pub(crate) const DREAM_MASTER_POWERS: usize = 5;

// Endings ------------------------------------------------------------------
pub(crate) const ENLIGHTENED_COHERENCE: f32 = 90.0;
pub(crate) const ENLIGHTENED_ARTIFACTS: usize = 10;
pub(crate) const ENLIGHTENED_KARMA: i32 = 50;
pub(crate) const QUANTUM_ENDING_FORKS: usize = 5;
pub(crate) const SHATTERED_ENDING_FRAGMENTS: usize = 7;
pub(crate) const VOID_MERGED_WHISPERS: usize = 5;
pub(crate) const DREAM_FAMILY_COMPANIONS: usize = 5;
pub(crate) const DREAM_FAMILY_KARMA: i32 = 70;
pub(crate) const ETERNAL_RETURN_LOOPS: u32 = 10;
