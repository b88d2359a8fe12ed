//! Reverie Narrative Engine
//!
//! Platform-agnostic core of the Reverie dream narrative: the identity model,
//! weighted scene selection, choice resolution, passive degradation and the
//! ending evaluator. Rendering and audio live elsewhere and talk to the
//! engine through [`DreamSession`].

pub mod achievements;
pub mod actions;
pub mod catalog;
pub mod constants;
pub mod data;
pub mod degradation;
pub mod ending;
pub mod environment;
pub mod error;
pub mod event;
pub mod identity;
pub mod narrator;
pub mod numbers;
pub mod resolver;
pub mod rng;
pub mod selector;
pub mod session;

// Re-export commonly used types
pub use achievements::{Achievement, award};
pub use actions::{ArtifactFind, Descent, DreamPower, PowerOutcome};
pub use catalog::Catalog;
pub use data::{
    BossId, BossProgress, BossStatus, Choice, Condition, Effects, EnvironmentOverride, GamePhase,
    Reality, Scene, SceneChoice, SceneKind, ScenePhase, TimeFlow,
};
pub use degradation::{DegradationTick, degradation_rate};
pub use ending::{Ending, EndingKind, evaluate};
pub use environment::{Dimension, Environment, Temperature, Weather};
pub use error::{CatalogError, EngineError, EngineResult, InvalidState, RejectReason};
pub use event::{EchoColor, EngineEvent, EventDecisionTrace, MemoryEcho, SpecialEvent};
pub use identity::{
    Artifact, Companion, Fragment, Identity, Memory, QuantumState, TraitDeltas, TraitKind, Traits,
};
pub use resolver::{AppliedChoice, QuantumChoice, Resolution, ResolveContext, TraitChange};
pub use rng::{CountingRng, RandomSource, RngBundle, RollStream, ScriptedRolls};
pub use selector::{ScenePick, SelectionRequest, select_scene, weighted_pick};
pub use session::{
    ActionOutcome, ChoiceOutcome, DreamSession, EchoLog, EngineConfig, JournalEntry,
    MetaProgress, MetaSnapshot, Relationship, TickOutcome,
};
