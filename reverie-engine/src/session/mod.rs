//! The dream session owns one playthrough: the identity, the scene on screen
//! and every record a presentation layer reads back. All mutation flows
//! through the request methods here.

#[cfg(feature = "async")]
pub mod driver;
mod meta;
mod record;

pub use meta::{MetaProgress, MetaSnapshot};
pub use record::{EchoLog, JournalEntry, Relationship};

use crate::achievements::{Achievement, award};
use crate::actions::{descend, search_artifact, use_power};
use crate::catalog::Catalog;
use crate::constants::{
    DEGRADATION_PERIOD_MS, DIALOGUE_CAPACITY, ECHO_CAPACITY, JOURNAL_ROLL_THRESHOLD, JOURNAL_SIGNIFICANT_MARKER,
    LATE_PHASE_CHOICES, MIDDLE_PHASE_CHOICES, RELATIONSHIP_KARMA_DIVISOR,
};
use crate::data::{
    BossId, BossProgress, ConditionContext, EnvironmentOverride, GamePhase, Scene, SceneKind,
};
use crate::degradation::{self, DegradationTick};
use crate::ending::{Ending, evaluate};
use crate::environment::Environment;
use crate::error::{EngineResult, InvalidState};
use crate::event::{EchoColor, EngineEvent, EventDecisionTrace, SpecialEvent};
use crate::identity::Identity;
use crate::narrator::{journal_text, npc_response};
use crate::numbers::i32_to_f32;
use crate::resolver::{AppliedChoice, QuantumChoice, Resolution, ResolveContext, resolve_choice};
use crate::rng::{RandomSource, RngBundle, RollStream};
use crate::selector::{SelectionRequest, boss_scene, select_scene};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const OPENING_JOURNAL: &str = "I found myself in a place between sleeping and waking...";
const OPENING_ECHO: &str = "You begin to dream...";
const DESCENT_ECHO: &str = "Descending deeper into dream...";
const QUANTUM_SPLIT_LINE: &str =
    "Reality splits. You chose both paths simultaneously. The universe struggles to reconcile.";

/// Runtime knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cadence of passive degradation when driven by a timer.
    pub degradation_period_ms: u64,
    /// A non-significant choice lands in the journal when the journal roll exceeds this.
    pub journal_roll_threshold: f64,
    pub echo_capacity: usize,
    /// Narrator lines kept; older lines are dropped first.
    pub dialogue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            degradation_period_ms: DEGRADATION_PERIOD_MS,
            journal_roll_threshold: JOURNAL_ROLL_THRESHOLD,
            echo_capacity: ECHO_CAPACITY,
            dialogue_capacity: DIALOGUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn degradation_period(&self) -> Duration {
        Duration::from_millis(self.degradation_period_ms)
    }
}

/// Everything a presentation layer needs after a choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOutcome {
    pub scene: Scene,
    pub dialogue: Vec<String>,
    pub journal_entry: Option<JournalEntry>,
    pub achievements_unlocked: Vec<Achievement>,
    pub ending: Option<Ending>,
    pub events: Vec<EngineEvent>,
}

/// Result of a side action (descending, searching, using a power).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionOutcome {
    pub message: Option<String>,
    pub achievements_unlocked: Vec<Achievement>,
    pub ending: Option<Ending>,
    pub events: Vec<EngineEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub tick: DegradationTick,
}

pub struct DreamSession {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    rng: Box<dyn RandomSource>,
    meta: Arc<MetaProgress>,
    identity: Identity,
    scene: Scene,
    phase: GamePhase,
    bosses: BossProgress,
    special_events: Vec<SpecialEvent>,
    boss_trigger_pending: bool,
    quantum_choices: Vec<QuantumChoice>,
    journal: Vec<JournalEntry>,
    echoes: EchoLog,
    relationships: BTreeMap<String, Relationship>,
    dialogue: Vec<String>,
    environment_override: Option<EnvironmentOverride>,
    time_distortion: f32,
    resolved_choices: u32,
    clock: u64,
    ending: Option<Ending>,
    last_trace: Option<EventDecisionTrace>,
}

impl std::fmt::Debug for DreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DreamSession")
            .field("scene", &self.scene.id)
            .field("phase", &self.phase)
            .field("clock", &self.clock)
            .field("ending", &self.ending.as_ref().map(|e| e.kind))
            .finish_non_exhaustive()
    }
}

impl DreamSession {
    /// Start a dream on the built-in catalog with a seeded random source.
    ///
    /// # Errors
    ///
    /// Returns the catalog error if the embedded content fails validation.
    pub fn new(seed: u64) -> EngineResult<Self> {
        let catalog = Catalog::builtin()?;
        Ok(Self::with_parts(
            catalog,
            Box::new(RngBundle::from_user_seed(seed)),
            EngineConfig::default(),
            Arc::new(MetaProgress::new()),
        ))
    }

    /// Start a dream from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        catalog: Arc<Catalog>,
        rng: Box<dyn RandomSource>,
        config: EngineConfig,
        meta: Arc<MetaProgress>,
    ) -> Self {
        let mut session = Self {
            catalog,
            config,
            rng,
            meta,
            identity: Identity::new(),
            scene: Scene {
                id: String::new(),
                kind: SceneKind::Catalog,
                description: String::new(),
                choices: Vec::new(),
            },
            phase: GamePhase::Introduction,
            bosses: BossProgress::default(),
            special_events: Vec::new(),
            boss_trigger_pending: false,
            quantum_choices: Vec::new(),
            journal: Vec::new(),
            echoes: EchoLog::with_capacity(config.echo_capacity),
            relationships: BTreeMap::new(),
            dialogue: Vec::new(),
            environment_override: None,
            time_distortion: 1.0,
            resolved_choices: 0,
            clock: 0,
            ending: None,
            last_trace: None,
        };
        session.begin();
        session
    }

    fn begin(&mut self) {
        self.identity = Identity::new();
        self.phase = GamePhase::Introduction;
        self.bosses = BossProgress::default();
        self.special_events.clear();
        self.boss_trigger_pending = false;
        self.quantum_choices.clear();
        self.relationships.clear();
        self.dialogue.clear();
        self.environment_override = None;
        self.time_distortion = 1.0;
        self.resolved_choices = 0;
        self.clock = 0;
        self.ending = None;

        self.journal = vec![JournalEntry {
            text: OPENING_JOURNAL.to_string(),
            at: self.clock,
            coherence: self.identity.coherence,
            karma: None,
        }];
        self.echoes = EchoLog::with_capacity(self.config.echo_capacity);
        self.echoes.push(OPENING_ECHO, EchoColor::White, self.clock);

        let mut events = Vec::new();
        self.select_next(&mut events);
        log::debug!("dream begins in `{}`", self.scene.id);
    }

    /// Borrow the identity.
    #[must_use]
    pub const fn snapshot(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub const fn current_scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub const fn ending(&self) -> Option<&Ending> {
        self.ending.as_ref()
    }

    #[must_use]
    pub const fn bosses(&self) -> &BossProgress {
        &self.bosses
    }

    /// Special events raised this playthrough, in order.
    #[must_use]
    pub fn special_events(&self) -> &[SpecialEvent] {
        &self.special_events
    }

    #[must_use]
    pub fn quantum_choices(&self) -> &[QuantumChoice] {
        &self.quantum_choices
    }

    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    #[must_use]
    pub const fn echoes(&self) -> &EchoLog {
        &self.echoes
    }

    #[must_use]
    pub const fn relationships(&self) -> &BTreeMap<String, Relationship> {
        &self.relationships
    }

    /// Every narrator and system line shown so far.
    #[must_use]
    pub fn dialogue(&self) -> &[String] {
        &self.dialogue
    }

    /// Ambient world derived from the identity, with any choice override applied.
    #[must_use]
    pub fn environment(&self) -> Environment {
        Environment::derive(&self.identity).with_override(self.environment_override.as_ref())
    }

    #[must_use]
    pub const fn time_distortion(&self) -> f32 {
        self.time_distortion
    }

    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn meta(&self) -> &Arc<MetaProgress> {
        &self.meta
    }

    /// Telemetry from the most recent weighted scene pick.
    #[must_use]
    pub const fn last_decision_trace(&self) -> Option<&EventDecisionTrace> {
        self.last_trace.as_ref()
    }

    /// Refuse requests once the dream has ended. Decay between requests may
    /// already have emptied the dreamer; that ending is settled here.
    fn ensure_running(&mut self) -> EngineResult<()> {
        if self.ending.is_none()
            && let Some(ending) = self.settle()
        {
            log::info!("dream ended while idle: {}", ending.kind.key());
        }
        if self.ending.is_some() {
            return Err(InvalidState::GameOver.into());
        }
        Ok(())
    }

    /// Resolve a choice from the current scene.
    ///
    /// # Errors
    ///
    /// Returns a rejection when the choice is unknown, unavailable or
    /// unaffordable, and [`InvalidState::GameOver`] once an ending has been
    /// reached. Rejections leave the session untouched.
    pub fn submit_choice(&mut self, choice_id: &str) -> EngineResult<ChoiceOutcome> {
        self.ensure_running()?;
        let now = self.clock.saturating_add(1);
        let ctx = ResolveContext {
            scene: &self.scene,
            clock: now,
            deep_dream_raised: self.special_events.contains(&SpecialEvent::DeepDream),
        };
        let resolution = resolve_choice(&self.identity, choice_id, &ctx, self.rng.as_mut())
            .inspect_err(|reason| log::debug!("choice `{choice_id}` rejected: {reason}"))?;

        self.clock = now;
        self.meta.record_choice();
        Ok(match resolution {
            Resolution::QuantumFork { next, record } => self.commit_fork(next, record),
            Resolution::Applied(applied) => self.commit_applied(*applied),
        })
    }

    fn commit_fork(&mut self, next: Identity, record: QuantumChoice) -> ChoiceOutcome {
        self.identity = next;
        self.quantum_choices.push(record);
        self.log_dialogue([QUANTUM_SPLIT_LINE.to_string()]);
        let ending = self.settle();
        ChoiceOutcome {
            scene: self.scene.clone(),
            dialogue: vec![QUANTUM_SPLIT_LINE.to_string()],
            journal_entry: None,
            achievements_unlocked: Vec::new(),
            ending,
            events: vec![EngineEvent::QuantumSplit],
        }
    }

    fn commit_applied(&mut self, applied: AppliedChoice) -> ChoiceOutcome {
        let AppliedChoice {
            next,
            choice,
            contradictions,
            notable_changes,
            specials,
            achievements,
            gained_power,
            defeated_boss,
            ..
        } = applied;
        let before = std::mem::replace(&mut self.identity, next);
        let mut events = Vec::new();

        let response = npc_response(&before, !contradictions.is_empty(), &notable_changes);
        let dialogue = vec![response.clone()];

        if let Some(power) = &gained_power {
            let echo = self
                .echoes
                .push(format!("Gained power: {power}"), EchoColor::White, self.clock);
            events.push(EngineEvent::MemoryEcho { echo });
        }

        let relationship = self.relationships.entry(self.scene.id.clone()).or_default();
        relationship.last_choice.clone_from(&choice.memory);
        relationship.relationship += i32_to_f32(choice.effects.karma) / RELATIONSHIP_KARMA_DIVISOR;
        relationship.encounters = relationship.encounters.saturating_add(1);

        let echo = self.echoes.push(
            choice.text.clone(),
            EchoColor::for_karma(choice.effects.karma),
            self.clock,
        );
        events.push(EngineEvent::MemoryEcho { echo });

        if let Some(change) = choice.effects.environment_change {
            self.environment_override = Some(change);
            events.push(EngineEvent::EnvironmentChanged { change });
        }
        if let Some(factor) = choice.effects.time_effect {
            self.time_distortion = factor;
            events.push(EngineEvent::TimeDistortion { factor });
        }

        let journal_entry = (choice.memory.contains(JOURNAL_SIGNIFICANT_MARKER)
            || self.rng.roll(RollStream::Journal) > self.config.journal_roll_threshold)
            .then(|| JournalEntry {
                text: journal_text(&choice.text, &response),
                at: self.clock,
                coherence: before.coherence,
                karma: Some(before.karma),
            });
        if let Some(entry) = &journal_entry {
            self.journal.push(entry.clone());
        }

        for special in specials {
            self.raise(special, &mut events);
        }
        events.extend(
            achievements
                .iter()
                .map(|&achievement| EngineEvent::AchievementUnlocked { achievement }),
        );
        if let Some(boss) = defeated_boss {
            self.bosses.mark_defeated(boss);
            events.push(EngineEvent::BossDefeated { boss });
        }

        self.resolved_choices = self.resolved_choices.saturating_add(1);
        self.advance_phase(&mut events);
        self.log_dialogue(dialogue.iter().cloned());

        let ending = self.settle();
        if ending.is_none() {
            self.next_scene(choice.effects.boss_encounter, &mut events);
        }

        ChoiceOutcome {
            scene: self.scene.clone(),
            dialogue,
            journal_entry,
            achievements_unlocked: achievements,
            ending,
            events,
        }
    }

    fn raise(&mut self, special: SpecialEvent, events: &mut Vec<EngineEvent>) {
        if special == SpecialEvent::BossTrigger {
            self.boss_trigger_pending = true;
        }
        log::debug!("special event: {}", special.key());
        self.special_events.push(special.clone());
        events.push(EngineEvent::Special { event: special });
    }

    fn advance_phase(&mut self, events: &mut Vec<EngineEvent>) {
        let target = if self.resolved_choices >= LATE_PHASE_CHOICES {
            GamePhase::Late
        } else if self.resolved_choices >= MIDDLE_PHASE_CHOICES {
            GamePhase::Middle
        } else {
            GamePhase::Introduction
        };
        self.enter_phase(target, events);
    }

    fn enter_phase(&mut self, phase: GamePhase, events: &mut Vec<EngineEvent>) {
        if phase > self.phase {
            log::debug!("phase {:?} -> {phase:?}", self.phase);
            self.phase = phase;
            events.push(EngineEvent::PhaseChanged { phase });
        }
    }

    /// Boss short-circuit, else a fresh weighted pick.
    fn next_scene(&mut self, boss_encounter: Option<BossId>, events: &mut Vec<EngineEvent>) {
        if let Some(boss) = boss_encounter
            && !self.bosses.defeated(boss)
        {
            let ctx = ConditionContext {
                identity: &self.identity,
                bosses: &self.bosses,
            };
            if let Some(scene) = boss_scene(&self.catalog, boss, &ctx, self.rng.as_mut()) {
                self.bosses.mark_encountered(boss);
                events.push(EngineEvent::BossEncountered { boss });
                self.scene = scene;
                self.last_trace = None;
                return;
            }
        }
        self.select_next(events);
    }

    fn select_next(&mut self, events: &mut Vec<EngineEvent>) {
        let request = SelectionRequest {
            catalog: self.catalog.as_ref(),
            identity: &self.identity,
            phase: self.phase,
            bosses: &self.bosses,
            boss_trigger: self.boss_trigger_pending,
        };
        let pick = select_scene(&request, self.rng.as_mut());
        if pick.content_gap {
            events.push(EngineEvent::ContentGap);
        }
        if let SceneKind::Boss(boss) = pick.scene.kind {
            self.boss_trigger_pending = false;
            self.bosses.mark_encountered(boss);
            events.push(EngineEvent::BossEncountered { boss });
        }
        self.last_trace = pick.decision_trace;
        self.scene = pick.scene;
    }

    fn log_dialogue(&mut self, lines: impl IntoIterator<Item = String>) {
        self.dialogue.extend(lines);
        let excess = self.dialogue.len().saturating_sub(self.config.dialogue_capacity);
        self.dialogue.drain(..excess);
    }

    /// Consult the ending evaluator and latch the first terminal result.
    fn settle(&mut self) -> Option<Ending> {
        let ending = evaluate(&self.identity, self.quantum_choices.len())?;
        self.meta.record_ending(&ending);
        self.ending = Some(ending.clone());
        Some(ending)
    }

    fn finish_action(&mut self, mut outcome: ActionOutcome) -> ActionOutcome {
        outcome.achievements_unlocked = award(&mut self.identity);
        outcome.events.extend(
            outcome
                .achievements_unlocked
                .iter()
                .map(|&achievement| EngineEvent::AchievementUnlocked { achievement }),
        );
        self.identity.clamp();
        if let Some(message) = &outcome.message {
            self.log_dialogue([message.clone()]);
        }
        outcome.ending = self.settle();
        outcome
    }

    /// Descend one dream layer.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState::MaxDepth`] at depth 10 and
    /// [`InvalidState::GameOver`] after an ending.
    pub fn request_deeper_dream(&mut self) -> EngineResult<ActionOutcome> {
        self.ensure_running()?;
        let descent = descend(&mut self.identity)?;
        self.clock = self.clock.saturating_add(1);

        let mut outcome = ActionOutcome::default();
        let echo = self.echoes.push(DESCENT_ECHO, EchoColor::Purple, self.clock);
        outcome.events.push(EngineEvent::MemoryEcho { echo });
        if descent.entered_deep {
            self.enter_phase(GamePhase::Deep, &mut outcome.events);
            self.raise(SpecialEvent::EnteredDeepDreams, &mut outcome.events);
        }
        Ok(self.finish_action(outcome))
    }

    /// Search for an artifact and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState::GameOver`] after an ending.
    pub fn request_artifact_search(&mut self) -> EngineResult<ActionOutcome> {
        self.ensure_running()?;
        self.clock = self.clock.saturating_add(1);
        let mut outcome = ActionOutcome::default();
        if let Some(find) =
            search_artifact(self.catalog.artifacts(), &mut self.identity, self.rng.as_mut())
        {
            if let Some(factor) = find.artifact.time_effect {
                self.time_distortion = factor;
                outcome.events.push(EngineEvent::TimeDistortion { factor });
            }
            outcome.message = Some(find.message);
        }
        Ok(self.finish_action(outcome))
    }

    /// Invoke an owned dream power.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState::UnownedPower`] for powers the dreamer lacks and
    /// [`InvalidState::GameOver`] after an ending.
    pub fn request_power_use(&mut self, power: &str) -> EngineResult<ActionOutcome> {
        self.ensure_running()?;
        let used = use_power(&mut self.identity, power, self.rng.as_mut())?;
        self.clock = self.clock.saturating_add(1);
        let mut outcome = ActionOutcome {
            message: used.message,
            ..ActionOutcome::default()
        };
        if used.silence_echoes {
            self.echoes.clear();
            outcome.events.push(EngineEvent::EchoesSilenced);
        }
        Ok(self.finish_action(outcome))
    }

    /// Apply one tick of passive degradation. Returns `None` once the dream
    /// has ended.
    ///
    /// Ticks never decide an ending; the next request settles whatever the
    /// decay left behind.
    pub fn tick_degradation(&mut self) -> Option<TickOutcome> {
        if self.ending.is_some() {
            return None;
        }
        let tick = degradation::tick(&mut self.identity, self.rng.as_mut());
        Some(TickOutcome { tick })
    }

    /// Restart the dream from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState::RestartLocked`] when the reached ending forbids
    /// restarting; use [`DreamSession::new_game`] to begin regardless.
    pub fn restart(&mut self) -> EngineResult<()> {
        if let Some(ending) = &self.ending
            && !ending.can_restart
        {
            return Err(InvalidState::RestartLocked.into());
        }
        self.begin();
        Ok(())
    }

    /// Begin a fresh dream regardless of how the last one ended.
    pub fn new_game(&mut self) {
        self.begin();
    }
}
