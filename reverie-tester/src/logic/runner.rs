use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;
use reverie_engine::{DreamSession, EndingKind, EngineError, Identity, InvalidState};
use serde::{Deserialize, Serialize};

use super::policy::{PlayerAction, Strategy};

/// How a single automated playthrough is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub strategy: Strategy,
    pub max_steps: usize,
    /// Passive degradation ticks applied after every action.
    pub ticks_per_step: u32,
}

/// Outcome of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub strategy: Strategy,
    pub steps: usize,
    pub rejections: usize,
    pub ending: Option<EndingKind>,
    pub ending_title: Option<String>,
    pub coherence: f32,
    pub karma: i32,
    pub dream_depth: u8,
    pub quantum_forks: usize,
    /// xxhash64 digest of the final identity.
    pub fingerprint: u64,
    pub violations: Vec<String>,
}

/// Aggregate over every iteration of one seed and strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub strategy: Strategy,
    pub seed: u64,
    pub passed: bool,
    pub runs: Vec<RunSummary>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

impl ScenarioResult {
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} / seed {}", self.strategy, self.seed)
    }

    #[must_use]
    pub fn endings_reached(&self) -> usize {
        self.runs.iter().filter(|run| run.ending.is_some()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = String> + '_ {
        self.runs.iter().flat_map(|run| {
            run.violations
                .iter()
                .map(move |violation| format!("seed {}: {violation}", run.seed))
        })
    }
}

/// Bound checks that must hold after every engine call.
#[must_use]
pub fn check_bounds(identity: &Identity) -> Vec<String> {
    let mut violations = Vec::new();
    for (kind, value) in identity.traits.iter() {
        if !(0..=100).contains(&value) {
            violations.push(format!("trait {} out of range: {value}", kind.key()));
        }
    }
    for (name, value) in [
        ("coherence", identity.coherence),
        ("consciousness", identity.consciousness),
        ("reality_anchor", identity.reality_anchor),
    ] {
        if !(0.0..=100.0).contains(&value) {
            violations.push(format!("{name} out of range: {value}"));
        }
    }
    if !(-100..=100).contains(&identity.karma) {
        violations.push(format!("karma out of range: {}", identity.karma));
    }
    if identity.dream_depth > 10 {
        violations.push(format!("dream depth out of range: {}", identity.dream_depth));
    }
    if identity.memories.len() > 30 {
        violations.push(format!("{} memories held", identity.memories.len()));
    }
    let powers: BTreeSet<_> = identity.dream_powers.iter().collect();
    if powers.len() != identity.dream_powers.len() {
        violations.push("duplicate dream power".to_string());
    }
    let companions: BTreeSet<_> = identity.dream_companions.iter().map(|c| &c.id).collect();
    if companions.len() != identity.dream_companions.len() {
        violations.push("duplicate companion".to_string());
    }
    let achievements: BTreeSet<_> = identity.achievements.iter().map(|a| a.key()).collect();
    if achievements.len() != identity.achievements.len() {
        violations.push("duplicate achievement".to_string());
    }
    violations
}

pub struct Runner {
    verbose: bool,
}

impl Runner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Play one dream to an ending or the step cap.
    ///
    /// # Errors
    ///
    /// Fails only when the engine cannot load its catalog.
    pub fn run_once(&self, plan: &RunPlan, seed: u64) -> Result<RunSummary> {
        let mut session = DreamSession::new(seed)
            .with_context(|| format!("failed to start a dream for seed {seed}"))?;
        let mut policy = plan.strategy.create_policy(seed);
        let mut violations = Vec::new();
        let mut rejections = 0;
        let mut steps = 0;

        while steps < plan.max_steps && session.ending().is_none() {
            steps += 1;
            let decision = policy.decide(session.snapshot(), session.current_scene());
            log::trace!(
                "{} step {steps}: {:?} ({})",
                policy.name(),
                decision.action,
                decision.rationale.as_deref().unwrap_or("-")
            );
            let result = match &decision.action {
                PlayerAction::Choose(id) => session.submit_choice(id).map(|_| ()),
                PlayerAction::DeeperDream => session.request_deeper_dream().map(|_| ()),
                PlayerAction::SearchArtifact => session.request_artifact_search().map(|_| ()),
                PlayerAction::UsePower(power) => session.request_power_use(power).map(|_| ()),
            };
            match result {
                Ok(()) => {}
                Err(EngineError::Catalog(err)) => return Err(err.into()),
                // Decay between steps left an ending for this request to settle.
                Err(EngineError::InvalidState(InvalidState::GameOver)) => {}
                Err(err) => {
                    rejections += 1;
                    log::debug!("{} step {steps}: {err}", policy.name());
                }
            }
            for _ in 0..plan.ticks_per_step {
                if session.tick_degradation().is_none() {
                    break;
                }
            }
            violations.extend(
                check_bounds(session.snapshot())
                    .into_iter()
                    .map(|violation| format!("step {steps}: {violation}")),
            );
        }

        let identity = session.snapshot();
        let summary = RunSummary {
            seed,
            strategy: plan.strategy,
            steps,
            rejections,
            ending: session.ending().map(|ending| ending.kind),
            ending_title: session.ending().map(|ending| ending.title.clone()),
            coherence: identity.coherence,
            karma: identity.karma,
            dream_depth: identity.dream_depth,
            quantum_forks: session.quantum_choices().len(),
            fingerprint: identity.fingerprint(),
            violations,
        };
        if self.verbose {
            println!(
                "   {} seed {} -> {} after {} steps",
                policy.name().bright_white(),
                seed,
                summary
                    .ending_title
                    .as_deref()
                    .unwrap_or("no ending"),
                summary.steps
            );
        }
        Ok(summary)
    }

    /// Run `iterations` consecutive seeds starting at `seed`.
    ///
    /// # Errors
    ///
    /// Propagates engine start-up failures.
    pub fn run_scenario(
        &self,
        plan: &RunPlan,
        seed: u64,
        iterations: usize,
    ) -> Result<ScenarioResult> {
        let mut runs = Vec::with_capacity(iterations);
        let mut durations = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let start = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            runs.push(self.run_once(plan, iteration_seed)?);
            durations.push(start.elapsed());
        }
        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };
        Ok(ScenarioResult {
            strategy: plan.strategy,
            seed,
            passed: runs.iter().all(|run| run.violations.is_empty()),
            runs,
            average_duration,
        })
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_micros)
    }
}
