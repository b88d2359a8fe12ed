//! Scene selection and materialization.
use crate::catalog::Catalog;
use crate::constants::{
    BOSS_SCENE_PREFIX, BOSS_TRIGGER_WEIGHT, SCENE_POOL_ID, TEMPORAL_LOOP_SCENE_ID,
    TEMPORAL_LOOP_THRESHOLD,
};
use crate::data::{
    BossId, BossProgress, Choice, ConditionContext, GamePhase, Scene, SceneChoice, SceneKind,
    SceneTemplate, TextSegment, render_description,
};
use crate::event::{EventDecisionTrace, WeightedCandidate};
use crate::identity::Identity;
use crate::rng::{RandomSource, RollStream};

pub struct SelectionRequest<'a> {
    pub catalog: &'a Catalog,
    pub identity: &'a Identity,
    pub phase: GamePhase,
    pub bosses: &'a BossProgress,
    /// A `boss_trigger` special event is pending.
    pub boss_trigger: bool,
}

impl SelectionRequest<'_> {
    const fn context(&self) -> ConditionContext<'_> {
        ConditionContext {
            identity: self.identity,
            bosses: self.bosses,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePick {
    pub scene: Scene,
    /// True when filtering left nothing and the first catalog entry was used.
    pub content_gap: bool,
    pub decision_trace: Option<EventDecisionTrace>,
}

#[derive(Clone, Copy)]
enum Candidate<'a> {
    Scene(&'a SceneTemplate),
    Boss(BossId),
}

impl Candidate<'_> {
    fn id(&self) -> String {
        match self {
            Self::Scene(template) => template.id.clone(),
            Self::Boss(boss) => boss_scene_id(*boss),
        }
    }

    const fn weight(&self) -> f64 {
        match self {
            Self::Scene(template) => template.weight,
            Self::Boss(_) => BOSS_TRIGGER_WEIGHT,
        }
    }
}

#[must_use]
pub fn boss_scene_id(boss: BossId) -> String {
    format!("{BOSS_SCENE_PREFIX}{}", boss.key())
}

/// Pick the next scene.
///
/// Precedence: a pending boss trigger adds the mirror boss to the pool with a
/// heavy weight; otherwise an active temporal loop may replace the pick
/// outright; otherwise catalog scenes gated by depth and phase are sampled by
/// linear scan.
pub fn select_scene(request: &SelectionRequest<'_>, rng: &mut dyn RandomSource) -> ScenePick {
    let catalog = request.catalog;
    let mut candidates: Vec<Candidate<'_>> = catalog
        .scenes()
        .iter()
        .filter(|scene| {
            scene.min_depth <= request.identity.dream_depth && scene.phase.admits(request.phase)
        })
        .map(Candidate::Scene)
        .collect();

    if request.boss_trigger {
        if catalog.boss(BossId::MirrorSelf).is_some() {
            candidates.push(Candidate::Boss(BossId::MirrorSelf));
        }
    } else if request.identity.temporal_loops > 0
        && rng.roll(RollStream::LoopOverride) > TEMPORAL_LOOP_THRESHOLD
    {
        log::debug!(
            "scene selection | temporal loop override (loops: {})",
            request.identity.temporal_loops
        );
        return ScenePick {
            scene: temporal_loop_scene(catalog, &request.context(), rng),
            content_gap: false,
            decision_trace: None,
        };
    }

    let content_gap = candidates.is_empty();
    if content_gap {
        log::warn!(
            "scene selection | no scene admits depth {} in phase {:?}; using first catalog entry",
            request.identity.dream_depth,
            request.phase
        );
        candidates.extend(catalog.scenes().first().map(Candidate::Scene));
    }

    let seed = rng.roll(RollStream::SceneSeed);
    let weights: Vec<f64> = candidates.iter().map(Candidate::weight).collect();
    let chosen_idx = weighted_pick(&weights, seed).unwrap_or(0);
    let ctx = request.context();
    let Some(chosen) = candidates.get(chosen_idx).copied() else {
        // Unreachable for validated catalogs, which always hold a scene.
        return ScenePick {
            scene: temporal_loop_scene(catalog, &ctx, rng),
            content_gap: true,
            decision_trace: None,
        };
    };

    let decision_trace = Some(EventDecisionTrace {
        pool_id: SCENE_POOL_ID.to_string(),
        roll: seed,
        candidates: candidates
            .iter()
            .map(|candidate| WeightedCandidate {
                id: candidate.id(),
                weight: candidate.weight(),
            })
            .collect(),
        chosen_id: chosen.id(),
    });

    log::debug!(
        "scene selection | phase:{:?} depth:{} candidates:{} roll:{seed:.3} chosen:{}",
        request.phase,
        request.identity.dream_depth,
        candidates.len(),
        chosen.id()
    );

    let scene = match chosen {
        Candidate::Scene(template) => materialize(
            template.id.clone(),
            SceneKind::Catalog,
            &template.description,
            &template.choices,
            &ctx,
            rng,
        ),
        Candidate::Boss(boss) => match boss_scene(catalog, boss, &ctx, rng) {
            Some(scene) => scene,
            None => temporal_loop_scene(catalog, &ctx, rng),
        },
    };

    ScenePick {
        scene,
        content_gap,
        decision_trace,
    }
}

/// Linear-scan weighted sampling: scale the seed by the total weight and
/// subtract weights in order until the remainder is non-positive.
#[must_use]
pub fn weighted_pick(weights: &[f64], seed: f64) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    let mut remaining = seed * total;
    for (idx, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(idx);
        }
    }
    Some(0)
}

/// Materialize a boss scene, if the catalog defines one for `boss`.
pub fn boss_scene(
    catalog: &Catalog,
    boss: BossId,
    ctx: &ConditionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Scene> {
    let template = catalog.boss(boss)?;
    Some(materialize(
        boss_scene_id(boss),
        SceneKind::Boss(boss),
        &template.description,
        &template.choices,
        ctx,
        rng,
    ))
}

/// Materialize the procedural temporal-loop scene for the current loop count.
pub fn temporal_loop_scene(
    catalog: &Catalog,
    ctx: &ConditionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Scene {
    let template = catalog.temporal_loop();
    materialize(
        TEMPORAL_LOOP_SCENE_ID.to_string(),
        SceneKind::TemporalLoop,
        &template.description,
        &template.choices,
        ctx,
        rng,
    )
}

/// Render a template against the identity. Requirements are evaluated once
/// here and failing choices stay visible but unavailable.
pub fn materialize(
    id: String,
    kind: SceneKind,
    description: &[TextSegment],
    choices: &[Choice],
    ctx: &ConditionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Scene {
    let choices = choices
        .iter()
        .map(|choice| {
            let mut choice = choice.clone();
            if let Some(chance) = choice.effects.temporal_loop_chance
                && rng.roll(RollStream::Flavor) > 1.0 - chance
            {
                choice.effects.temporal_loop = true;
            }
            let available = choice
                .requirement
                .as_ref()
                .is_none_or(|requirement| requirement.holds(ctx));
            SceneChoice { choice, available }
        })
        .collect();
    Scene {
        id,
        kind,
        description: render_description(description, ctx),
        choices,
    }
}
