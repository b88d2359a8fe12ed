//! Choice resolution: the ordered state transition from one identity to the next.
//!
//! Resolution is pure with respect to the session. It validates the choice,
//! computes the next identity in a scratch copy and returns it together with
//! everything the session needs for side effects. Nothing is committed unless
//! the whole transition succeeds.

use crate::achievements::{Achievement, award};
use crate::constants::{
    CONSISTENT_COHERENCE_DELTA, CONTRADICTION_COHERENCE_DELTA, DEEP_DREAM_DEPTH,
    FRAGMENT_MEMORY_WINDOW, KARMA_MAX, NOTABLE_TRAIT_CHANGE, QUANTUM_ALTERNATE_PREFIX,
    QUANTUM_COLLAPSE_THRESHOLD, QUANTUM_FORK_COHERENCE_COST, QUANTUM_FORK_THRESHOLD,
    TRAIT_BASELINE, TRAIT_MAX, UNIFICATION_COHERENCE_BONUS,
};
use crate::data::{BossId, Choice, QuantumEffect, Scene, SceneKind};
use crate::error::RejectReason;
use crate::event::SpecialEvent;
use crate::identity::{Fragment, Identity, Memory, QuantumState, TraitKind, Traits};
use crate::numbers::i32_to_f32;
use crate::rng::{RandomSource, RollStream};
use serde::{Deserialize, Serialize};

/// Memory ids that contradict each other when both are chosen.
pub const CONTRADICTION_PAIRS: [(&str, &str); 7] = [
    ("showed_compassion", "chose_indifference"),
    ("reached_for_truth", "avoided_reflection"),
    ("destroyed_history", "created_truth"),
    ("embraced_order", "chose_chaos"),
    ("saved_entity", "destroyed_entity"),
    ("spoke_truth", "told_lie"),
    ("unified_selves", "fragmented_self"),
];

/// A trait swing large enough to be narrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitChange {
    pub trait_kind: TraitKind,
    pub change: i32,
    pub new_value: i32,
}

/// A choice taken while in superposition, paired with its mirrored twin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantumChoice {
    pub chosen: Choice,
    pub alternate: Choice,
    pub at: u64,
}

/// Session facts the resolver reads but does not own.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub scene: &'a Scene,
    pub clock: u64,
    /// `deep_dream` has already been raised this playthrough.
    pub deep_dream_raised: bool,
}

/// Full effect of an applied choice.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChoice {
    pub next: Identity,
    pub choice: Choice,
    pub memory: Memory,
    pub contradictions: Vec<String>,
    pub notable_changes: Vec<TraitChange>,
    pub coherence_delta: f32,
    pub specials: Vec<SpecialEvent>,
    pub achievements: Vec<Achievement>,
    pub gained_power: Option<String>,
    pub defeated_boss: Option<BossId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Superposition split the choice; only half effects landed.
    QuantumFork { next: Identity, record: QuantumChoice },
    Applied(Box<AppliedChoice>),
}

/// Validate and resolve `choice_id` against the current scene.
///
/// # Errors
///
/// Returns a [`RejectReason`] when the id is not in the scene, the choice was
/// materialized as unavailable, or the cost exceeds the held currency. The
/// identity is never touched on rejection.
pub fn resolve_choice(
    identity: &Identity,
    choice_id: &str,
    ctx: &ResolveContext<'_>,
    rng: &mut dyn RandomSource,
) -> Result<Resolution, RejectReason> {
    let presented = ctx
        .scene
        .choice(choice_id)
        .ok_or_else(|| RejectReason::UnknownChoice {
            choice: choice_id.to_string(),
        })?;
    if !presented.available {
        return Err(RejectReason::RequirementUnmet {
            choice: choice_id.to_string(),
        });
    }
    let choice = &presented.choice;
    if choice.effects.cost > identity.dream_currency {
        return Err(RejectReason::InsufficientCurrency {
            cost: choice.effects.cost,
            available: identity.dream_currency,
        });
    }

    if identity.quantum_state == QuantumState::Superposition
        && rng.roll(RollStream::QuantumFork) > QUANTUM_FORK_THRESHOLD
    {
        return Ok(quantum_fork(identity, choice, ctx.clock, rng));
    }

    Ok(Resolution::Applied(Box::new(apply_choice(identity, choice, ctx))))
}

fn quantum_fork(
    identity: &Identity,
    choice: &Choice,
    clock: u64,
    rng: &mut dyn RandomSource,
) -> Resolution {
    let mut next = identity.clone();
    for (kind, delta) in &choice.traits {
        next.traits.adjust(*kind, delta.div_euclid(2));
    }
    next.adjust_coherence(-QUANTUM_FORK_COHERENCE_COST);
    next.quantum_state = if rng.roll(RollStream::QuantumCollapse) > QUANTUM_COLLAPSE_THRESHOLD {
        QuantumState::Collapsed
    } else {
        QuantumState::Superposition
    };
    next.clamp();
    log::debug!(
        "quantum fork on `{}` -> {}",
        choice.memory,
        next.quantum_state.key()
    );
    Resolution::QuantumFork {
        next,
        record: QuantumChoice {
            chosen: choice.clone(),
            alternate: choice.alternate(QUANTUM_ALTERNATE_PREFIX),
            at: clock,
        },
    }
}

/// Memories in `memories` that contradict `memory_id`.
#[must_use]
pub fn find_contradictions(memories: &[Memory], memory_id: &str) -> Vec<String> {
    memories
        .iter()
        .filter(|memory| {
            CONTRADICTION_PAIRS.iter().any(|(a, b)| {
                (memory.id == *a && memory_id == *b) || (memory.id == *b && memory_id == *a)
            })
        })
        .map(|memory| memory.id.clone())
        .collect()
}

/// Average the fragments with the current self: `floor(sum / (n + 1))`, capped at 100.
#[must_use]
pub fn unify(current: &Traits, fragments: &[Fragment]) -> Traits {
    let divisor = i32::try_from(fragments.len())
        .unwrap_or(i32::MAX - 1)
        .saturating_add(1);
    let mut out = *current;
    for kind in TraitKind::ALL {
        let total = fragments
            .iter()
            .fold(current.get(kind), |acc, fragment| {
                acc.saturating_add(fragment.traits.get(kind))
            });
        out.set(kind, total.div_euclid(divisor).min(TRAIT_MAX));
    }
    out
}

fn apply_choice(identity: &Identity, choice: &Choice, ctx: &ResolveContext<'_>) -> AppliedChoice {
    let effects = &choice.effects;
    let mut next = identity.clone();
    let mut specials = Vec::new();

    // Trait deltas, then removal, reset and inversion in that order.
    let mut notable_changes = Vec::new();
    for (kind, delta) in &choice.traits {
        let new_value = next.traits.adjust(*kind, *delta);
        if delta.saturating_abs() > NOTABLE_TRAIT_CHANGE {
            notable_changes.push(TraitChange {
                trait_kind: *kind,
                change: *delta,
                new_value,
            });
        }
    }
    for (kind, amount) in &effects.remove_traits {
        next.traits.adjust(*kind, amount.saturating_abs().saturating_neg());
    }
    if effects.reset_traits {
        next.traits = Traits::uniform(TRAIT_BASELINE);
    }
    if effects.invert_traits {
        next.traits = next.traits.inverted();
    }

    let memory = Memory {
        id: choice.memory.clone(),
        strength: identity.coherence,
        timestamp: ctx.clock,
        traits: choice.traits.clone(),
        scene: ctx.scene.id.clone(),
        dream_depth: identity.dream_depth,
        karma: effects.karma,
        special: effects.special.clone(),
    };

    let contradictions = find_contradictions(&identity.memories, &memory.id);
    let mut coherence_delta = effects.coherence_change.map_or_else(
        || {
            if contradictions.is_empty() {
                CONSISTENT_COHERENCE_DELTA
            } else {
                CONTRADICTION_COHERENCE_DELTA
            }
        },
        i32_to_f32,
    );

    if identity.karma.saturating_add(effects.karma).saturating_abs() > KARMA_MAX {
        specials.push(SpecialEvent::KarmaExtreme);
    }

    if effects.dream_depth_change != 0 {
        let depth = next.shift_depth(effects.dream_depth_change);
        if depth >= DEEP_DREAM_DEPTH && !ctx.deep_dream_raised {
            specials.push(SpecialEvent::DeepDream);
        }
    }

    if effects.fragment_self {
        next.fragmented_self.push(Fragment {
            traits: next.traits,
            split_at: ctx.clock,
            memories: identity.recent_memories(FRAGMENT_MEMORY_WINDOW),
        });
    }
    if effects.unify_selves && !next.fragmented_self.is_empty() {
        next.traits = unify(&next.traits, &next.fragmented_self);
        next.fragmented_self.clear();
        coherence_delta += UNIFICATION_COHERENCE_BONUS;
    }

    let gained_power = effects
        .dream_power
        .as_deref()
        .filter(|power| next.grant_power(power))
        .map(str::to_string);
    for companion in &effects.companions {
        next.recruit(companion, ctx.clock);
    }
    next.dream_currency = next.dream_currency.saturating_add(effects.dream_currency);
    // Affordability was checked against the pre-choice balance.
    next.spend(effects.cost.min(next.dream_currency));
    next.adjust_consciousness(i32_to_f32(effects.consciousness));
    if let Some(effect) = effects.quantum_effect {
        next.quantum_state = match effect {
            QuantumEffect::Stabilize => QuantumState::Stable,
            QuantumEffect::Destabilize => QuantumState::Unstable,
            QuantumEffect::Superposition => QuantumState::Superposition,
        };
    }
    if let Some(artifact) = &effects.artifact {
        next.artifacts.push(artifact.clone());
    }
    if effects.temporal_loop {
        next.temporal_loops = next.temporal_loops.saturating_add(1);
    }
    if let Some(whisper) = &effects.void_whisper {
        next.void_whispers.push(whisper.clone());
    }
    if effects.secret.is_some() {
        next.secrets_found = next.secrets_found.saturating_add(1);
    }
    if let Some(meta) = &effects.metamemory
        && !next.metamemories.contains(meta)
    {
        next.metamemories.push(meta.clone());
    }

    next.adjust_coherence(coherence_delta);
    next.adjust_karma(effects.karma);
    next.push_memory(memory.clone());
    let achievements = award(&mut next);
    next.clamp();

    if let Some(tag) = &effects.special {
        specials.push(SpecialEvent::from_tag(tag));
    }

    let defeated_boss = match ctx.scene.kind {
        SceneKind::Boss(boss) if effects.defeat_boss => Some(boss),
        _ => None,
    };

    log::debug!(
        "choice `{}` in `{}` | coherence {:+.1} karma {:+} contradictions {}",
        choice.memory,
        ctx.scene.id,
        coherence_delta,
        effects.karma,
        contradictions.len()
    );

    AppliedChoice {
        next,
        choice: choice.clone(),
        memory,
        contradictions,
        notable_changes,
        coherence_delta,
        specials,
        achievements,
        gained_power,
        defeated_boss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Effects, SceneChoice};
    use crate::identity::TraitDeltas;
    use crate::rng::ScriptedRolls;

    fn choice(memory: &str, traits: &[(TraitKind, i32)], effects: Effects) -> Choice {
        Choice {
            text: memory.replace('_', " "),
            memory: memory.to_string(),
            traits: traits.iter().copied().collect::<TraitDeltas>(),
            requirement: None,
            effects,
        }
    }

    fn scene_with(choices: Vec<Choice>) -> Scene {
        Scene {
            id: "test_scene".into(),
            kind: SceneKind::Catalog,
            description: String::new(),
            choices: choices
                .into_iter()
                .map(|choice| SceneChoice {
                    choice,
                    available: true,
                })
                .collect(),
        }
    }

    fn applied(identity: &Identity, scene: &Scene, id: &str) -> AppliedChoice {
        let ctx = ResolveContext {
            scene,
            clock: 1,
            deep_dream_raised: false,
        };
        let mut rolls = ScriptedRolls::constant(0.0);
        match resolve_choice(identity, id, &ctx, &mut rolls).unwrap() {
            Resolution::Applied(applied) => *applied,
            Resolution::QuantumFork { .. } => panic!("unexpected fork"),
        }
    }

    #[test]
    fn contradiction_costs_fifteen_coherence() {
        let scene = scene_with(vec![
            choice("reached_for_truth", &[(TraitKind::Brave, 10)], Effects::default()),
            choice("avoided_reflection", &[(TraitKind::Fearful, 10)], Effects::default()),
        ]);
        let first = applied(&Identity::new(), &scene, "reached_for_truth");
        assert!((first.coherence_delta - 5.0).abs() < f32::EPSILON);

        let mut identity = first.next;
        identity.coherence = 80.0;
        let second = applied(&identity, &scene, "avoided_reflection");
        assert_eq!(second.contradictions, vec!["reached_for_truth".to_string()]);
        assert!((second.coherence_delta + 15.0).abs() < f32::EPSILON);
        assert!((second.next.coherence - 65.0).abs() < f32::EPSILON);
    }

    #[test]
    fn insufficient_currency_rejects_without_mutation() {
        let scene = scene_with(vec![choice(
            "purchased_innocence",
            &[(TraitKind::Emotional, 15)],
            Effects {
                cost: 5,
                ..Effects::default()
            },
        )]);
        let mut identity = Identity::new();
        identity.dream_currency = 3;
        let before = identity.clone();
        let ctx = ResolveContext {
            scene: &scene,
            clock: 1,
            deep_dream_raised: false,
        };
        let err = resolve_choice(
            &identity,
            "purchased_innocence",
            &ctx,
            &mut ScriptedRolls::constant(0.0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RejectReason::InsufficientCurrency {
                cost: 5,
                available: 3
            }
        );
        assert_eq!(identity, before);
    }

    #[test]
    fn unknown_and_unavailable_choices_are_rejected() {
        let mut scene = scene_with(vec![choice("waited", &[], Effects::default())]);
        let ctx = ResolveContext {
            scene: &scene,
            clock: 1,
            deep_dream_raised: false,
        };
        let mut rolls = ScriptedRolls::constant(0.0);
        assert!(matches!(
            resolve_choice(&Identity::new(), "nope", &ctx, &mut rolls),
            Err(RejectReason::UnknownChoice { .. })
        ));
        scene.choices[0].available = false;
        let ctx = ResolveContext {
            scene: &scene,
            clock: 1,
            deep_dream_raised: false,
        };
        assert!(matches!(
            resolve_choice(&Identity::new(), "waited", &ctx, &mut rolls),
            Err(RejectReason::RequirementUnmet { .. })
        ));
    }

    #[test]
    fn unify_averages_fragments_with_current_self() {
        let current = Traits::uniform(50);
        let fragments = vec![
            Fragment {
                traits: Traits::uniform(100),
                split_at: 0,
                memories: Default::default(),
            },
            Fragment {
                traits: Traits::uniform(21),
                split_at: 1,
                memories: Default::default(),
            },
        ];
        let merged = unify(&current, &fragments);
        // (50 + 100 + 21) / 3 = 57
        assert_eq!(merged, Traits::uniform(57));
    }

    #[test]
    fn unification_requires_fragments_and_clears_them() {
        let scene = scene_with(vec![choice(
            "unified_selves",
            &[],
            Effects {
                unify_selves: true,
                ..Effects::default()
            },
        )]);
        let identity = Identity::new();
        let none = applied(&identity, &scene, "unified_selves");
        assert!((none.coherence_delta - 5.0).abs() < f32::EPSILON);

        let mut identity = Identity::new();
        identity.coherence = 40.0;
        identity.fragmented_self.push(Fragment {
            traits: Traits::uniform(90),
            split_at: 0,
            memories: Default::default(),
        });
        let merged = applied(&identity, &scene, "unified_selves");
        assert!(merged.next.fragmented_self.is_empty());
        assert_eq!(merged.next.traits, Traits::uniform(70));
        assert!((merged.coherence_delta - 35.0).abs() < f32::EPSILON);
        assert!((merged.next.coherence - 75.0).abs() < f32::EPSILON);
    }

    #[test]
    fn trait_modifiers_apply_in_order() {
        let scene = scene_with(vec![
            choice(
                "sold_fear",
                &[(TraitKind::Brave, 20), (TraitKind::Fearful, -30)],
                Effects {
                    remove_traits: TraitDeltas::from([(TraitKind::Fearful, 20)]),
                    ..Effects::default()
                },
            ),
            choice(
                "became_reflection",
                &[(TraitKind::Chaotic, 40)],
                Effects {
                    invert_traits: true,
                    ..Effects::default()
                },
            ),
        ]);
        let sold = applied(&Identity::new(), &scene, "sold_fear");
        assert_eq!(sold.next.traits.fearful, 0);
        assert_eq!(sold.next.traits.brave, 70);
        assert_eq!(sold.notable_changes.len(), 2);

        let swapped = applied(&Identity::new(), &scene, "became_reflection");
        assert_eq!(swapped.next.traits.chaotic, 10);
        assert_eq!(swapped.next.traits.kind, 50);
    }

    #[test]
    fn quantum_fork_applies_half_effects_and_records_twin() {
        let scene = scene_with(vec![choice(
            "severed_possibility",
            &[(TraitKind::Cruel, 15), (TraitKind::Brave, -15)],
            Effects {
                karma: -20,
                ..Effects::default()
            },
        )]);
        let mut identity = Identity::new();
        identity.quantum_state = QuantumState::Superposition;
        let ctx = ResolveContext {
            scene: &scene,
            clock: 9,
            deep_dream_raised: false,
        };
        let mut rolls = ScriptedRolls::constant(0.0)
            .with_stream(RollStream::QuantumFork, [0.6])
            .with_stream(RollStream::QuantumCollapse, [0.8]);
        let Resolution::QuantumFork { next, record } =
            resolve_choice(&identity, "severed_possibility", &ctx, &mut rolls).unwrap()
        else {
            panic!("expected fork");
        };
        assert_eq!(next.traits.cruel, 57);
        assert_eq!(next.traits.brave, 42);
        assert!((next.coherence - 90.0).abs() < f32::EPSILON);
        assert_eq!(next.quantum_state, QuantumState::Collapsed);
        assert_eq!(next.karma, 0);
        assert!(next.memories.is_empty());
        assert_eq!(record.alternate.memory, "anti_severed_possibility");
        assert_eq!(record.alternate.effects.karma, 20);
        assert_eq!(record.at, 9);
    }

    #[test]
    fn karma_extreme_and_deep_dream_are_raised() {
        let scene = scene_with(vec![choice(
            "infinite_expansion",
            &[],
            Effects {
                karma: -50,
                dream_depth_change: 3,
                ..Effects::default()
            },
        )]);
        let mut identity = Identity::new();
        identity.karma = -60;
        identity.dream_depth = 3;
        let out = applied(&identity, &scene, "infinite_expansion");
        assert!(out.specials.contains(&SpecialEvent::KarmaExtreme));
        assert!(out.specials.contains(&SpecialEvent::DeepDream));
        assert_eq!(out.next.karma, -100);
        assert_eq!(out.next.dream_depth, 6);
        assert!(out.achievements.contains(&Achievement::Nightmare));
        assert!(out.achievements.contains(&Achievement::DeepDreamer));
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_overflowing() {
        let scene = scene_with(vec![choice(
            "shattered_scale",
            &[(TraitKind::Kind, i32::MIN), (TraitKind::Cruel, i32::MAX)],
            Effects {
                karma: i32::MIN,
                remove_traits: TraitDeltas::from([(TraitKind::Brave, i32::MIN)]),
                ..Effects::default()
            },
        )]);
        let out = applied(&Identity::new(), &scene, "shattered_scale");
        assert_eq!(out.next.traits.kind, 0);
        assert_eq!(out.next.traits.cruel, 100);
        assert_eq!(out.next.traits.brave, 0);
        assert_eq!(out.next.karma, -100);
        assert!(out.specials.contains(&SpecialEvent::KarmaExtreme));
        assert_eq!(out.notable_changes.len(), 2);

        let mut identity = Identity::new();
        identity.quantum_state = QuantumState::Superposition;
        let ctx = ResolveContext {
            scene: &scene,
            clock: 2,
            deep_dream_raised: false,
        };
        let mut rolls = ScriptedRolls::constant(0.0).with_stream(RollStream::QuantumFork, [0.9]);
        let Resolution::QuantumFork { next, record } =
            resolve_choice(&identity, "shattered_scale", &ctx, &mut rolls).unwrap()
        else {
            panic!("expected fork");
        };
        assert_eq!(record.alternate.effects.karma, i32::MAX);
        assert_eq!(record.alternate.traits[&TraitKind::Kind], i32::MAX);
        assert_eq!(next.traits.kind, 0);
    }

    #[test]
    fn fragmentation_snapshots_adjusted_traits_and_recent_memories() {
        let scene = scene_with(vec![choice(
            "fragmented_self",
            &[(TraitKind::Chaotic, 30)],
            Effects {
                fragment_self: true,
                invert_traits: true,
                ..Effects::default()
            },
        )]);
        let mut identity = Identity::new();
        for i in 0..7 {
            identity.push_memory(Memory {
                id: format!("memory_{i}"),
                strength: 100.0,
                timestamp: i,
                traits: TraitDeltas::new(),
                scene: "earlier".into(),
                dream_depth: 0,
                karma: 0,
                special: None,
            });
        }
        let out = applied(&identity, &scene, "fragmented_self");
        assert_eq!(out.next.fragmented_self.len(), 1);
        let fragment = &out.next.fragmented_self[0];
        assert_eq!(fragment.traits.chaotic, 20);
        assert_eq!(fragment.traits.kind, 50);
        assert_eq!(fragment.traits, out.next.traits);
        assert_eq!(fragment.split_at, 1);
        let ids: Vec<&str> = fragment.memories.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            ["memory_2", "memory_3", "memory_4", "memory_5", "memory_6"]
        );
    }

    #[test]
    fn reset_overrides_every_trait_even_when_inverted() {
        let scene = scene_with(vec![
            choice(
                "forgot_everything",
                &[(TraitKind::Brave, 40), (TraitKind::Deceptive, -30)],
                Effects {
                    reset_traits: true,
                    ..Effects::default()
                },
            ),
            choice(
                "turned_inside_out",
                &[(TraitKind::Brave, 40)],
                Effects {
                    reset_traits: true,
                    invert_traits: true,
                    ..Effects::default()
                },
            ),
        ]);
        let mut identity = Identity::new();
        identity.traits.set(TraitKind::Logical, 95);
        let reset = applied(&identity, &scene, "forgot_everything");
        assert_eq!(reset.next.traits, Traits::uniform(50));
        // Notable swings are still reported from the raw deltas.
        assert_eq!(reset.notable_changes.len(), 2);

        let both = applied(&identity, &scene, "turned_inside_out");
        assert_eq!(both.next.traits, Traits::uniform(50));
    }

    #[test]
    fn quantum_effects_map_onto_states() {
        let cases = [
            (QuantumEffect::Stabilize, QuantumState::Stable),
            (QuantumEffect::Destabilize, QuantumState::Unstable),
            (QuantumEffect::Superposition, QuantumState::Superposition),
        ];
        for (effect, expected) in cases {
            let scene = scene_with(vec![choice(
                "touched_the_lattice",
                &[],
                Effects {
                    quantum_effect: Some(effect),
                    ..Effects::default()
                },
            )]);
            let out = applied(&Identity::new(), &scene, "touched_the_lattice");
            assert_eq!(out.next.quantum_state, expected, "{effect:?}");
        }
    }

    #[test]
    fn consciousness_shift_is_clamped() {
        let scene = scene_with(vec![
            choice(
                "woke_within",
                &[],
                Effects {
                    consciousness: 40,
                    ..Effects::default()
                },
            ),
            choice(
                "sank_under",
                &[],
                Effects {
                    consciousness: -250,
                    ..Effects::default()
                },
            ),
        ]);
        let mut identity = Identity::new();
        identity.consciousness = 80.0;
        let up = applied(&identity, &scene, "woke_within");
        assert!((up.next.consciousness - 100.0).abs() < f32::EPSILON);
        let down = applied(&identity, &scene, "sank_under");
        assert!(down.next.consciousness.abs() < f32::EPSILON);
    }

    #[test]
    fn resources_are_deduplicated() {
        let scene = scene_with(vec![choice(
            "liberated_identities",
            &[],
            Effects {
                companions: vec!["freed_self_1".into(), "freed_self_1".into()],
                dream_power: Some("timeline_sight".into()),
                dream_currency: 10,
                cost: 4,
                secret: Some("name_magic".into()),
                ..Effects::default()
            },
        )]);
        let mut identity = Identity::new();
        identity.dream_currency = 4;
        let first = applied(&identity, &scene, "liberated_identities");
        assert_eq!(first.gained_power.as_deref(), Some("timeline_sight"));
        assert_eq!(first.next.dream_companions.len(), 1);
        assert_eq!(first.next.dream_currency, 10);
        assert_eq!(first.next.secrets_found, 1);

        let second = applied(&first.next, &scene, "liberated_identities");
        assert_eq!(second.gained_power, None);
        assert_eq!(second.next.dream_powers.len(), 1);
    }
}
