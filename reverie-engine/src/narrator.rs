//! Dream narrator lines, true names and journal phrasing.

use crate::constants::{
    NARRATOR_COHERENCE_ALARM, NARRATOR_CONSCIOUSNESS_ALARM, NARRATOR_DEEP_DEPTH,
    NARRATOR_DRAMATIC_CHANGE, NARRATOR_HIGH_COHERENCE, NARRATOR_KARMA_TIER,
    NARRATOR_LOYAL_COMPANION, NARRATOR_MEDIUM_COHERENCE, TRUE_NAME_HIGH_COHERENCE,
    TRUE_NAME_LOW_COHERENCE, TRUE_NAME_TRAIT_THRESHOLD,
};
use crate::identity::{Identity, QuantumState};
use crate::numbers::unit_to_index;
use crate::resolver::TraitChange;
use crate::rng::{RandomSource, RollStream};

const FALLBACK_LINE: &str = "The dream watches, waiting...";

const NAME_PREFIXES: [&str; 6] = ["Dream", "Echo", "Mirror", "Void", "Star", "Time"];
const KIND_MIDDLES: [&str; 3] = ["heart", "light", "hope"];
const CRUEL_MIDDLES: [&str; 3] = ["shadow", "thorn", "ash"];
const NEUTRAL_MIDDLES: [&str; 3] = ["walker", "seeker", "keeper"];
const WHOLE_SUFFIXES: [&str; 3] = ["eternal", "unbroken", "true"];
const FADING_SUFFIXES: [&str; 3] = ["fading", "lost", "forgotten"];
const DRIFTING_SUFFIXES: [&str; 3] = ["wandering", "shifting", "becoming"];

/// The narrator's reaction to a choice, read from the identity as it was
/// before the choice landed.
#[must_use]
pub fn npc_response(before: &Identity, contradicted: bool, changes: &[TraitChange]) -> String {
    let mut response = String::new();

    if before.coherence > NARRATOR_HIGH_COHERENCE {
        response.push_str(if before.karma > NARRATOR_KARMA_TIER {
            "Your noble spirit shines through the dream. "
        } else if before.karma < -NARRATOR_KARMA_TIER {
            "Your consistent darkness troubles even the shadows. "
        } else {
            "You maintain your center amidst the chaos. "
        });
    } else if before.coherence > NARRATOR_MEDIUM_COHERENCE {
        response.push_str(if contradicted {
            "You contradict yourself... but perhaps that's human. "
        } else {
            "Your image flickers between states of being. "
        });
    } else {
        response.push_str("You're dissolving... becoming dream-stuff... ");
    }

    if let Some(major) = changes
        .iter()
        .find(|change| change.change.saturating_abs() > NARRATOR_DRAMATIC_CHANGE)
    {
        response.push_str(&format!(
            "Such a dramatic shift in your {}! ",
            major.trait_kind.key()
        ));
    }

    if let Some(companion) = before
        .dream_companions
        .iter()
        .find(|companion| companion.loyalty > NARRATOR_LOYAL_COMPANION)
    {
        response.push_str(&format!(
            "Your companion {} nods approvingly. ",
            companion.id
        ));
    }

    if before.dream_depth > NARRATOR_DEEP_DEPTH {
        response.push_str("At this depth, reality bends to your will... or you to its. ");
    }

    if before.quantum_state == QuantumState::Superposition {
        response.push_str("You exist in multiple states simultaneously. Fascinating and terrifying. ");
    }

    if before.coherence < NARRATOR_COHERENCE_ALARM {
        response.push_str("HURRY. Find yourself before you're lost forever! ");
    } else if before.consciousness < NARRATOR_CONSCIOUSNESS_ALARM {
        response.push_str("Your awareness dims. Stay awake! ");
    }

    let trimmed = response.trim_end();
    if trimmed.is_empty() {
        FALLBACK_LINE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn pick<'a>(options: &[&'a str], rng: &mut dyn RandomSource) -> &'a str {
    unit_to_index(rng.roll(RollStream::Flavor), options.len())
        .and_then(|idx| options.get(idx).copied())
        .unwrap_or_default()
}

/// Generate a true name from the dreamer's temperament and coherence.
pub fn true_name(identity: &Identity, rng: &mut dyn RandomSource) -> String {
    let middles = if identity.traits.kind > TRUE_NAME_TRAIT_THRESHOLD {
        &KIND_MIDDLES
    } else if identity.traits.cruel > TRUE_NAME_TRAIT_THRESHOLD {
        &CRUEL_MIDDLES
    } else {
        &NEUTRAL_MIDDLES
    };
    let suffixes = if identity.coherence > TRUE_NAME_HIGH_COHERENCE {
        &WHOLE_SUFFIXES
    } else if identity.coherence < TRUE_NAME_LOW_COHERENCE {
        &FADING_SUFFIXES
    } else {
        &DRIFTING_SUFFIXES
    };
    let prefix = pick(&NAME_PREFIXES, rng);
    let middle = pick(middles, rng);
    let suffix = pick(suffixes, rng);
    format!("{prefix}-{middle}-{suffix}")
}

/// Journal phrasing for a resolved choice.
#[must_use]
pub fn journal_text(choice_text: &str, response: &str) -> String {
    format!("I chose to {}. {response}", choice_text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Companion, TraitKind};
    use crate::rng::ScriptedRolls;

    #[test]
    fn high_coherence_light_karma_opening() {
        let mut identity = Identity::new();
        identity.karma = 60;
        assert_eq!(
            npc_response(&identity, false, &[]),
            "Your noble spirit shines through the dream."
        );
    }

    #[test]
    fn medium_coherence_mentions_contradiction() {
        let mut identity = Identity::new();
        identity.coherence = 55.0;
        let line = npc_response(&identity, true, &[]);
        assert!(line.starts_with("You contradict yourself"));
    }

    #[test]
    fn layered_observations_accumulate_in_order() {
        let mut identity = Identity::new();
        identity.coherence = 15.0;
        identity.dream_depth = 4;
        identity.quantum_state = QuantumState::Superposition;
        let mut loyal = Companion::new("memory_ghost", 0);
        loyal.loyalty = 80;
        identity.dream_companions.push(loyal);
        let changes = [TraitChange {
            trait_kind: TraitKind::Chaotic,
            change: 35,
            new_value: 85,
        }];
        let line = npc_response(&identity, false, &changes);
        let expected = "You're dissolving... becoming dream-stuff... \
            Such a dramatic shift in your chaotic! \
            Your companion memory_ghost nods approvingly. \
            At this depth, reality bends to your will... or you to its. \
            You exist in multiple states simultaneously. Fascinating and terrifying. \
            HURRY. Find yourself before you're lost forever!";
        assert_eq!(line, expected);
    }

    #[test]
    fn low_consciousness_warns_when_coherence_is_fine() {
        let mut identity = Identity::new();
        identity.consciousness = 10.0;
        assert!(npc_response(&identity, false, &[]).ends_with("Stay awake!"));
    }

    #[test]
    fn true_name_follows_temperament() {
        let mut identity = Identity::new();
        identity.traits.kind = 80;
        let mut rolls = ScriptedRolls::constant(0.0);
        assert_eq!(true_name(&identity, &mut rolls), "Dream-heart-eternal");

        identity.traits.kind = 50;
        identity.traits.cruel = 90;
        identity.coherence = 10.0;
        let mut rolls = ScriptedRolls::constant(0.99);
        assert_eq!(true_name(&identity, &mut rolls), "Time-ash-forgotten");
    }

    #[test]
    fn journal_lowercases_choice() {
        assert_eq!(
            journal_text("Touch the mirror", "The dream watches, waiting..."),
            "I chose to touch the mirror. The dream watches, waiting..."
        );
    }
}
