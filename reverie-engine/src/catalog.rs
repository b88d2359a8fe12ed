//! Immutable content table: scene templates, boss templates, the temporal
//! loop body and the artifact search table.
//!
//! The built-in catalog is embedded from `assets/catalog.json` and validated
//! once; [`Catalog::from_json`] accepts alternate content with the same checks.

use crate::constants::{DREAM_DEPTH_MAX, EFFECT_MAGNITUDE_MAX};
use crate::data::{BossId, BossTemplate, Choice, LoopTemplate, SceneTemplate};
use crate::error::CatalogError;
use crate::identity::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    scenes: Vec<SceneTemplate>,
    #[serde(default)]
    bosses: Vec<BossTemplate>,
    temporal_loop: LoopTemplate,
    artifacts: Vec<Artifact>,
}

impl Catalog {
    /// Parse and validate catalog content.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the JSON is malformed or the content
    /// breaks a structural rule (no scenes, duplicate ids, bad weights,
    /// unreachable depth gates or dangling boss references).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        log::debug!(
            "catalog loaded: {} scenes, {} bosses, {} artifacts",
            catalog.scenes.len(),
            catalog.bosses.len(),
            catalog.artifacts.len()
        );
        Ok(catalog)
    }

    /// Shared handle to the embedded catalog, parsed on first use.
    ///
    /// # Errors
    ///
    /// Returns the load error if the embedded asset is invalid.
    pub fn builtin() -> Result<Arc<Self>, CatalogError> {
        static BUILTIN: OnceLock<Result<Arc<Catalog>, CatalogError>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Self::from_json(BUILTIN_CATALOG).map(Arc::new))
            .clone()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.scenes.is_empty() {
            return Err(CatalogError::NoScenes);
        }
        if self.artifacts.is_empty() {
            return Err(CatalogError::NoArtifacts);
        }

        let mut boss_ids = BTreeSet::new();
        for template in &self.bosses {
            if !boss_ids.insert(template.boss) {
                return Err(CatalogError::DuplicateBoss(template.boss.key().to_string()));
            }
            check_choices(template.boss.key(), &template.choices, &boss_ids, false)?;
        }

        let mut scene_ids = BTreeSet::new();
        for scene in &self.scenes {
            if !scene_ids.insert(scene.id.as_str()) {
                return Err(CatalogError::DuplicateScene(scene.id.clone()));
            }
            if !scene.weight.is_finite() || scene.weight <= 0.0 {
                return Err(CatalogError::InvalidWeight {
                    scene: scene.id.clone(),
                    weight: scene.weight.to_string(),
                });
            }
            if scene.min_depth > DREAM_DEPTH_MAX {
                return Err(CatalogError::DepthOutOfRange {
                    scene: scene.id.clone(),
                    depth: scene.min_depth,
                });
            }
            check_choices(&scene.id, &scene.choices, &boss_ids, true)?;
        }
        check_choices("temporal_loop", &self.temporal_loop.choices, &boss_ids, true)
    }

    #[must_use]
    pub fn scenes(&self) -> &[SceneTemplate] {
        &self.scenes
    }

    #[must_use]
    pub fn scene(&self, id: &str) -> Option<&SceneTemplate> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    #[must_use]
    pub fn boss(&self, boss: BossId) -> Option<&BossTemplate> {
        self.bosses.iter().find(|template| template.boss == boss)
    }

    #[must_use]
    pub const fn temporal_loop(&self) -> &LoopTemplate {
        &self.temporal_loop
    }

    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}

fn check_choices(
    owner: &str,
    choices: &[Choice],
    bosses: &BTreeSet<BossId>,
    check_bosses: bool,
) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for choice in choices {
        if !seen.insert(choice.id()) {
            return Err(CatalogError::DuplicateChoice {
                scene: owner.to_string(),
                choice: choice.id().to_string(),
            });
        }
        check_magnitudes(owner, choice)?;
        if !check_bosses {
            continue;
        }
        let referenced = choice
            .effects
            .boss_encounter
            .into_iter()
            .chain(choice.requirement.as_ref().and_then(|req| req.boss()));
        for boss in referenced {
            if !bosses.contains(&boss) {
                return Err(CatalogError::UnknownBoss {
                    scene: owner.to_string(),
                    boss: boss.key().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_magnitudes(owner: &str, choice: &Choice) -> Result<(), CatalogError> {
    let effects = &choice.effects;
    let traits = choice
        .traits
        .iter()
        .map(|(kind, value)| (format!("trait {}", kind.key()), *value));
    let removed = effects
        .remove_traits
        .iter()
        .map(|(kind, value)| (format!("remove_traits {}", kind.key()), *value));
    let scalars = [
        ("karma", Some(effects.karma)),
        ("coherence_change", effects.coherence_change),
        ("consciousness", Some(effects.consciousness)),
        ("dream_depth_change", Some(effects.dream_depth_change)),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)));

    for (field, value) in traits.chain(removed).chain(scalars) {
        if !(-EFFECT_MAGNITUDE_MAX..=EFFECT_MAGNITUDE_MAX).contains(&value) {
            return Err(CatalogError::EffectOutOfRange {
                scene: owner.to_string(),
                choice: choice.id().to_string(),
                field,
                value,
            });
        }
    }
    Ok(())
}
