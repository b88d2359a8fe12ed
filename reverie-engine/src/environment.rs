//! Ambient world state derived from the identity.
//!
//! The environment is a pure projection: it is recomputed from the identity
//! whenever a presentation layer asks, then any advisory override a choice
//! carried is laid on top.

use crate::constants::{
    COLOR_SHIFT_PER_COHERENCE, FOUR_D_DEPTH, GLITCH_COHERENCE_STEP, GRAVITY_PER_DEPTH,
    GRAVITY_PER_GLITCH, REALITY_FLUID, REALITY_FRACTURED, REALITY_STABLE, STAT_MAX,
    TEMPERATURE_TRAIT, TIME_FLOW_BACKWARDS_COHERENCE, TIME_FLOW_LOOPED_LOOPS, WEATHER_KARMA,
};
use crate::data::{EnvironmentOverride, Reality, TimeFlow};
use crate::identity::Identity;
use crate::numbers::{floor_f32_to_i32, i32_to_f32};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "3D")]
    Three,
    #[serde(rename = "4D")]
    Four,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Stormy,
    Foggy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Neutral,
    Warm,
    Cold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub glitch_level: i32,
    pub gravity: f32,
    pub time_flow: TimeFlow,
    pub color_shift: f32,
    pub reality: Reality,
    pub dimension: Dimension,
    pub weather: Weather,
    pub temperature: Temperature,
}

impl Environment {
    #[must_use]
    pub fn derive(identity: &Identity) -> Self {
        let instability = STAT_MAX - identity.coherence;
        let glitch_level = floor_f32_to_i32(instability / GLITCH_COHERENCE_STEP);
        let gravity = GRAVITY_PER_DEPTH.mul_add(
            f32::from(identity.dream_depth),
            GRAVITY_PER_GLITCH.mul_add(-i32_to_f32(glitch_level), 1.0),
        );

        let time_flow = if identity.coherence < TIME_FLOW_BACKWARDS_COHERENCE {
            TimeFlow::Backwards
        } else if identity.temporal_loops > TIME_FLOW_LOOPED_LOOPS {
            TimeFlow::Looped
        } else {
            TimeFlow::Forward
        };

        let reality = if identity.coherence > REALITY_STABLE {
            Reality::Stable
        } else if identity.coherence > REALITY_FLUID {
            Reality::Fluid
        } else if identity.coherence > REALITY_FRACTURED {
            Reality::Fractured
        } else {
            Reality::Dissolved
        };

        let weather = if identity.karma > WEATHER_KARMA {
            Weather::Stormy
        } else if identity.karma < -WEATHER_KARMA {
            Weather::Foggy
        } else {
            Weather::Clear
        };

        let temperature = if identity.traits.emotional > TEMPERATURE_TRAIT {
            Temperature::Warm
        } else if identity.traits.logical > TEMPERATURE_TRAIT {
            Temperature::Cold
        } else {
            Temperature::Neutral
        };

        Self {
            glitch_level,
            gravity,
            time_flow,
            color_shift: instability.mul_add(COLOR_SHIFT_PER_COHERENCE, i32_to_f32(identity.karma)),
            reality,
            dimension: if identity.dream_depth > FOUR_D_DEPTH {
                Dimension::Four
            } else {
                Dimension::Three
            },
            weather,
            temperature,
        }
    }

    /// Lay a choice's advisory override on top of the derived state.
    #[must_use]
    pub fn with_override(mut self, change: Option<&EnvironmentOverride>) -> Self {
        if let Some(change) = change {
            if let Some(reality) = change.reality {
                self.reality = reality;
            }
            if let Some(time_flow) = change.time_flow {
                self.time_flow = time_flow;
            }
        }
        self
    }
}
