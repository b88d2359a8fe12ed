//! Error types for catalog loading and engine requests.

use thiserror::Error;

/// Configuration problems found while loading scene content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(String),
    #[error("catalog defines no scenes")]
    NoScenes,
    #[error("catalog defines no artifacts")]
    NoArtifacts,
    #[error("duplicate scene id `{0}`")]
    DuplicateScene(String),
    #[error("scene `{scene}` repeats choice `{choice}`")]
    DuplicateChoice { scene: String, choice: String },
    #[error("scene `{scene}` has unusable weight {weight}")]
    InvalidWeight { scene: String, weight: String },
    #[error("scene `{scene}` requires depth {depth}, deeper than the dream allows")]
    DepthOutOfRange { scene: String, depth: u8 },
    #[error("scene `{scene}` references boss `{boss}` with no boss template")]
    UnknownBoss { scene: String, boss: String },
    #[error("duplicate boss template `{0}`")]
    DuplicateBoss(String),
    #[error("choice `{choice}` in `{scene}` carries {field} {value}, outside the allowed range")]
    EffectOutOfRange {
        scene: String,
        choice: String,
        field: String,
        value: i32,
    },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Why a submitted choice was refused. The identity is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("choice costs {cost} but only {available} dream currency is held")]
    InsufficientCurrency { cost: u32, available: u32 },
    #[error("requirement for `{choice}` is not met")]
    RequirementUnmet { choice: String },
    #[error("scene has no choice `{choice}`")]
    UnknownChoice { choice: String },
}

impl RejectReason {
    /// Player-facing line for the dialogue log.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InsufficientCurrency { .. } => {
                "You don't have enough dream currency for this choice."
            }
            Self::RequirementUnmet { .. } => "That path is closed to you.",
            Self::UnknownChoice { .. } => "That path does not exist in this dream.",
        }
    }
}

/// Requests that make no sense in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("dream depth is already at its maximum")]
    MaxDepth,
    #[error("power `{0}` is not owned")]
    UnownedPower(String),
    #[error("the playthrough has already ended")]
    GameOver,
    #[error("the ending does not allow a restart")]
    RestartLocked,
}

impl InvalidState {
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MaxDepth => "You cannot go deeper. This is the abyss of consciousness itself.",
            Self::UnownedPower(_) => "That power does not answer to you.",
            Self::GameOver => "The dream has already ended.",
            Self::RestartLocked => "The dream can no longer hold you.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("choice rejected: {0}")]
    Rejected(#[from] RejectReason),
    #[error("invalid request: {0}")]
    InvalidState(#[from] InvalidState),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl EngineError {
    /// Player-facing line; catalog failures have none worth showing.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Rejected(reason) => Some(reason.user_message()),
            Self::InvalidState(state) => Some(state.user_message()),
            Self::Catalog(_) => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_surface_through_engine_error() {
        let err = EngineError::from(RejectReason::InsufficientCurrency {
            cost: 5,
            available: 3,
        });
        assert_eq!(
            err.user_message(),
            Some("You don't have enough dream currency for this choice.")
        );
        assert!(err.to_string().contains("costs 5"));

        let err = EngineError::from(InvalidState::MaxDepth);
        assert_eq!(
            err.user_message(),
            Some("You cannot go deeper. This is the abyss of consciousness itself.")
        );
    }

    #[test]
    fn json_errors_convert_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(CatalogError::from(err), CatalogError::Parse(_)));
    }
}
