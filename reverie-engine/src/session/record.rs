//! Presentation-side records a session keeps alongside the identity.

use crate::event::{EchoColor, MemoryEcho};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
    pub at: u64,
    pub coherence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karma: Option<i32>,
}

/// How a scene's inhabitants feel about the dreamer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    pub last_choice: String,
    /// Accumulated karma / 10 of every choice made in the scene.
    pub relationship: f32,
    pub encounters: u32,
}

/// Bounded log of floating memory echoes; the oldest drops first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EchoLog {
    capacity: usize,
    echoes: VecDeque<MemoryEcho>,
}

impl EchoLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            echoes: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an echo and return a copy for event emission.
    pub fn push(&mut self, text: impl Into<String>, color: EchoColor, at: u64) -> MemoryEcho {
        let echo = MemoryEcho {
            text: text.into(),
            color,
            at,
        };
        self.echoes.push_back(echo.clone());
        while self.echoes.len() > self.capacity {
            self.echoes.pop_front();
        }
        echo
    }

    pub fn clear(&mut self) {
        self.echoes.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.echoes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.echoes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryEcho> {
        self.echoes.iter()
    }
}
