//! Progress that outlives a single playthrough.

use crate::ending::{Ending, EndingKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counters shared by every playthrough in a process. Safe to share behind an
/// `Arc` between a session and its background tasks.
#[derive(Debug, Default)]
pub struct MetaProgress {
    playthroughs: AtomicU64,
    total_choices: AtomicU64,
    secret_endings: Mutex<BTreeSet<EndingKind>>,
}

/// Point-in-time copy of [`MetaProgress`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetaSnapshot {
    pub playthroughs: u64,
    pub total_choices: u64,
    pub secret_endings: Vec<EndingKind>,
}

impl MetaProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an accepted choice submission.
    pub fn record_choice(&self) {
        self.total_choices.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished playthrough; special endings join the discovered set.
    pub fn record_ending(&self, ending: &Ending) {
        self.playthroughs.fetch_add(1, Ordering::Relaxed);
        if ending.special {
            self.secret_endings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(ending.kind);
        }
    }

    #[must_use]
    pub fn playthroughs(&self) -> u64 {
        self.playthroughs.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_choices(&self) -> u64 {
        self.total_choices.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn secret_endings(&self) -> Vec<EndingKind> {
        self.secret_endings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetaSnapshot {
        MetaSnapshot {
            playthroughs: self.playthroughs(),
            total_choices: self.total_choices(),
            secret_endings: self.secret_endings(),
        }
    }
}
