//! Injectable randomness.
//!
//! Every stochastic decision in the engine draws a unit roll from a named
//! stream. Production sessions use [`RngBundle`], which derives an independent
//! seeded generator per stream; tests substitute [`ScriptedRolls`] to force
//! whichever branch they need.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::{BTreeMap, VecDeque};

/// Named decision points that consume randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollStream {
    SceneSeed,
    LoopOverride,
    QuantumFork,
    QuantumCollapse,
    Artifact,
    Degradation,
    Journal,
    Flavor,
}

impl RollStream {
    pub const ALL: [Self; 8] = [
        Self::SceneSeed,
        Self::LoopOverride,
        Self::QuantumFork,
        Self::QuantumCollapse,
        Self::Artifact,
        Self::Degradation,
        Self::Journal,
        Self::Flavor,
    ];

    const fn domain_tag(self) -> &'static [u8] {
        match self {
            Self::SceneSeed => b"scene-seed",
            Self::LoopOverride => b"loop-override",
            Self::QuantumFork => b"quantum-fork",
            Self::QuantumCollapse => b"quantum-collapse",
            Self::Artifact => b"artifact",
            Self::Degradation => b"degradation",
            Self::Journal => b"journal",
            Self::Flavor => b"flavor",
        }
    }
}

/// Source of unit rolls in `[0, 1)`.
pub trait RandomSource: Send {
    fn roll(&mut self, stream: RollStream) -> f64;
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R: RngCore> CountingRng<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Per-stream seeded generators derived from one user-visible seed.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    scene: CountingRng<ChaCha20Rng>,
    ambient: BTreeMap<RollStream, CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let scene = CountingRng::new(ChaCha20Rng::seed_from_u64(derive_stream_seed(
            seed,
            RollStream::SceneSeed.domain_tag(),
        )));
        let ambient = RollStream::ALL
            .into_iter()
            .filter(|stream| *stream != RollStream::SceneSeed)
            .map(|stream| {
                let rng = SmallRng::seed_from_u64(derive_stream_seed(seed, stream.domain_tag()));
                (stream, CountingRng::new(rng))
            })
            .collect();
        Self {
            seed,
            scene,
            ambient,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws consumed so far on a stream.
    #[must_use]
    pub fn draws(&self, stream: RollStream) -> u64 {
        if stream == RollStream::SceneSeed {
            return self.scene.draws();
        }
        self.ambient.get(&stream).map_or(0, CountingRng::draws)
    }
}

impl RandomSource for RngBundle {
    fn roll(&mut self, stream: RollStream) -> f64 {
        if stream == RollStream::SceneSeed {
            return self.scene.r#gen::<f64>();
        }
        match self.ambient.get_mut(&stream) {
            Some(rng) => rng.r#gen::<f64>(),
            None => self.scene.r#gen::<f64>(),
        }
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so the error branch only guards the API.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Deterministic roll script for tests and replays.
///
/// Rolls queued for a specific stream are consumed first; otherwise the
/// shared queue is used, and once both are empty `fallback` is returned.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    per_stream: BTreeMap<RollStream, VecDeque<f64>>,
    shared: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRolls {
    /// Script that always answers `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            fallback: value,
            ..Self::default()
        }
    }

    /// Queue rolls for one stream.
    #[must_use]
    pub fn with_stream(mut self, stream: RollStream, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.per_stream.entry(stream).or_default().extend(rolls);
        self
    }

    /// Queue rolls consumed by any stream without its own script.
    #[must_use]
    pub fn with_shared(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.shared.extend(rolls);
        self
    }
}

impl RandomSource for ScriptedRolls {
    fn roll(&mut self, stream: RollStream) -> f64 {
        if let Some(value) = self.per_stream.get_mut(&stream).and_then(VecDeque::pop_front) {
            return value;
        }
        self.shared.pop_front().unwrap_or(self.fallback)
    }
}
