use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod combat;
pub mod config;
pub mod content;
pub mod entity;
pub mod error;
pub mod policy;
pub mod probability;
pub mod session;

pub use combat::actions::Action;
pub use combat::resolve::{AttackOutcome, ReloadOutcome, RoundReport};
pub use config::DuelConfig;
pub use entity::{Entity, Side};
pub use error::DuelError;
pub use probability::{roll_success, ProbabilityRoll};
pub use session::{MatchSession, Phase};

/// Source of uniform draws in `[0, 1)`.
///
/// Everything random in a duel (reload rolls, crit rolls, opponent choices)
/// pulls from one of these, so a session is reproducible from its source.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<f64>, next: usize },
}

pub struct Dice {
    source: Source,
    draws: usize,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)),
            draws: 0,
        }
    }

    /// Replays `values` in order, wrapping around when exhausted.
    /// An empty script always yields 0.0.
    pub fn from_scripted(values: Vec<f64>) -> Self {
        Self {
            source: Source::Scripted { values, next: 0 },
            draws: 0,
        }
    }

    /// Number of draws taken so far, seeded or scripted.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for Dice {
    fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0.0..1.0),
            Source::Scripted { values, next } => {
                if values.is_empty() {
                    return 0.0;
                }
                let value = values[*next % values.len()];
                *next += 1;
                value
            }
        }
    }
}
