use std::fmt;

use crate::{Entity, RandomSource};

/// Outcome of a momentum-weighted success roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityRoll {
    pub base: f64,
    pub momentum: f64,
    /// `min(base * momentum, 1.0)`
    pub effective: f64,
    pub roll: f64,
    pub success: bool,
}

impl fmt::Display for ProbabilityRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let momentum_pct = (self.momentum - 1.0) * 100.0;
        write!(
            f,
            "{:.0}% base {}{:.0}% momentum = {:.0}%",
            self.base * 100.0,
            if momentum_pct >= 0.0 { "+" } else { "-" },
            momentum_pct.abs(),
            self.effective * 100.0
        )
    }
}

/// Roll against `base_probability` scaled by the entity's momentum.
/// Reads the entity, never writes it.
pub fn roll_success<R: RandomSource + ?Sized>(
    entity: &Entity,
    base_probability: f64,
    rng: &mut R,
) -> ProbabilityRoll {
    let effective = (base_probability * entity.momentum).min(1.0);
    let roll = rng.next_unit();
    ProbabilityRoll {
        base: base_probability,
        momentum: entity.momentum,
        effective,
        roll,
        success: roll < effective,
    }
}
