use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Action;

pub const STARTING_HEALTH: i32 = 3;
pub const STARTING_MOMENTUM: f64 = 1.0;
pub const MIN_MOMENTUM: f64 = 0.5;
pub const MAX_MOMENTUM: f64 = 2.0;

pub const RELOAD_BASE_PROBABILITY: f64 = 0.9;
/// Added to the opponent's reload chance when the player let the timer run out.
pub const EXPOSED_RELOAD_BONUS: f64 = 0.2;
pub const RELOAD_MOMENTUM_GAIN: f64 = 0.1;
pub const RELOAD_FAILURE_PENALTY: f64 = 0.2;
pub const HIT_MOMENTUM_GAIN: f64 = 0.3;
pub const BLOCKED_MOMENTUM_PENALTY: f64 = 0.1;

pub const SHIELD_STREAK_FOR_CRIT: u32 = 2;
pub const CRIT_BONUS: f64 = 0.3;
pub const NORMAL_DAMAGE: i32 = 1;
pub const CRIT_DAMAGE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("Player"),
            Side::Opponent => f.write_str("Opponent"),
        }
    }
}

/// Per-combatant duel state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub ammo: u32,
    /// Only true during the round Shield was declared.
    pub shielded: bool,
    /// Probability multiplier, kept within [MIN_MOMENTUM, MAX_MOMENTUM].
    pub momentum: f64,
    pub health: i32,
    /// Consecutive Shield declarations since the last reload or attack.
    pub shield_streak: u32,
    /// Chance that the next Attack is critical; cleared by any Attack.
    pub crit_bonus: f64,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            ammo: 0,
            shielded: false,
            momentum: STARTING_MOMENTUM,
            health: STARTING_HEALTH,
            shield_streak: 0,
            crit_bonus: 0.0,
        }
    }
}

impl Entity {
    pub fn with_ammo(ammo: u32) -> Self {
        Self {
            ammo,
            ..Self::default()
        }
    }

    /// Shift momentum by `delta`, clamping into the allowed band.
    pub fn adjust_momentum(&mut self, delta: f64) {
        self.momentum = (self.momentum + delta).clamp(MIN_MOMENTUM, MAX_MOMENTUM);
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn can_afford(&self, action: Action) -> bool {
        match action {
            Action::Attack => self.ammo > 0,
            Action::Reload | Action::Shield => true,
        }
    }

    pub fn crit_armed(&self) -> bool {
        self.crit_bonus > 0.0
    }
}
