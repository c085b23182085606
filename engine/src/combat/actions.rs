use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three moves available to either side each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Gain one ammo (FETCH).
    Reload,
    /// Block incoming attacks this round (ENCRYPT).
    Shield,
    /// Spend one ammo to hit the other side (PUSH).
    Attack,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Reload, Action::Shield, Action::Attack];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Reload => f.write_str("RELOAD"),
            Action::Shield => f.write_str("SHIELD"),
            Action::Attack => f.write_str("ATTACK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}' (expected reload, shield or attack)")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reload" | "fetch" | "r" => Ok(Action::Reload),
            "shield" | "encrypt" | "s" => Ok(Action::Shield),
            "attack" | "push" | "a" => Ok(Action::Attack),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
