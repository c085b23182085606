use thiserror::Error;

use crate::{Action, Phase, Side};

/// Contract violations reported by a [`crate::MatchSession`].
///
/// None of these mutate session state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DuelError {
    #[error("{side} cannot declare {action}: {reason}")]
    InvalidAction {
        side: Side,
        action: Action,
        reason: &'static str,
    },

    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
