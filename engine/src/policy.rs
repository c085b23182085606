//! Scripted opponent decision rules.
//!
//! The opponent's behavior is an ordered table: the first rule whose
//! predicate matches picks the action distribution for the round.

use crate::{Action, Entity, RandomSource};

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// `(opponent, player) -> bool`
    pub applies: fn(&Entity, &Entity) -> bool,
    /// Weighted choices; weights sum to 1.0 and the last entry absorbs rounding.
    pub choices: &'static [(Action, f64)],
}

fn last_stand(opponent: &Entity, player: &Entity) -> bool {
    opponent.health <= 1 && player.ammo > 0
}

fn punish_unarmed(opponent: &Entity, player: &Entity) -> bool {
    player.ammo == 0 && opponent.ammo > 0
}

fn rearm_safely(_opponent: &Entity, player: &Entity) -> bool {
    player.ammo == 0
}

fn press_advantage(opponent: &Entity, _player: &Entity) -> bool {
    opponent.ammo >= 2
}

fn recover_ammo(opponent: &Entity, _player: &Entity) -> bool {
    opponent.ammo == 0
}

fn always(_opponent: &Entity, _player: &Entity) -> bool {
    true
}

pub const OPPONENT_RULES: &[Rule] = &[
    Rule {
        name: "last_stand",
        applies: last_stand,
        choices: &[(Action::Shield, 0.8), (Action::Reload, 0.2)],
    },
    // An unarmed player is never shielded against.
    Rule {
        name: "punish_unarmed",
        applies: punish_unarmed,
        choices: &[(Action::Attack, 1.0)],
    },
    Rule {
        name: "rearm_safely",
        applies: rearm_safely,
        choices: &[(Action::Reload, 1.0)],
    },
    Rule {
        name: "press_advantage",
        applies: press_advantage,
        choices: &[(Action::Attack, 0.7), (Action::Shield, 0.3)],
    },
    Rule {
        name: "recover_ammo",
        applies: recover_ammo,
        choices: &[(Action::Reload, 0.7), (Action::Shield, 0.3)],
    },
    Rule {
        name: "balanced",
        applies: always,
        choices: &[
            (Action::Attack, 0.5),
            (Action::Reload, 0.3),
            (Action::Shield, 0.2),
        ],
    },
];

/// The first rule in [`OPPONENT_RULES`] that matches.
pub fn matching_rule(opponent: &Entity, player: &Entity) -> &'static Rule {
    OPPONENT_RULES
        .iter()
        .find(|rule| (rule.applies)(opponent, player))
        .unwrap_or(&OPPONENT_RULES[OPPONENT_RULES.len() - 1])
}

/// Pick the opponent's action for this round.
pub fn choose_action<R: RandomSource + ?Sized>(
    opponent: &Entity,
    player: &Entity,
    rng: &mut R,
) -> Action {
    let rule = matching_rule(opponent, player);
    let action = sample(rule.choices, rng);
    tracing::debug!(rule = rule.name, %action, "opponent decision");
    action
}

/// Draw from a weighted distribution. Single-choice rows consume no randomness.
pub fn sample<R: RandomSource + ?Sized>(choices: &[(Action, f64)], rng: &mut R) -> Action {
    match choices {
        [] => Action::Reload,
        [(only, _)] => *only,
        [init @ .., (last, _)] => {
            let roll = rng.next_unit();
            let mut cumulative = 0.0;
            for (action, weight) in init {
                cumulative += weight;
                if roll < cumulative {
                    return *action;
                }
            }
            *last
        }
    }
}
