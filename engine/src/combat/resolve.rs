use serde::Serialize;
use tracing::debug;

use crate::entity::{
    BLOCKED_MOMENTUM_PENALTY, CRIT_BONUS, CRIT_DAMAGE, EXPOSED_RELOAD_BONUS, HIT_MOMENTUM_GAIN,
    NORMAL_DAMAGE, RELOAD_BASE_PROBABILITY, RELOAD_FAILURE_PENALTY, RELOAD_MOMENTUM_GAIN,
    SHIELD_STREAK_FOR_CRIT,
};
use crate::probability::roll_success;
use crate::{Action, Entity, RandomSource, Side};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReloadOutcome {
    pub success: bool,
    pub effective_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    pub crit: bool,
    pub blocked: bool,
    /// Health actually removed from the defender (0 when blocked).
    pub damage: i32,
}

/// Everything a presentation layer needs to replay one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// 1-based round number within the match; 0 until a session stamps it.
    pub round: u32,
    /// `None` when the player let the countdown expire.
    pub player_action: Option<Action>,
    pub opponent_action: Action,
    pub player_reload: Option<ReloadOutcome>,
    pub opponent_reload: Option<ReloadOutcome>,
    pub player_attack: Option<AttackOutcome>,
    pub opponent_attack: Option<AttackOutcome>,
    /// The player's shield streak armed the crit bonus this round.
    pub crit_armed: bool,
    pub summary: String,
    pub debug: Vec<String>,
}

impl RoundReport {
    fn new(player_action: Option<Action>, opponent_action: Action) -> Self {
        Self {
            round: 0,
            player_action,
            opponent_action,
            player_reload: None,
            opponent_reload: None,
            player_attack: None,
            opponent_attack: None,
            crit_armed: false,
            summary: String::new(),
            debug: Vec::new(),
        }
    }

    pub fn is_exposed(&self) -> bool {
        self.player_action.is_none()
    }

    pub fn attack_by(&self, side: Side) -> Option<AttackOutcome> {
        match side {
            Side::Player => self.player_attack,
            Side::Opponent => self.opponent_attack,
        }
    }
}

/// Resolve a round in which both sides declared an action.
///
/// Order: shields drop, the player's shield streak is counted, reloads roll
/// (player first), shields go up, then attacks land player-then-opponent.
/// The caller guarantees an attacking side has ammo.
pub fn resolve_round<R: RandomSource + ?Sized>(
    player: &mut Entity,
    opponent: &mut Entity,
    player_action: Action,
    opponent_action: Action,
    rng: &mut R,
) -> RoundReport {
    let mut report = RoundReport::new(Some(player_action), opponent_action);
    let mut lines = Vec::new();
    let mut log = |msg: String| {
        debug!("{}", msg);
        lines.push(msg);
    };

    player.shielded = false;
    opponent.shielded = false;

    if player_action == Action::Shield {
        player.shield_streak += 1;
        if player.shield_streak == SHIELD_STREAK_FOR_CRIT {
            player.crit_bonus = CRIT_BONUS;
            report.crit_armed = true;
            log(format!(
                "[CRIT][Player] shield streak {} → +{:.0}% crit on next ATTACK",
                player.shield_streak,
                CRIT_BONUS * 100.0
            ));
        }
    }

    if player_action == Action::Reload {
        report.player_reload = Some(apply_reload(
            Side::Player,
            player,
            RELOAD_BASE_PROBABILITY,
            rng,
            &mut log,
        ));
    }
    if opponent_action == Action::Reload {
        report.opponent_reload = Some(apply_reload(
            Side::Opponent,
            opponent,
            RELOAD_BASE_PROBABILITY,
            rng,
            &mut log,
        ));
    }

    if player_action == Action::Shield {
        player.shielded = true;
    }
    if opponent_action == Action::Shield {
        opponent.shielded = true;
    }

    if player_action == Action::Attack {
        report.player_attack = Some(apply_attack(Side::Player, player, opponent, rng, &mut log));
    }
    if opponent_action == Action::Attack {
        report.opponent_attack = Some(apply_attack(
            Side::Opponent,
            opponent,
            player,
            rng,
            &mut log,
        ));
    }

    report.debug = lines;
    report.summary = summarize(&report);
    report
}

/// Resolve a round in which the player declared nothing before time ran out.
///
/// The player only loses the previous round's shield and takes any incoming
/// hit; the opponent reloads with a flat bonus.
pub fn resolve_exposed_round<R: RandomSource + ?Sized>(
    player: &mut Entity,
    opponent: &mut Entity,
    opponent_action: Action,
    rng: &mut R,
) -> RoundReport {
    let mut report = RoundReport::new(None, opponent_action);
    let mut lines = Vec::new();
    let mut log = |msg: String| {
        debug!("{}", msg);
        lines.push(msg);
    };

    player.shielded = false;
    opponent.shielded = false;
    log("[TIMER] time elapsed, player is exposed".to_string());

    match opponent_action {
        Action::Reload => {
            report.opponent_reload = Some(apply_reload(
                Side::Opponent,
                opponent,
                RELOAD_BASE_PROBABILITY + EXPOSED_RELOAD_BONUS,
                rng,
                &mut log,
            ));
        }
        Action::Shield => opponent.shielded = true,
        Action::Attack => {
            report.opponent_attack = Some(apply_attack(
                Side::Opponent,
                opponent,
                player,
                rng,
                &mut log,
            ));
        }
    }

    report.debug = lines;
    report.summary = summarize(&report);
    report
}

fn apply_reload<R: RandomSource + ?Sized>(
    side: Side,
    entity: &mut Entity,
    base_probability: f64,
    rng: &mut R,
    mut log: impl FnMut(String),
) -> ReloadOutcome {
    let roll = roll_success(entity, base_probability, rng);
    log(format!(
        "[RELOAD][{}] {} → {}",
        side,
        roll,
        if roll.success { "OK" } else { "FAILED" }
    ));
    if roll.success {
        entity.ammo += 1;
        entity.adjust_momentum(RELOAD_MOMENTUM_GAIN);
        if side == Side::Player {
            entity.shield_streak = 0;
        }
    } else if side == Side::Player {
        // Only the player pays for a failed reload.
        entity.adjust_momentum(-RELOAD_FAILURE_PENALTY);
    }
    ReloadOutcome {
        success: roll.success,
        effective_probability: roll.effective,
    }
}

fn apply_attack<R: RandomSource + ?Sized>(
    side: Side,
    attacker: &mut Entity,
    defender: &mut Entity,
    rng: &mut R,
    mut log: impl FnMut(String),
) -> AttackOutcome {
    attacker.ammo = attacker.ammo.saturating_sub(1);

    // The opponent never builds a shield streak, so it never rolls for a crit.
    let crit = match side {
        Side::Player => {
            log(format!(
                "[CRIT][Player] chance {:.0}%",
                attacker.crit_bonus * 100.0
            ));
            rng.next_unit() < attacker.crit_bonus
        }
        Side::Opponent => false,
    };
    if crit {
        log(format!("[CRIT][{}] critical hit rolled", side));
    }
    let damage = if crit { CRIT_DAMAGE } else { NORMAL_DAMAGE };

    let outcome = if defender.shielded {
        attacker.adjust_momentum(-BLOCKED_MOMENTUM_PENALTY);
        AttackOutcome {
            crit,
            blocked: true,
            damage: 0,
        }
    } else {
        defender.health -= damage;
        attacker.adjust_momentum(HIT_MOMENTUM_GAIN);
        AttackOutcome {
            crit,
            blocked: false,
            damage,
        }
    };

    attacker.crit_bonus = 0.0;
    attacker.shield_streak = 0;
    outcome
}

fn summarize(report: &RoundReport) -> String {
    let mut summary = match report.player_action {
        Some(action) => format!("Player: {} vs Opponent: {}", action, report.opponent_action),
        None => format!("Player EXPOSED vs Opponent: {}", report.opponent_action),
    };

    for (side, reload) in [
        (Side::Player, report.player_reload),
        (Side::Opponent, report.opponent_reload),
    ] {
        if reload.is_some_and(|r| !r.success) {
            summary.push_str(&format!(" | {} reload failed", side));
        }
    }

    for side in [Side::Player, Side::Opponent] {
        let Some(attack) = report.attack_by(side) else {
            continue;
        };
        let defender = side.other();
        if attack.blocked {
            summary.push_str(&format!(" | BLOCKED! {} was shielded", defender));
        } else if attack.crit {
            summary.push_str(&format!(
                " | CRITICAL HIT! {} loses {} HP",
                defender, attack.damage
            ));
        } else {
            summary.push_str(&format!(" | HIT! {} loses {} HP", defender, attack.damage));
        }
    }

    summary
}
