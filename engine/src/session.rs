//! Duel controller.
//!
//! A [`MatchSession`] owns both combatants, the random source and the single
//! round timer. Time only moves when the host calls [`MatchSession::advance`],
//! so the whole state machine runs on the caller's thread.

use std::{fmt, time::Duration};

use serde::Serialize;
use tracing::{debug, info};

use crate::combat::resolve::{resolve_exposed_round, resolve_round};
use crate::policy::choose_action;
use crate::{Action, Dice, DuelConfig, DuelError, Entity, RandomSource, RoundReport, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the player's declaration.
    Selecting,
    /// Declaration (or its absence) is final; waiting out the reveal delay.
    Locked { player_action: Option<Action> },
    Resolving,
    Cooldown,
    MatchOver { winner: Side },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Selecting => f.write_str("selecting"),
            Phase::Locked { .. } => f.write_str("locked"),
            Phase::Resolving => f.write_str("resolving"),
            Phase::Cooldown => f.write_str("cooling down"),
            Phase::MatchOver { winner } => write!(f, "match over ({} won)", winner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    id: u64,
    remaining: Duration,
}

type RoundObserver = Box<dyn FnMut(&RoundReport, &Entity, &Entity) + Send>;
type MatchObserver = Box<dyn FnMut(Side) + Send>;

pub struct MatchSession<R: RandomSource = Dice> {
    config: DuelConfig,
    timed: bool,
    rng: R,
    player: Entity,
    opponent: Entity,
    phase: Phase,
    pending: Option<Action>,
    round: u32,
    /// The only timer; arming a new one drops the old.
    timer: Option<Countdown>,
    timers_armed: u64,
    round_log: Vec<String>,
    debug_log: Vec<String>,
    last_report: Option<RoundReport>,
    last_winner: Option<Side>,
    round_observers: Vec<RoundObserver>,
    match_observers: Vec<MatchObserver>,
}

impl<R: RandomSource> MatchSession<R> {
    pub fn new(config: DuelConfig, rng: R) -> Result<Self, DuelError> {
        config.validate()?;
        let mut session = Self {
            timed: config.timed,
            config,
            rng,
            player: Entity::default(),
            opponent: Entity::default(),
            phase: Phase::Selecting,
            pending: None,
            round: 0,
            timer: None,
            timers_armed: 0,
            round_log: Vec::new(),
            debug_log: Vec::new(),
            last_report: None,
            last_winner: None,
            round_observers: Vec::new(),
            match_observers: Vec::new(),
        };
        session.start_match();
        Ok(session)
    }

    /// Start a session from an arbitrary position instead of fresh entities.
    pub fn with_entities(
        config: DuelConfig,
        rng: R,
        player: Entity,
        opponent: Entity,
    ) -> Result<Self, DuelError> {
        let mut session = Self::new(config, rng)?;
        session.player = player;
        session.opponent = opponent;
        Ok(session)
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn opponent(&self) -> &Entity {
        &self.opponent
    }

    /// Rounds resolved in the current match.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_timed(&self) -> bool {
        self.timed
    }

    pub fn pending_action(&self) -> Option<Action> {
        self.pending
    }

    /// Remaining selection countdown, if one is running.
    pub fn time_left(&self) -> Option<Duration> {
        match self.phase {
            Phase::Selecting => self.timer.map(|t| t.remaining),
            _ => None,
        }
    }

    /// Id of the active timer; every arm gets a fresh id.
    pub fn timer_id(&self) -> Option<u64> {
        self.timer.map(|t| t.id)
    }

    pub fn round_log(&self) -> &[String] {
        &self.round_log
    }

    pub fn debug_log(&self) -> &[String] {
        &self.debug_log
    }

    /// Report of the most recent resolution; survives an automatic restart.
    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    pub fn last_winner(&self) -> Option<Side> {
        self.last_winner
    }

    pub fn on_round_resolved(
        &mut self,
        callback: impl FnMut(&RoundReport, &Entity, &Entity) + Send + 'static,
    ) {
        self.round_observers.push(Box::new(callback));
    }

    pub fn on_match_over(&mut self, callback: impl FnMut(Side) + Send + 'static) {
        self.match_observers.push(Box::new(callback));
    }

    /// Record the player's move for this round.
    ///
    /// Timed mode keeps the latest declaration until the countdown locks it in;
    /// untimed mode resolves the round before returning.
    pub fn declare_action(&mut self, side: Side, action: Action) -> Result<(), DuelError> {
        if side != Side::Player {
            return Err(DuelError::InvalidAction {
                side,
                action,
                reason: "the opponent's moves come from its policy",
            });
        }
        if self.phase != Phase::Selecting {
            return Err(DuelError::InvalidState {
                operation: "declare an action",
                phase: self.phase,
            });
        }
        if !self.player.can_afford(action) {
            debug!(%action, "rejected declaration without ammo");
            return Err(DuelError::InvalidAction {
                side,
                action,
                reason: "no ammo",
            });
        }

        if self.timed {
            if let Some(previous) = self.pending.replace(action) {
                self.note(format!("[DECLARE] {} replaces {}", action, previous));
            } else {
                self.note(format!("[DECLARE] {} reserved", action));
            }
        } else {
            self.resolve(Some(action));
        }
        Ok(())
    }

    /// Switch between countdown and immediate resolution.
    ///
    /// During selection the round starts over. Leaving timed mode while a
    /// round is locked resolves it at once; leaving it during cooldown opens
    /// the next round.
    pub fn set_timed_mode(&mut self, timed: bool) {
        self.timed = timed;
        self.note(format!(
            "[MODE] switched to {}",
            if timed { "TIMED" } else { "UNTIMED" }
        ));
        match self.phase {
            Phase::Selecting => self.begin_round(),
            // Untimed hosts never advance the clock, so pending delays are settled now.
            Phase::Locked { player_action } if !timed => self.resolve(player_action),
            Phase::Cooldown if !timed => self.begin_round(),
            _ => {}
        }
    }

    /// Abandon the current match, including any unresolved round.
    pub fn reset_match(&mut self) {
        self.cancel_timer();
        self.last_report = None;
        self.start_match();
    }

    /// Move the clock forward, firing every timer that elapses on the way.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut budget = elapsed;
        while let Some(timer) = self.timer {
            if budget < timer.remaining {
                self.timer = Some(Countdown {
                    remaining: timer.remaining - budget,
                    ..timer
                });
                return;
            }
            budget -= timer.remaining;
            self.timer = None;
            debug!(timer = timer.id, phase = %self.phase, "timer elapsed");
            self.on_timer_elapsed();
        }
    }

    fn on_timer_elapsed(&mut self) {
        match self.phase {
            Phase::Selecting => self.lock_in(),
            Phase::Locked { player_action } => self.resolve(player_action),
            Phase::Cooldown => self.begin_round(),
            Phase::Resolving | Phase::MatchOver { .. } => {}
        }
    }

    fn lock_in(&mut self) {
        let player_action = self.pending.take();
        self.phase = Phase::Locked { player_action };
        self.note(format!(
            "[LOCK] player={}",
            player_action.map_or_else(|| "NONE".to_string(), |a| a.to_string())
        ));
        self.arm_timer(self.config.reveal());
    }

    fn resolve(&mut self, player_action: Option<Action>) {
        self.phase = Phase::Resolving;
        self.cancel_timer();

        let opponent_action = choose_action(&self.opponent, &self.player, &mut self.rng);
        let mut report = match player_action {
            Some(action) => resolve_round(
                &mut self.player,
                &mut self.opponent,
                action,
                opponent_action,
                &mut self.rng,
            ),
            None => resolve_exposed_round(
                &mut self.player,
                &mut self.opponent,
                opponent_action,
                &mut self.rng,
            ),
        };

        self.round += 1;
        report.round = self.round;
        self.debug_log.extend(report.debug.iter().cloned());
        let entry = format!("[ROUND {}] {}", self.round, report.summary);
        info!("{}", entry);
        self.round_log.push(entry);
        for observer in &mut self.round_observers {
            observer(&report, &self.player, &self.opponent);
        }
        self.last_report = Some(report);

        if let Some(winner) = self.winner() {
            self.finish_match(winner);
        } else if self.timed {
            self.phase = Phase::Cooldown;
            self.arm_timer(self.config.cooldown());
        } else {
            self.begin_round();
        }
    }

    /// A double knock-out goes to the opponent.
    fn winner(&self) -> Option<Side> {
        if self.player.is_defeated() {
            Some(Side::Opponent)
        } else if self.opponent.is_defeated() {
            Some(Side::Player)
        } else {
            None
        }
    }

    fn finish_match(&mut self, winner: Side) {
        self.phase = Phase::MatchOver { winner };
        self.cancel_timer();
        self.last_winner = Some(winner);

        let entry = format!(
            "[END] winner={} rounds={} player_hp={} opponent_hp={}",
            winner, self.round, self.player.health, self.opponent.health
        );
        info!("{}", entry);
        self.round_log.push(entry);
        for observer in &mut self.match_observers {
            observer(winner);
        }

        if self.config.auto_restart {
            self.start_match();
        }
    }

    fn start_match(&mut self) {
        self.player = Entity::default();
        self.opponent = Entity::default();
        self.round = 0;
        self.round_log.clear();
        self.debug_log.clear();
        self.round_log.push(format!(
            "[START] new duel ({} mode)",
            if self.timed { "timed" } else { "untimed" }
        ));
        self.begin_round();
    }

    fn begin_round(&mut self) {
        self.phase = Phase::Selecting;
        self.pending = None;
        if self.timed {
            self.arm_timer(self.config.round_time());
        } else {
            self.cancel_timer();
        }
    }

    fn arm_timer(&mut self, duration: Duration) {
        self.cancel_timer();
        self.timers_armed += 1;
        self.timer = Some(Countdown {
            id: self.timers_armed,
            remaining: duration,
        });
        debug!(
            timer = self.timers_armed,
            ms = duration.as_millis() as u64,
            phase = %self.phase,
            "timer armed"
        );
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(timer = timer.id, "timer cancelled");
        }
    }

    fn note(&mut self, line: String) {
        debug!("{}", line);
        self.debug_log.push(line);
    }
}
