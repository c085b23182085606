use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::policy::choose_action;
use crate::{content, Action, Dice, DuelConfig, Entity, MatchSession, Phase, RandomSource, Side};

const DEFAULT_MAX_ROUNDS: u32 = 200;
const AUTOPILOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Scripted stand-in for the human seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Autopilot {
    /// Uniform over whatever is affordable.
    #[default]
    Random,
    /// The opponent's own rule table, seen from the player's seat.
    Mirror,
    /// Reload when empty, shield until the crit is armed, then attack.
    Turtle,
}

impl Autopilot {
    pub fn choose<R: RandomSource + ?Sized>(self, me: &Entity, foe: &Entity, rng: &mut R) -> Action {
        match self {
            Autopilot::Random => {
                let affordable: Vec<Action> = Action::ALL
                    .into_iter()
                    .filter(|a| me.can_afford(*a))
                    .collect();
                let idx = (rng.next_unit() * affordable.len() as f64) as usize;
                affordable[idx.min(affordable.len() - 1)]
            }
            Autopilot::Mirror => choose_action(me, foe, rng),
            Autopilot::Turtle => {
                if me.ammo == 0 {
                    Action::Reload
                } else if me.crit_armed() {
                    Action::Attack
                } else {
                    Action::Shield
                }
            }
        }
    }
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    /// Built-in preset name; ignored when `config` is given.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub config: Option<DuelConfig>,
    #[serde(default)]
    pub autopilot: Autopilot,
    /// Chance per round that the autopilot lets the countdown run out.
    #[serde(default)]
    pub idle_rate: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            preset: None,
            config: None,
            autopilot: Autopilot::default(),
            idle_rate: 0.0,
            seed: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl SimConfig {
    fn duel_config(&self) -> Result<DuelConfig> {
        match (&self.config, &self.preset) {
            (Some(cfg), _) => {
                cfg.validate()?;
                Ok(cfg.clone())
            }
            (None, Some(name)) => content::preset(name),
            (None, None) => Ok(DuelConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelResult {
    /// "player", "opponent" or "unfinished"
    pub winner: String,
    pub rounds: u32,
    pub player_hp_end: i32,
    pub opponent_hp_end: i32,
    pub exposed_rounds: u32,
    pub opponent_actions: Vec<Action>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelStats {
    pub samples: u32,
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub unfinished: u32,
    pub avg_rounds: f64,
    pub exposed_rounds: u32,
    /// Opponent action counts, in order of first appearance.
    pub opponent_actions: IndexMap<Action, u32>,
}

/// Play one timed match with the autopilot in the player's seat.
pub fn simulate_duel(cfg: SimConfig) -> Result<DuelResult> {
    if !(0.0..=1.0).contains(&cfg.idle_rate) {
        bail!("idle_rate must be within [0, 1], got {}", cfg.idle_rate);
    }
    let _span = tracing::info_span!("simulate_duel", seed = cfg.seed).entered();

    let mut duel_cfg = cfg.duel_config()?;
    duel_cfg.timed = true;
    duel_cfg.auto_restart = false;
    let span = duel_cfg.round_span();

    let mut session = MatchSession::new(duel_cfg, Dice::from_seed(cfg.seed))?;
    let mut pilot = Dice::from_seed(cfg.seed ^ AUTOPILOT_SEED_SALT);

    let opponent_actions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&opponent_actions);
    session.on_round_resolved(move |report, _, _| {
        if let Ok(mut actions) = sink.lock() {
            actions.push(report.opponent_action);
        }
    });

    let mut exposed_rounds = 0u32;
    while session.round() < cfg.max_rounds && !matches!(session.phase(), Phase::MatchOver { .. }) {
        if pilot.next_unit() < cfg.idle_rate {
            exposed_rounds += 1;
        } else {
            let action = cfg
                .autopilot
                .choose(session.player(), session.opponent(), &mut pilot);
            session.declare_action(Side::Player, action)?;
        }
        session.advance(span);
    }

    let winner = match session.phase() {
        Phase::MatchOver { winner: Side::Player } => "player",
        Phase::MatchOver { winner: Side::Opponent } => "opponent",
        _ => "unfinished",
    };
    let opponent_actions = opponent_actions
        .lock()
        .map(|actions| actions.clone())
        .unwrap_or_default();

    Ok(DuelResult {
        winner: winner.to_string(),
        rounds: session.round(),
        player_hp_end: session.player().health,
        opponent_hp_end: session.opponent().health,
        exposed_rounds,
        opponent_actions,
        log: session.round_log().to_vec(),
    })
}

/// Run `samples` matches; sample `i` is seeded with `seed + i`.
pub fn simulate_duel_many(cfg: SimConfig, samples: u32) -> Result<DuelStats> {
    let mut stats = DuelStats {
        samples,
        player_wins: 0,
        opponent_wins: 0,
        unfinished: 0,
        avg_rounds: 0.0,
        exposed_rounds: 0,
        opponent_actions: IndexMap::new(),
    };
    let mut total_rounds = 0u64;

    for i in 0..samples {
        let mut sample_cfg = cfg.clone();
        sample_cfg.seed = cfg.seed.wrapping_add(i as u64);
        let res = simulate_duel(sample_cfg)?;
        match res.winner.as_str() {
            "player" => stats.player_wins += 1,
            "opponent" => stats.opponent_wins += 1,
            _ => stats.unfinished += 1,
        }
        total_rounds += res.rounds as u64;
        stats.exposed_rounds += res.exposed_rounds;
        for action in res.opponent_actions {
            *stats.opponent_actions.entry(action).or_insert(0) += 1;
        }
    }

    if samples > 0 {
        stats.avg_rounds = total_rounds as f64 / samples as f64;
    }
    Ok(stats)
}
