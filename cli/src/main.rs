use std::{
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use duel_engine::{
    content, policy, Action, Dice, DuelConfig, DuelError, Entity, MatchSession, RandomSource,
    RoundReport, Side,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
enum Cmd {
    /// Duel the scripted opponent from stdin (r = reload, s = shield, a = attack)
    Play {
        /// Resolve every round as soon as an action is declared
        #[arg(long, default_value_t = false)]
        untimed: bool,
        /// Built-in preset: classic | blitz | practice
        #[arg(long, default_value = "classic")]
        preset: String,
        /// JSON or YAML config file (takes precedence over --preset)
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed; falls back to the config seed, then the clock
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show which opponent rule fires for a position and how often each action comes out
    Policy {
        #[arg(long, default_value_t = 0)]
        player_ammo: u32,
        #[arg(long, default_value_t = 0)]
        opponent_ammo: u32,
        #[arg(long, default_value_t = 3)]
        opponent_health: i32,
        /// Number of decisions to sample
        #[arg(long, default_value_t = 1000)]
        samples: u32,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Print a built-in preset as JSON (stdout)
    Preset {
        #[arg(long, default_value = "classic")]
        name: String,
        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[derive(Parser)]
#[command(name = "duel-cli")]
#[command(about = "Reload / shield / attack duel harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Play {
            untimed,
            preset,
            config,
            seed,
        } => {
            let mut cfg = match config {
                Some(path) => DuelConfig::load(&path)?,
                None => content::preset(&preset)?,
            };
            if untimed {
                cfg.timed = false;
            }
            let seed = seed.or(cfg.seed).unwrap_or_else(clock_seed);
            tracing::info!(seed, timed = cfg.timed, "starting duel");
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(play(cfg, seed))?;
        }
        Cmd::Policy {
            player_ammo,
            opponent_ammo,
            opponent_health,
            samples,
            seed,
        } => {
            let player = Entity::with_ammo(player_ammo);
            let opponent = Entity {
                ammo: opponent_ammo,
                health: opponent_health,
                ..Entity::default()
            };
            let rule = policy::matching_rule(&opponent, &player);
            println!("rule: {}", rule.name);

            let mut dice = Dice::from_seed(seed);
            let mut counts = [0u32; 3];
            for _ in 0..samples {
                let action = policy::choose_action(&opponent, &player, &mut dice);
                counts[slot(action)] += 1;
            }
            for action in Action::ALL {
                let share = if samples == 0 {
                    0.0
                } else {
                    counts[slot(action)] as f64 / samples as f64
                };
                println!("{:<7} {:>5.1}%", action.to_string(), share * 100.0);
            }
        }
        Cmd::Preset { name, pretty } => {
            let cfg = content::preset(&name)?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else {
                println!("{}", serde_json::to_string(&cfg)?);
            }
        }
    }
    Ok(())
}

fn slot(action: Action) -> usize {
    match action {
        Action::Reload => 0,
        Action::Shield => 1,
        Action::Attack => 2,
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

async fn play(cfg: DuelConfig, seed: u64) -> Result<()> {
    let tick = cfg.tick();
    let mut session = MatchSession::new(cfg, Dice::from_seed(seed))?;
    session.on_round_resolved(|report, player, opponent| {
        print_round(report, player, opponent);
    });
    session.on_match_over(|winner| match winner {
        Side::Player => println!("[END] You win! A new duel begins."),
        Side::Opponent => println!("[END] The opponent wins. A new duel begins."),
    });

    print_help();
    println!("{}", session.round_log().join("\n"));

    // The session never leaves this task, so no lock is needed around it.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown_second = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&mut session, line.trim()) {
                    break;
                }
            }
            _ = ticker.tick(), if session.timer_id().is_some() => {
                session.advance(tick);
                let second = session.time_left().map(whole_seconds);
                if second != shown_second {
                    if let Some(s) = second {
                        println!("[TIMER] {}", s);
                    }
                    shown_second = second;
                }
            }
        }
    }
    Ok(())
}

fn whole_seconds(left: Duration) -> u64 {
    left.as_millis().div_ceil(1000) as u64
}

/// Returns false when the player asked to quit.
fn handle_command<R: RandomSource>(session: &mut MatchSession<R>, input: &str) -> bool {
    match input {
        "" => {}
        "q" | "quit" => return false,
        "h" | "help" => print_help(),
        "mode" => {
            session.set_timed_mode(!session.is_timed());
            println!(
                "[MODE] {}",
                if session.is_timed() { "TIMED" } else { "UNTIMED" }
            );
        }
        "reset" => {
            session.reset_match();
            println!("[RESET] new duel");
        }
        "status" => {
            println!("[STATUS] round {} | {}", session.round(), session.phase());
            println!("  you: {}", describe(session.player()));
            println!("  foe: {}", describe(session.opponent()));
        }
        other => match other.parse::<Action>() {
            Ok(action) => match session.declare_action(Side::Player, action) {
                Ok(()) if session.is_timed() => {
                    println!("[READY] {} (locks in when the timer runs out)", action)
                }
                Ok(()) => {}
                Err(e @ DuelError::InvalidAction { .. }) => println!("[DENIED] {}", e),
                Err(e) => println!("[WAIT] {}", e),
            },
            Err(e) => println!("{}", e),
        },
    }
    true
}

fn print_round(report: &RoundReport, player: &Entity, opponent: &Entity) {
    println!("[ROUND {}] {}", report.round, report.summary);
    println!("  you: {}", describe(player));
    println!("  foe: {}", describe(opponent));
}

fn describe(e: &Entity) -> String {
    let mut out = format!(
        "HP {} | AMMO {} | MOMENTUM {:.1}x",
        e.health, e.ammo, e.momentum
    );
    if e.shielded {
        out.push_str(" | SHIELDED");
    }
    if e.crit_armed() {
        out.push_str(" | CRIT ARMED");
    }
    out
}

fn print_help() {
    println!("Commands: r(eload) s(hield) a(ttack) | mode | status | reset | help | quit");
}
