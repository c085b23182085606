use clap::{Parser, ValueEnum};
use duel_engine::api::{simulate_duel_many, Autopilot, SimConfig};
use duel_engine::DuelConfig;
use encoding_rs::Encoding;
use std::{fs, path::PathBuf};

#[derive(Copy, Clone, ValueEnum)]
enum Pilot {
    Random,
    Mirror,
    Turtle,
}

#[derive(Parser)]
#[command(name = "simulate-duels")]
#[command(about = "Monte Carlo sim: many duels of an autopilot vs the scripted opponent")]
struct Args {
    /// Number of duels
    #[arg(long, default_value_t = 1000)]
    samples: u32,

    /// Strategy for the player's seat
    #[arg(long, value_enum, default_value_t = Pilot::Random)]
    autopilot: Pilot,

    /// Chance per round that the autopilot lets the timer run out
    #[arg(long, default_value_t = 0.0)]
    idle_rate: f64,

    /// Safety cap on rounds per duel
    #[arg(long, default_value_t = 200)]
    max_rounds: u32,

    /// Built-in preset (ignored when --config is given)
    #[arg(long, default_value = "classic")]
    preset: String,

    /// Optional JSON/YAML duel config
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG base seed (duel i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Emit the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn to_autopilot(p: Pilot) -> Autopilot {
    match p {
        Pilot::Random => Autopilot::Random,
        Pilot::Mirror => Autopilot::Mirror,
        Pilot::Turtle => Autopilot::Turtle,
    }
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => {
            let text = read_text_auto(path)?;
            Some(DuelConfig::from_str_for_path(path, &text)?)
        }
        None => None,
    };

    let cfg = SimConfig {
        preset: Some(args.preset.clone()),
        config,
        autopilot: to_autopilot(args.autopilot),
        idle_rate: args.idle_rate,
        seed: args.seed,
        max_rounds: args.max_rounds,
    };
    let stats = simulate_duel_many(cfg, args.samples)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let samples_f = stats.samples.max(1) as f64;
    let total_actions: u32 = stats.opponent_actions.values().sum();

    println!("simulate-duels results");
    println!("----------------------");
    println!("samples:            {}", stats.samples);
    println!("autopilot:          {:?}", to_autopilot(args.autopilot));
    println!("idle rate:          {:.1}%", args.idle_rate * 100.0);
    println!();
    println!(
        "player win rate:    {:.1}%",
        stats.player_wins as f64 / samples_f * 100.0
    );
    println!(
        "opponent win rate:  {:.1}%",
        stats.opponent_wins as f64 / samples_f * 100.0
    );
    println!("unfinished:         {}", stats.unfinished);
    println!("avg rounds:         {:.2}", stats.avg_rounds);
    println!("exposed rounds:     {}", stats.exposed_rounds);
    for (action, count) in &stats.opponent_actions {
        println!(
            "opponent {:<7}    {:.1}%",
            action.to_string(),
            *count as f64 / total_actions.max(1) as f64 * 100.0
        );
    }

    Ok(())
}
