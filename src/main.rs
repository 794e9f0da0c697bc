//! Pin Toss headless driver
//!
//! Plays a scripted match with the configured aim and prints the event log.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pin_toss::{ConfigPatch, GameConfig, GameState};

/// Safety cap on steps per throw
const MAX_STEPS_PER_THROW: u32 = 20_000;

/// Headless Pin Toss match - alternating throws with a fixed aim
#[derive(Parser, Debug)]
#[command(name = "pin-toss")]
#[command(about = "Play a scripted Pin Toss match and print the event log")]
struct Args {
    /// JSON game config (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of throws to play
    #[arg(long, default_value_t = 6)]
    turns: u32,

    /// Override the config's RNG seed
    #[arg(long)]
    seed: Option<u32>,

    /// Print the final snapshot as JSON instead of the log
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    let mut state = GameState::new(config);
    if let Some(seed) = args.seed {
        state.update_config(&ConfigPatch {
            seed: Some(seed),
            ..Default::default()
        });
        state.reset();
    }

    for turn in 1..=args.turns {
        match state.run_throw(MAX_STEPS_PER_THROW) {
            Some(steps) => log::debug!("throw settled in {} steps", steps),
            None => {
                log::error!("Throw {} did not settle within {} steps", turn, MAX_STEPS_PER_THROW);
                return ExitCode::FAILURE;
            }
        }
        state.next_turn();
    }

    if args.json {
        match serde_json::to_string_pretty(&state.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    for entry in state.log() {
        println!(
            "[turn {:>2}] {} ({:+} / {:+})",
            entry.turn, entry.description, entry.deltas[0], entry.deltas[1]
        );
    }
    for player in state.players() {
        println!("{}: {}", player.name, player.score);
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "pin-toss", "--config", "c.json", "--turns", "4", "--seed", "9", "--json",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.json")));
        assert_eq!(args.turns, 4);
        assert_eq!(args.seed, Some(9));
        assert!(args.json);
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pin-toss"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.turns, 6);
        assert!(args.seed.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_rejects_unknown_and_missing() {
        assert!(Args::try_parse_from(["pin-toss", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["pin-toss", "--turns"]).is_err());
        assert!(Args::try_parse_from(["pin-toss", "--seed", "x"]).is_err());
    }
}
