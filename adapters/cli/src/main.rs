#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Lane Defence game.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lane_defence_core::{EconomySnapshot, Event, Rules};
use lane_defence_system_strategies::{Raider, Saver, TurretLine};
use lane_defence_system_turn::{Game, Idle, SpawnBase};
use lane_defence_world::{query, World};
use serde::Serialize;

/// Boost cap the saver strategy works towards.
const SAVER_BOOST_TARGET: u64 = 15;

#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Plays a headless Lane Defence game")]
struct Cli {
    /// Maximum number of turns to play.
    #[arg(long, default_value_t = 10_000)]
    turns: u64,
    /// Print a status line every this many turns; zero disables it.
    #[arg(long, default_value_t = 100)]
    report_every: u64,
    /// Strategy driving the invaders.
    #[arg(long, value_enum, default_value_t = InvaderChoice::Base)]
    invader: InvaderChoice,
    /// Strategy driving the defender.
    #[arg(long, value_enum, default_value_t = DefenderChoice::TurretLine)]
    defender: DefenderChoice,
    /// Seed for randomised strategies.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file overriding the default rules.
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Log progression milestones.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InvaderChoice {
    Base,
    Raider,
    Saver,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DefenderChoice {
    Idle,
    TurretLine,
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    spawned: u64,
    killed: u64,
    breaches: u64,
    towers_built: u64,
    rejected_actions: u64,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::InvaderSpawned { .. } => self.spawned += 1,
                Event::InvaderKilled { .. } => self.killed += 1,
                Event::DefenderBreached { .. } => self.breaches += 1,
                Event::TowerBuilt { .. } => self.towers_built += 1,
                Event::SpawnRejected { .. }
                | Event::BoostUpgradeRejected { .. }
                | Event::BuildRejected { .. }
                | Event::UpgradeRejected { .. }
                | Event::DestroyRejected { .. } => self.rejected_actions += 1,
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    defender_alive: bool,
    economy: EconomySnapshot,
    invaders_on_lane: usize,
    towers_on_lane: usize,
    tally: Tally,
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let rules = load_rules(cli.rules.as_ref())?;
    let mut game = build_game(&cli, rules);
    log::info!(
        "playing up to {} turns: {:?} invader vs {:?} defender",
        cli.turns,
        cli.invader,
        cli.defender
    );

    let mut tally = Tally::default();
    let mut events = Vec::new();
    let mut alive = true;
    for _ in 0..cli.turns {
        events.clear();
        alive = game.take_turn(&mut events);
        tally.record(&events);

        let turn = query::turn_number(game.world());
        if cli.report_every != 0 && turn % cli.report_every == 0 {
            println!("{}", status_line(game.world()));
        }
        if !alive {
            break;
        }
    }

    let world = game.world();
    let summary = Summary {
        defender_alive: alive,
        economy: query::economy(world),
        invaders_on_lane: query::invader_view(world).len(),
        towers_on_lane: query::tower_view(world).len(),
        tally,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to serialise game summary")?
    );
    Ok(())
}

fn load_rules(path: Option<&PathBuf>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file at {}", path.display()))?;
    Rules::from_toml_str(&contents)
        .with_context(|| format!("failed to load rules from {}", path.display()))
}

fn build_game(cli: &Cli, rules: Rules) -> Game {
    let game = Game::new(World::with_rules(rules));
    let game = match cli.invader {
        InvaderChoice::Base => game.with_invader(SpawnBase),
        InvaderChoice::Raider => game.with_invader(Raider::new(cli.seed)),
        InvaderChoice::Saver => game.with_invader(Saver::new(SAVER_BOOST_TARGET)),
        InvaderChoice::Idle => game.with_invader(Idle),
    };
    match cli.defender {
        DefenderChoice::Idle => game.with_defender(Idle),
        DefenderChoice::TurretLine => game.with_defender(TurretLine::new()),
    }
}

fn status_line(world: &World) -> String {
    let economy = query::economy(world);
    format!(
        "turn {:>6} | invader gold {:>6} income {:>4} boost {:>3} hp x{:.2} | defender gold {:>5} life {:>2} | invaders {:>3} towers {:>3}",
        economy.turn,
        economy.invader_gold,
        economy.invader_income,
        economy.invader_boost_max,
        economy.invader_hp_multiplier,
        economy.defender_gold,
        economy.defender_life,
        query::invader_view(world).len(),
        query::tower_view(world).len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_pit_base_invaders_against_a_turret_line() {
        let cli = Cli::parse_from(["lane-defence"]);
        assert_eq!(cli.turns, 10_000);
        assert_eq!(cli.invader, InvaderChoice::Base);
        assert_eq!(cli.defender, DefenderChoice::TurretLine);
        assert!(cli.rules.is_none());
    }

    #[test]
    fn cli_parses_strategy_names() {
        let cli = Cli::parse_from([
            "lane-defence",
            "--invader",
            "raider",
            "--defender",
            "idle",
            "--seed",
            "9",
        ]);
        assert_eq!(cli.invader, InvaderChoice::Raider);
        assert_eq!(cli.defender, DefenderChoice::Idle);
        assert_eq!(cli.seed, 9);
    }

    #[test]
    fn missing_rules_file_reports_its_path() {
        let path = PathBuf::from("does/not/exist.toml");
        let error = load_rules(Some(&path)).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn tally_counts_kills_and_rejections() {
        let mut tally = Tally::default();
        tally.record(&[
            Event::InvaderKilled {
                position: lane_defence_core::LanePosition::new(3),
                bounty: 1,
            },
            Event::DestroyRejected {
                position: lane_defence_core::LanePosition::new(3),
                reason: lane_defence_core::DestroyError::MissingTower,
            },
        ]);
        assert_eq!(tally.killed, 1);
        assert_eq!(tally.rejected_actions, 1);
    }
}
