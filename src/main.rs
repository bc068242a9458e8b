//! Lane Rush headless driver
//!
//! Runs a seeded simulation with a scripted player and logs what the
//! population core did.

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Vec2;

use lane_rush::Tuning;
use lane_rush::consts::*;
use lane_rush::sim::{Category, Difficulty, RunnerState, TickInput, tick};

/// Player row (fixed; the player only switches lanes)
const PLAYER_Y: f32 = -400.0;
/// Pickup distance for the scripted collision check
const PICKUP_RADIUS: f32 = 60.0;

/// Headless lane runner simulation
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Tuning JSON file; defaults are used when omitted
    tuning: Option<PathBuf>,

    /// RNG seed for the spawn scheduler
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Simulated play time in seconds
    #[arg(long, default_value_t = 120.0, value_parser = parse_seconds)]
    seconds: f32,
}

fn parse_seconds(s: &str) -> Result<f32, String> {
    let seconds: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(format!("{} is not a non-negative number of seconds", s))
    }
}

fn load_tuning(path: Option<&Path>) -> Tuning {
    let Some(path) = path else {
        log::info!("Using default tuning");
        return Tuning::default();
    };

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match Tuning::from_json(&json) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path.display());
            tuning
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Lane of the lowest collectible or power-up still ahead of the player
fn target_lane(state: &RunnerState) -> Option<usize> {
    state
        .entities()
        .iter()
        .filter(|e| !e.category().is_obstacle() && !e.is_despawning() && e.pos.y > PLAYER_Y)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| e.lane)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let tuning = load_tuning(cli.tuning.as_deref());
    let (seed, seconds) = (cli.seed, cli.seconds);

    log::info!("Lane Rush (headless) starting, seed {}, {}s", seed, seconds);

    let mut difficulty = Difficulty::new(tuning.difficulty.clone());
    let mut state = RunnerState::new(tuning, seed);
    let mut lane = 1;

    let mut spawned = 0u32;
    let mut blocked = 0u32;
    let mut collected = 0u32;
    let mut powerups = 0u32;
    let mut hits = 0u32;

    let ticks = (seconds / SIM_DT).round() as u64;
    for _ in 0..ticks {
        difficulty.tick(SIM_DT);

        if let Some(target) = target_lane(&state) {
            lane = target;
        }
        let player_pos = Vec2::new(state.lanes().lane_center_x(lane, PLAYER_Y), PLAYER_Y);

        let input = TickInput {
            speed: difficulty.current_speed(state.ledger()),
            player_pos,
        };
        let report = tick(&mut state, &input, SIM_DT);
        spawned += report.spawn.spawned;
        blocked += report.spawn.blocked;

        // Scripted collision detection
        let touching: Vec<u32> = state
            .entities()
            .iter()
            .filter(|e| !e.is_despawning() && e.pos.distance(player_pos) < PICKUP_RADIUS)
            .map(|e| e.id())
            .collect();
        for id in touching {
            match state.collect(id) {
                Some(Category::Collectible) => {
                    collected += 1;
                    difficulty.record_collectible();
                }
                Some(Category::Powerup(kind)) => {
                    powerups += 1;
                    log::debug!("Picked up {}", kind.as_str());
                }
                // Obstacles stay in the scene; count the first contact only
                Some(Category::Obstacle(_)) => {
                    if state.despawn(id) {
                        hits += 1;
                    }
                }
                None => {}
            }
        }
    }

    log::info!(
        "Finished {} ticks: {} spawned, {} blocked by the overlap guard",
        ticks,
        spawned,
        blocked
    );
    log::info!(
        "Collected {} collectibles and {} power-ups, {} obstacle hits",
        collected,
        powerups,
        hits
    );
    log::info!(
        "Final speed {:.1} after {} milestones, {} entities in scene, {} constructed",
        difficulty.current_speed(state.ledger()),
        difficulty.milestones(),
        state.entities().len(),
        state.pools().total_created()
    );
    if let Some(kind) = state.ledger().dominant() {
        log::info!(
            "Dominant power-up: {} ({:.0}% left)",
            kind.as_str(),
            state.ledger().progress(kind) * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["lane-rush"]).unwrap();
        assert!(cli.tuning.is_none());
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.seconds, 120.0);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["lane-rush", "--seed", "abc"]).is_err());
        assert!(Cli::try_parse_from(["lane-rush", "--seconds", "-5"]).is_err());
        assert!(Cli::try_parse_from(["lane-rush", "--seconds", "inf"]).is_err());
    }

    #[test]
    fn test_cli_accepts_tuning_path() {
        let cli = Cli::try_parse_from(["lane-rush", "cfg.json", "--seed", "7", "--seconds", "2.5"])
            .unwrap();
        assert_eq!(cli.tuning.as_deref(), Some(Path::new("cfg.json")));
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.seconds, 2.5);
    }
}
