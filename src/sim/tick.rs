//! Fixed timestep simulation tick
//!
//! Phase order within one tick:
//! 1. power-up decay and dominant recompute
//! 2. guaranteed obstacle pass
//! 3. general spawn pass
//! 4. movement and despawn of the entities that were in the scene before step 2
//!
//! Entities spawned this tick are not moved until the next one.

use glam::Vec2;

use super::category::PowerupKind;
use super::entity::{MotionContext, Step};
use super::scheduler::{SpawnReport, SpawnSite};
use super::state::RunnerState;

/// Externally supplied inputs for a single tick
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Current scroll speed (units/s)
    pub speed: f32,
    /// Player position, for magnet range checks
    pub player_pos: Vec2,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            speed: crate::consts::INITIAL_SPEED,
            player_pos: Vec2::new(0.0, -400.0),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawn: SpawnReport,
    /// Entities returned to the pool registry
    pub despawned: u32,
}

/// Advance the runner state by one timestep
pub fn tick(state: &mut RunnerState, input: &TickInput, dt: f32) -> TickReport {
    state.time_ticks += 1;

    state.ledger.tick(dt);

    // Everything past this index is spawned this tick and must not move yet
    let movable = state.entities.len();

    let spawn = {
        let mut site = SpawnSite {
            pools: &mut state.pools,
            entities: &mut state.entities,
            lanes: state.lanes.as_ref(),
        };
        state.scheduler.tick(dt, input.speed, &mut site)
    };

    let ctx = MotionContext {
        speed: input.speed,
        player_pos: input.player_pos,
        magnet_active: state.ledger.is_active(PowerupKind::Magnet),
        lanes: state.lanes.as_ref(),
        tuning: &state.tuning.lifecycle,
    };

    let finished: Vec<usize> = state.entities[..movable]
        .iter_mut()
        .enumerate()
        .filter_map(|(i, entity)| (entity.update(&ctx, dt) == Step::Finished).then_some(i))
        .collect();

    // Reverse order keeps the remaining indices valid
    for &index in finished.iter().rev() {
        let entity = state.entities.remove(index);
        state.pools.release(entity);
    }

    TickReport {
        spawn,
        despawned: finished.len() as u32,
    }
}
