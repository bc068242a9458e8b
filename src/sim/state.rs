//! Runner state
//!
//! Owns the pools, the active entity list, the power-up ledger and the spawn
//! scheduler. The renderer reads [`RunnerState::entities`]; the collision
//! collaborator reports pickups through [`RunnerState::collect`].

use super::category::Category;
use super::entity::{Entity, Step};
use super::lanes::{LaneGeometry, PerspectiveLanes};
use super::ledger::PowerupLedger;
use super::pool::PoolRegistry;
use super::scheduler::{SpawnOutcome, SpawnScheduler, SpawnSite};
use crate::tuning::Tuning;

/// Complete simulation state of one run
pub struct RunnerState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) tuning: Tuning,
    pub(crate) lanes: Box<dyn LaneGeometry>,
    pub(crate) pools: PoolRegistry,
    /// Entities in the scene, in spawn order
    pub(crate) entities: Vec<Entity>,
    pub(crate) ledger: PowerupLedger,
    pub(crate) scheduler: SpawnScheduler,
}

impl RunnerState {
    /// New run on the default perspective lane curve
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let lanes = Box::new(PerspectiveLanes::new(&tuning.lanes));
        Self::with_geometry(tuning, seed, lanes)
    }

    /// New run on a caller-supplied lane curve
    pub fn with_geometry(tuning: Tuning, seed: u64, lanes: Box<dyn LaneGeometry>) -> Self {
        let pools = PoolRegistry::from_tuning(&tuning.pools);
        let ledger = PowerupLedger::new(tuning.powerup_durations.clone());
        let scheduler = SpawnScheduler::new(tuning.spawn.clone(), seed);

        log::info!(
            "Runner initialized: seed {}, {} lanes, {} pools",
            seed,
            lanes.lane_count(),
            tuning.pools.len()
        );

        Self {
            seed,
            time_ticks: 0,
            tuning,
            lanes,
            pools,
            entities: Vec::new(),
            ledger,
            scheduler,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn lanes(&self) -> &dyn LaneGeometry {
        self.lanes.as_ref()
    }

    /// Entities currently in the scene
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn ledger(&self) -> &PowerupLedger {
        &self.ledger
    }

    /// Direct ledger access for collaborators that grant effects outside pickups
    pub fn ledger_mut(&mut self) -> &mut PowerupLedger {
        &mut self.ledger
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut PoolRegistry {
        &mut self.pools
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    /// Guarded spawn of one entity at the spawn row, outside the timers
    pub fn spawn(&mut self, category: Category, lane: usize) -> SpawnOutcome {
        let mut site = SpawnSite {
            pools: &mut self.pools,
            entities: &mut self.entities,
            lanes: self.lanes.as_ref(),
        };
        self.scheduler.try_spawn(category, lane, &mut site)
    }

    /// Pickup reported by collision detection.
    ///
    /// Power-ups activate their effect and start the despawn flourish,
    /// collectibles leave the scene at once, obstacles stay put. Returns the
    /// category, or `None` if `id` is not in the scene or already despawning.
    pub fn collect(&mut self, id: u32) -> Option<Category> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id && !e.is_despawning())?;
        let category = self.entities[index].category();

        if category.is_obstacle() {
            return Some(category);
        }
        if let Some(kind) = category.powerup() {
            self.ledger.activate(kind);
        }
        self.despawn_at(index);
        Some(category)
    }

    /// Start despawning `id` without moving it; false if it is not in the scene
    pub fn despawn(&mut self, id: u32) -> bool {
        match self.entities.iter().position(|e| e.id() == id) {
            Some(index) => {
                self.despawn_at(index);
                true
            }
            None => false,
        }
    }

    fn despawn_at(&mut self, index: usize) {
        if self.entities[index].begin_despawn() == Step::Finished {
            let entity = self.entities.remove(index);
            self.pools.release(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::category::{ObstacleKind, PowerupKind};

    fn spawned(state: &mut RunnerState, category: Category, lane: usize) -> u32 {
        match state.spawn(category, lane) {
            SpawnOutcome::Spawned(id) => id,
            other => panic!("spawn failed: {:?}", other),
        }
    }

    #[test]
    fn test_collect_collectible_returns_to_pool() {
        let mut state = RunnerState::new(Tuning::default(), 1);
        let pooled = state.pools().pooled(Category::Collectible);
        let id = spawned(&mut state, Category::Collectible, 0);
        assert_eq!(state.pools().pooled(Category::Collectible), pooled - 1);

        assert_eq!(state.collect(id), Some(Category::Collectible));
        assert!(state.entity(id).is_none());
        assert_eq!(state.pools().pooled(Category::Collectible), pooled);
    }

    #[test]
    fn test_collect_powerup_activates_and_animates() {
        let mut state = RunnerState::new(Tuning::default(), 1);
        let magnet = Category::Powerup(PowerupKind::Magnet);
        let id = spawned(&mut state, magnet, 1);

        assert_eq!(state.collect(id), Some(magnet));
        assert!(state.ledger().is_active(PowerupKind::Magnet));
        assert_eq!(state.ledger().dominant(), Some(PowerupKind::Magnet));
        assert!(state.entity(id).unwrap().is_despawning());

        // Already despawning: a second pickup is ignored
        assert_eq!(state.collect(id), None);
    }

    #[test]
    fn test_collect_obstacle_stays_in_scene() {
        let mut state = RunnerState::new(Tuning::default(), 1);
        let crate_ = Category::Obstacle(ObstacleKind::Crate);
        let id = spawned(&mut state, crate_, 2);

        assert_eq!(state.collect(id), Some(crate_));
        assert!(!state.entity(id).unwrap().is_despawning());
    }

    #[test]
    fn test_collect_unknown_id() {
        let mut state = RunnerState::new(Tuning::default(), 1);
        assert_eq!(state.collect(9999), None);
        assert!(!state.despawn(9999));
    }

    #[test]
    fn test_spawn_is_guarded() {
        let mut state = RunnerState::new(Tuning::default(), 1);
        spawned(&mut state, Category::Collectible, 1);
        assert_eq!(state.spawn(Category::Collectible, 1), SpawnOutcome::Blocked);
        assert_eq!(state.entities().len(), 1);
        assert_eq!(state.entities()[0].pos.y, SPAWN_Y);
    }
}
