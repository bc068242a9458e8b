//! Procedural spawn scheduler
//!
//! Two timers drive spawning. The obstacle timer guarantees an obstacle pair
//! every `obstacle_interval` seconds. The general timer runs faster than real
//! time and, whenever it passes an interval that shrinks as speed grows, draws
//! a power-up, an obstacle pair or a collectible pattern.
//!
//! Every single spawn goes through the overlap guard. A rejected spawn is
//! dropped, never retried or substituted.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::category::{Category, ObstacleKind, PowerupKind};
use super::entity::Entity;
use super::lanes::LaneGeometry;
use super::pool::PoolRegistry;
use crate::tuning::SpawnTuning;

/// Everything a spawn touches: the pools, the active entity list and the lane curve
pub struct SpawnSite<'a> {
    pub pools: &'a mut PoolRegistry,
    pub entities: &'a mut Vec<Entity>,
    pub lanes: &'a dyn LaneGeometry,
}

/// Result of one guarded spawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Entity placed at the spawn row
    Spawned(u32),
    /// Lane too crowded near the spawn row
    Blocked,
    /// No template registered for the category
    Unavailable,
}

/// What a general-timer draw spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralDraw {
    Powerup,
    Obstacles,
    /// Obstacle draw while the obstacle timer fired this tick
    Suppressed,
    Collectibles,
}

/// Summary of one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacle_pass: bool,
    pub general: Option<GeneralDraw>,
    pub spawned: u32,
    pub blocked: u32,
    pub unavailable: u32,
}

impl SpawnReport {
    fn record(&mut self, outcome: SpawnOutcome) {
        match outcome {
            SpawnOutcome::Spawned(_) => self.spawned += 1,
            SpawnOutcome::Blocked => self.blocked += 1,
            SpawnOutcome::Unavailable => self.unavailable += 1,
        }
    }
}

/// Timers, RNG and spawn rules
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    tuning: SpawnTuning,
    obstacle_timer: f32,
    general_timer: f32,
    rng: Pcg32,
}

impl SpawnScheduler {
    pub fn new(tuning: SpawnTuning, seed: u64) -> Self {
        Self {
            tuning,
            obstacle_timer: 0.0,
            general_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    pub fn obstacle_timer(&self) -> f32 {
        self.obstacle_timer
    }

    pub fn general_timer(&self) -> f32 {
        self.general_timer
    }

    /// General interval at `speed`; spawns densify as speed grows
    pub fn general_interval(&self, speed: f32) -> f32 {
        if speed <= 0.0 {
            f32::INFINITY
        } else {
            self.tuning.general_interval_scale / speed
        }
    }

    /// Map a uniform draw to the general-pass action
    pub fn classify(&self, r: f32, obstacle_fired: bool) -> GeneralDraw {
        if r < self.tuning.powerup_chance {
            GeneralDraw::Powerup
        } else if r < self.tuning.obstacle_chance {
            if obstacle_fired {
                GeneralDraw::Suppressed
            } else {
                GeneralDraw::Obstacles
            }
        } else {
            GeneralDraw::Collectibles
        }
    }

    /// Run the obstacle pass then the general pass
    pub fn tick(&mut self, dt: f32, speed: f32, site: &mut SpawnSite<'_>) -> SpawnReport {
        let mut report = SpawnReport::default();

        self.obstacle_timer += dt;
        self.general_timer += dt * self.tuning.acceleration;

        // Guaranteed obstacles
        if self.obstacle_timer >= self.tuning.obstacle_interval {
            self.obstacle_timer = 0.0;
            report.obstacle_pass = true;
            self.spawn_obstacle_pattern(site, &mut report);
        }

        // General random spawning
        if self.general_timer >= self.general_interval(speed) {
            self.general_timer = 0.0;

            let r: f32 = self.rng.random();
            let draw = self.classify(r, report.obstacle_pass);
            report.general = Some(draw);

            match draw {
                GeneralDraw::Powerup => self.spawn_random_powerup(site, &mut report),
                GeneralDraw::Obstacles => self.spawn_obstacle_pattern(site, &mut report),
                GeneralDraw::Suppressed => {}
                GeneralDraw::Collectibles => self.spawn_collectible_pattern(site, &mut report),
            }
        }

        if report.spawned > 0 || report.blocked > 0 {
            log::debug!(
                "Spawn tick: {} spawned, {} blocked, {} unavailable",
                report.spawned,
                report.blocked,
                report.unavailable
            );
        }

        report
    }

    /// One random obstacle in a random lane, then one in a different lane
    pub fn spawn_obstacle_pattern(&mut self, site: &mut SpawnSite<'_>, report: &mut SpawnReport) {
        let lane_count = site.lanes.lane_count();
        if lane_count == 0 {
            return;
        }

        let first = self.rng.random_range(0..lane_count);
        let outcome = self.spawn_random_obstacle(first, site);
        report.record(outcome);

        if lane_count < 2 {
            return;
        }

        let mut second = self.rng.random_range(0..lane_count - 1);
        if second >= first {
            second += 1;
        }
        let outcome = self.spawn_random_obstacle(second, site);
        report.record(outcome);
    }

    /// One random power-up kind in one random lane
    pub fn spawn_random_powerup(&mut self, site: &mut SpawnSite<'_>, report: &mut SpawnReport) {
        let lane_count = site.lanes.lane_count();
        if lane_count == 0 {
            return;
        }

        let kind = PowerupKind::ALL[self.rng.random_range(0..PowerupKind::ALL.len())];
        let lane = self.rng.random_range(0..lane_count);
        let outcome = self.try_spawn(Category::Powerup(kind), lane, site);
        report.record(outcome);
    }

    /// One to three collectibles, each in a distinct lane
    pub fn spawn_collectible_pattern(
        &mut self,
        site: &mut SpawnSite<'_>,
        report: &mut SpawnReport,
    ) {
        let lane_count = site.lanes.lane_count();
        let max = self.tuning.max_collectibles.min(lane_count);
        if max == 0 {
            return;
        }

        let count = self.rng.random_range(1..=max);
        let lanes = rand::seq::index::sample(&mut self.rng, lane_count, count);
        for lane in lanes.iter() {
            let outcome = self.try_spawn(Category::Collectible, lane, site);
            report.record(outcome);
        }
    }

    fn spawn_random_obstacle(&mut self, lane: usize, site: &mut SpawnSite<'_>) -> SpawnOutcome {
        let kind = ObstacleKind::ALL[self.rng.random_range(0..ObstacleKind::ALL.len())];
        self.try_spawn(Category::Obstacle(kind), lane, site)
    }

    /// Whether the nearest unresolved entity in `lane` sits too close to the spawn row
    pub fn lane_blocked(&self, lane: usize, entities: &[Entity]) -> bool {
        let highest = entities
            .iter()
            .filter(|e| e.lane == lane && !e.is_despawning())
            .map(|e| e.pos.y)
            .fold(f32::NEG_INFINITY, f32::max);

        self.tuning.spawn_y - highest < self.tuning.min_spawn_gap
    }

    /// Guarded spawn of one `category` entity in `lane`
    pub fn try_spawn(&self, category: Category, lane: usize, site: &mut SpawnSite<'_>) -> SpawnOutcome {
        if self.lane_blocked(lane, site.entities) {
            log::trace!("Skipped {} in lane {}: too close to an existing entity", category, lane);
            return SpawnOutcome::Blocked;
        }

        let Some(mut entity) = site.pools.acquire(category) else {
            return SpawnOutcome::Unavailable;
        };

        let y = self.tuning.spawn_y;
        entity.activate(lane, Vec2::new(site.lanes.lane_center_x(lane, y), y));
        let id = entity.id();
        site.entities.push(entity);
        log::trace!("Spawned {} #{} in lane {}", category, id, lane);
        SpawnOutcome::Spawned(id)
    }
}
