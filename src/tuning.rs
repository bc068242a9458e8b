//! Data-driven game balance
//!
//! Every constant the simulation consults lives here so a run can be retuned
//! from a JSON file without rebuilding. Missing fields fall back to the
//! defaults in [`crate::consts`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::category::{Category, ObstacleKind, PowerupKind};

/// Errors produced while loading, saving or validating tuning data
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    /// The JSON document could not be parsed
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    /// The tuning could not be written out
    #[error("failed to serialize tuning: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A field holds a value the simulation cannot run with
    #[error("invalid tuning value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Perspective lane curve parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneTuning {
    /// Lane center offsets at unit scale; its length is the lane count
    pub offsets: Vec<f32>,
    /// Height over which the perspective scale is interpolated
    pub base_height: f32,
    /// Scale at y = 0
    pub scale_top: f32,
    /// Scale at y = base_height
    pub scale_bottom: f32,
    /// Curve exponent
    pub scale_exp: f32,
}

impl Default for LaneTuning {
    fn default() -> Self {
        Self {
            offsets: LANE_OFFSETS.to_vec(),
            base_height: 960.0,
            scale_top: 1.5,
            scale_bottom: 0.5,
            scale_exp: 1.2,
        }
    }
}

/// Spawn scheduler parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub spawn_y: f32,
    pub min_spawn_gap: f32,
    /// Seconds between guaranteed obstacle patterns
    pub obstacle_interval: f32,
    /// Multiplier applied to dt for the general timer
    pub acceleration: f32,
    /// General interval = scale / speed
    pub general_interval_scale: f32,
    /// Draws below this spawn a power-up
    pub powerup_chance: f32,
    /// Draws in [powerup_chance, obstacle_chance) spawn an obstacle pattern
    pub obstacle_chance: f32,
    /// Largest collectible pattern (capped at the lane count)
    pub max_collectibles: usize,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_y: SPAWN_Y,
            min_spawn_gap: MIN_SPAWN_GAP,
            obstacle_interval: OBSTACLE_INTERVAL,
            acceleration: GENERAL_ACCELERATION,
            general_interval_scale: GENERAL_INTERVAL_SCALE,
            powerup_chance: 0.2,
            obstacle_chance: 0.4,
            max_collectibles: 3,
        }
    }
}

/// How magnet-attracted entities close the distance to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MagnetApproach {
    /// Fixed share of the remaining distance every tick (frame-rate dependent)
    PerTick { fraction: f32 },
    /// `1 - exp(-rate * dt)` of the remaining distance every tick
    TimeNormalized { rate: f32 },
}

impl MagnetApproach {
    /// Share of the remaining distance to cover this tick
    pub fn alpha(&self, dt: f32) -> f32 {
        match *self {
            MagnetApproach::PerTick { fraction } => fraction,
            MagnetApproach::TimeNormalized { rate } => 1.0 - (-rate * dt).exp(),
        }
    }
}

impl Default for MagnetApproach {
    /// Matches a 10% per-tick pull at 60 Hz
    fn default() -> Self {
        MagnetApproach::TimeNormalized {
            rate: -(1.0 - MAGNET_FRACTION).ln() / SIM_DT,
        }
    }
}

/// Power-up despawn flourish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlourishTuning {
    /// Total length; the entity returns to its pool when this elapses
    pub duration: f32,
    /// Time to reach the focal point
    pub move_duration: f32,
    /// Time to reach the target scale
    pub scale_duration: f32,
    pub focal_point: Vec2,
    /// Absolute scale reached at the end of the scale ease
    pub target_scale: f32,
}

impl Default for FlourishTuning {
    fn default() -> Self {
        Self {
            duration: FLOURISH_DURATION,
            move_duration: 0.05,
            scale_duration: 0.3,
            focal_point: Vec2::new(270.0, 480.0),
            target_scale: 2.0,
        }
    }
}

/// Per-entity movement and despawn parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    pub off_screen_y: f32,
    pub magnet_radius: f32,
    pub magnet: MagnetApproach,
    pub flourish: FlourishTuning,
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            off_screen_y: OFF_SCREEN_Y,
            magnet_radius: MAGNET_RADIUS,
            magnet: MagnetApproach::default(),
            flourish: FlourishTuning::default(),
        }
    }
}

/// Speed scaling of the difficulty collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Seconds of play per milestone
    pub milestone_seconds: f32,
    /// Collectibles per milestone
    pub milestone_collectibles: u32,
    /// Base speed multiplier per milestone
    pub milestone_factor: f32,
    /// Speed multiplier while the Speed power-up is active
    pub boost_factor: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            milestone_seconds: 40.0,
            milestone_collectibles: 50,
            milestone_factor: 1.10,
            boost_factor: 2.0,
        }
    }
}

/// Template and pre-warm count for one category's pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolTuning {
    pub category: Category,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub prewarm: usize,
}

fn default_scale() -> f32 {
    1.0
}

fn default_opacity() -> f32 {
    1.0
}

impl PoolTuning {
    fn new(category: Category, prewarm: usize) -> Self {
        Self {
            category,
            scale: default_scale(),
            opacity: default_opacity(),
            prewarm,
        }
    }
}

/// Complete tuning set for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lanes: LaneTuning,
    pub spawn: SpawnTuning,
    pub lifecycle: LifecycleTuning,
    pub difficulty: DifficultyTuning,
    /// Power-up durations in seconds; kinds without an entry cannot activate
    pub powerup_durations: BTreeMap<PowerupKind, f32>,
    /// Registered pools; categories missing here are never spawned
    pub pools: Vec<PoolTuning>,
}

impl Default for Tuning {
    fn default() -> Self {
        let powerup_durations = BTreeMap::from([
            (PowerupKind::Speed, 4.0),
            (PowerupKind::Magnet, 6.0),
            (PowerupKind::Multiplier, 10.0),
            (PowerupKind::Shield, 8.0),
        ]);

        let mut pools = vec![PoolTuning::new(Category::Collectible, 20)];
        pools.extend(
            ObstacleKind::ALL
                .iter()
                .map(|&kind| PoolTuning::new(Category::Obstacle(kind), 5)),
        );
        pools.extend(
            PowerupKind::ALL
                .iter()
                .map(|&kind| PoolTuning::new(Category::Powerup(kind), 2)),
        );

        Self {
            lanes: LaneTuning::default(),
            spawn: SpawnTuning::default(),
            lifecycle: LifecycleTuning::default(),
            difficulty: DifficultyTuning::default(),
            powerup_durations,
            pools,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        serde_json::to_string_pretty(self).map_err(TuningError::Serialize)
    }

    /// Number of lanes described by the lane curve
    pub fn lane_count(&self) -> usize {
        self.lanes.offsets.len()
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.lanes.offsets.is_empty() {
            return Err(invalid("lanes.offsets", "at least one lane is required"));
        }
        if self.lanes.base_height <= 0.0 {
            return Err(invalid("lanes.base_height", "must be positive"));
        }
        if self.spawn.obstacle_interval <= 0.0 {
            return Err(invalid("spawn.obstacle_interval", "must be positive"));
        }
        if self.spawn.acceleration <= 0.0 {
            return Err(invalid("spawn.acceleration", "must be positive"));
        }
        if self.spawn.general_interval_scale <= 0.0 {
            return Err(invalid("spawn.general_interval_scale", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.spawn.powerup_chance)
            || !(self.spawn.powerup_chance..=1.0).contains(&self.spawn.obstacle_chance)
        {
            return Err(invalid(
                "spawn.obstacle_chance",
                format!(
                    "need 0 <= powerup_chance ({}) <= obstacle_chance ({}) <= 1",
                    self.spawn.powerup_chance, self.spawn.obstacle_chance
                ),
            ));
        }
        if self.spawn.max_collectibles == 0 {
            return Err(invalid("spawn.max_collectibles", "must be at least 1"));
        }
        if self.lifecycle.off_screen_y >= self.spawn.spawn_y {
            return Err(invalid(
                "lifecycle.off_screen_y",
                "must lie below spawn.spawn_y",
            ));
        }
        let flourish = &self.lifecycle.flourish;
        if flourish.duration <= 0.0 || flourish.move_duration <= 0.0 || flourish.scale_duration <= 0.0
        {
            return Err(invalid("lifecycle.flourish", "durations must be positive"));
        }
        if self.difficulty.milestone_seconds <= 0.0 {
            return Err(invalid("difficulty.milestone_seconds", "must be positive"));
        }
        if self.difficulty.milestone_factor < 1.0 {
            return Err(invalid("difficulty.milestone_factor", "must be at least 1"));
        }
        if self.difficulty.boost_factor <= 0.0 {
            return Err(invalid("difficulty.boost_factor", "must be positive"));
        }
        if self.difficulty.initial_speed <= 0.0
            || self.difficulty.max_speed < self.difficulty.initial_speed
        {
            return Err(invalid(
                "difficulty.max_speed",
                "need 0 < initial_speed <= max_speed",
            ));
        }
        if let Some((kind, _)) = self.powerup_durations.iter().find(|(_, d)| **d <= 0.0) {
            return Err(invalid(
                "powerup_durations",
                format!("{:?} duration must be positive", kind),
            ));
        }
        Ok(())
    }
}
