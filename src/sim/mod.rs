//! Deterministic simulation module
//!
//! All entity population logic lives here. This module must be pure and deterministic:
//! - Externally supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for entities, kind order for power-ups)
//! - No rendering or platform dependencies

pub mod category;
pub mod difficulty;
pub mod entity;
pub mod lanes;
pub mod ledger;
pub mod pool;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use category::{Category, ObstacleKind, PowerupKind};
pub use difficulty::Difficulty;
pub use entity::{Entity, EntityPhase, MotionContext, Step, Transform};
pub use lanes::{LaneGeometry, PerspectiveLanes};
pub use ledger::{PowerupLedger, PowerupRecord};
pub use pool::{EntityTemplate, PoolRegistry};
pub use scheduler::{GeneralDraw, SpawnOutcome, SpawnReport, SpawnScheduler, SpawnSite};
pub use state::RunnerState;
pub use tick::{TickInput, TickReport, tick};
