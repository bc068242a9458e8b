//! Lane Rush - entity population core for an endless lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, pooling, power-ups, movement)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the lane runner was tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Number of lanes
    pub const LANE_COUNT: usize = 3;
    /// Lane center offsets at unit perspective scale
    pub const LANE_OFFSETS: [f32; LANE_COUNT] = [-120.0, 0.0, 120.0];

    /// Vertical row where entities appear
    pub const SPAWN_Y: f32 = 550.0;
    /// Below this row an entity is off-screen and despawns
    pub const OFF_SCREEN_Y: f32 = -550.0;
    /// Minimum vertical gap between a new spawn and the nearest entity in its lane
    pub const MIN_SPAWN_GAP: f32 = 150.0;

    /// Seconds between guaranteed obstacle patterns
    pub const OBSTACLE_INTERVAL: f32 = 3.0;
    /// General timer runs this many times faster than real time
    pub const GENERAL_ACCELERATION: f32 = 5.0;
    /// General interval is this value divided by the current speed
    pub const GENERAL_INTERVAL_SCALE: f32 = 200.0;

    /// Magnet pull range (world units)
    pub const MAGNET_RADIUS: f32 = 450.0;
    /// Share of the remaining distance covered per tick at 60 Hz
    pub const MAGNET_FRACTION: f32 = 0.1;

    /// Power-up despawn flourish length (seconds)
    pub const FLOURISH_DURATION: f32 = 0.5;

    /// Speed defaults
    pub const INITIAL_SPEED: f32 = 300.0;
    pub const MAX_SPEED: f32 = 800.0;
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-in on `t` clamped to [0, 1]
#[inline]
pub fn cubic_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}
