//! Lane geometry
//!
//! Lanes converge toward the horizon, so a lane's horizontal center depends on
//! the vertical coordinate. Positions must always be recomputed through
//! [`LaneGeometry`]; translating along a straight line drifts off the curve.

use crate::lerp;
use crate::tuning::LaneTuning;

/// Horizontal center of a lane at a given vertical position
pub trait LaneGeometry {
    /// Number of lanes
    fn lane_count(&self) -> usize;

    /// Horizontal center of `lane` at vertical position `y`
    fn lane_center_x(&self, lane: usize, y: f32) -> f32;
}

/// Perspective lane curve: offsets scaled by a power curve over the screen height
#[derive(Debug, Clone)]
pub struct PerspectiveLanes {
    offsets: Vec<f32>,
    base_height: f32,
    scale_top: f32,
    scale_bottom: f32,
    scale_exp: f32,
}

impl PerspectiveLanes {
    pub fn new(tuning: &LaneTuning) -> Self {
        Self {
            offsets: tuning.offsets.clone(),
            base_height: tuning.base_height,
            scale_top: tuning.scale_top,
            scale_bottom: tuning.scale_bottom,
            scale_exp: tuning.scale_exp,
        }
    }

    /// Perspective scale at vertical position `y`
    pub fn scale_at(&self, y: f32) -> f32 {
        let t = (y / self.base_height).clamp(0.0, 1.0);
        lerp(self.scale_top, self.scale_bottom, t.powf(self.scale_exp))
    }
}

impl Default for PerspectiveLanes {
    fn default() -> Self {
        Self::new(&LaneTuning::default())
    }
}

impl LaneGeometry for PerspectiveLanes {
    fn lane_count(&self) -> usize {
        self.offsets.len()
    }

    fn lane_center_x(&self, lane: usize, y: f32) -> f32 {
        // Out-of-range lanes collapse onto the center line
        let offset = self.offsets.get(lane).copied().unwrap_or(0.0);
        offset * self.scale_at(y)
    }
}
