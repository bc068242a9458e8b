//! Scroll speed collaborator
//!
//! Base speed rises by a fixed factor at every milestone. Milestones come from
//! play time and from collectibles picked up, whichever accrues first. The
//! Speed power-up multiplies the result while it runs.

use serde::{Deserialize, Serialize};

use super::category::PowerupKind;
use super::ledger::PowerupLedger;
use crate::tuning::DifficultyTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    tuning: DifficultyTuning,
    base_speed: f32,
    elapsed: f32,
    collected: u32,
    milestones: u32,
}

impl Difficulty {
    pub fn new(tuning: DifficultyTuning) -> Self {
        Self {
            base_speed: tuning.initial_speed,
            tuning,
            elapsed: 0.0,
            collected: 0,
            milestones: 0,
        }
    }

    /// Advance play time and apply any milestones reached
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.apply_milestones();
    }

    /// Count a collectible pickup
    pub fn record_collectible(&mut self) {
        self.collected += 1;
        self.apply_milestones();
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn milestones(&self) -> u32 {
        self.milestones
    }

    /// Scroll speed for this tick, boosted while Speed is active
    pub fn current_speed(&self, ledger: &PowerupLedger) -> f32 {
        if ledger.is_active(PowerupKind::Speed) {
            self.base_speed * self.tuning.boost_factor
        } else {
            self.base_speed
        }
    }

    fn apply_milestones(&mut self) {
        let by_time = (self.elapsed / self.tuning.milestone_seconds).floor() as u32;
        let by_pickups = self.collected / self.tuning.milestone_collectibles.max(1);
        let expected = by_time.saturating_add(by_pickups);

        if expected > self.milestones {
            let steps = (expected - self.milestones).min(i32::MAX as u32) as i32;
            self.base_speed = (self.base_speed * self.tuning.milestone_factor.powi(steps))
                .min(self.tuning.max_speed);
            self.milestones = expected;
            log::info!("Difficulty increased! New speed: {:.1}", self.base_speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;

    #[test]
    fn test_time_milestone() {
        let mut difficulty = Difficulty::new(DifficultyTuning::default());
        difficulty.tick(39.9);
        assert_eq!(difficulty.base_speed(), 300.0);

        difficulty.tick(0.2);
        assert_eq!(difficulty.milestones(), 1);
        assert!((difficulty.base_speed() - 330.0).abs() < 1e-3);
    }

    #[test]
    fn test_collectible_milestone() {
        let mut difficulty = Difficulty::new(DifficultyTuning::default());
        for _ in 0..50 {
            difficulty.record_collectible();
        }
        assert_eq!(difficulty.milestones(), 1);
        assert!((difficulty.base_speed() - 330.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_capped() {
        let mut difficulty = Difficulty::new(DifficultyTuning::default());
        difficulty.tick(40.0 * 30.0);
        assert_eq!(difficulty.base_speed(), 800.0);
    }

    #[test]
    fn test_speed_powerup_doubles() {
        let difficulty = Difficulty::new(DifficultyTuning::default());
        let mut ledger = PowerupLedger::new(Tuning::default().powerup_durations);
        assert_eq!(difficulty.current_speed(&ledger), 300.0);
        ledger.activate(PowerupKind::Speed);
        assert_eq!(difficulty.current_speed(&ledger), 600.0);
    }

    #[test]
    fn test_zero_milestone_seconds_saturates() {
        let tuning = DifficultyTuning {
            milestone_seconds: 0.0,
            ..Default::default()
        };
        let mut difficulty = Difficulty::new(tuning);
        difficulty.tick(crate::consts::SIM_DT);
        assert_eq!(difficulty.milestones(), u32::MAX);
        assert_eq!(difficulty.base_speed(), 800.0);

        // Further pickups must not overflow the milestone count
        difficulty.record_collectible();
        for _ in 0..50 {
            difficulty.record_collectible();
        }
        assert_eq!(difficulty.milestones(), u32::MAX);
    }
}
