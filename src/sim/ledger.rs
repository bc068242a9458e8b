//! Power-up ledger
//!
//! Tracks time-limited effects and resolves the dominant one: the most
//! recently activated effect that is still running. Reactivation resets the
//! countdown to the full duration, it never stacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::PowerupKind;

/// A running power-up effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerupRecord {
    pub kind: PowerupKind,
    /// Full duration (seconds)
    pub duration: f32,
    /// Seconds left
    pub remaining: f32,
    /// Ledger clock at activation
    pub activated_at: f64,
    /// Activation counter, breaks ties between same-time activations
    pub sequence: u64,
}

/// Active power-up effects and their configured durations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerupLedger {
    durations: BTreeMap<PowerupKind, f32>,
    active: BTreeMap<PowerupKind, PowerupRecord>,
    /// Seconds since the ledger was created
    clock: f64,
    activations: u64,
    dominant: Option<PowerupKind>,
}

impl PowerupLedger {
    pub fn new(durations: BTreeMap<PowerupKind, f32>) -> Self {
        Self {
            durations,
            ..Default::default()
        }
    }

    /// Start (or restart) an effect at full duration.
    /// Kinds without a configured duration are ignored.
    pub fn activate(&mut self, kind: PowerupKind) {
        let Some(&duration) = self.durations.get(&kind) else {
            log::debug!("No duration configured for {}, activation ignored", kind.as_str());
            return;
        };

        self.activations += 1;
        self.active.insert(
            kind,
            PowerupRecord {
                kind,
                duration,
                remaining: duration,
                activated_at: self.clock,
                sequence: self.activations,
            },
        );
        self.recompute_dominant();
        log::debug!("Activated power-up {} for {}s", kind.as_str(), duration);
    }

    /// End an effect early
    pub fn deactivate(&mut self, kind: PowerupKind) {
        if self.active.remove(&kind).is_some() {
            self.recompute_dominant();
            log::debug!("Deactivated power-up {}", kind.as_str());
        }
    }

    /// Decay all effects by `dt` and drop the expired ones
    pub fn tick(&mut self, dt: f32) {
        self.clock += f64::from(dt);

        let before = self.active.len();
        self.active.retain(|kind, record| {
            record.remaining -= dt;
            if record.remaining <= 0.0 {
                log::debug!("Power-up {} expired", kind.as_str());
                false
            } else {
                true
            }
        });

        if self.active.len() != before {
            self.recompute_dominant();
        }
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Remaining share of the effect in [0, 1]; 0 when inactive
    pub fn progress(&self, kind: PowerupKind) -> f32 {
        self.active
            .get(&kind)
            .map_or(0.0, |r| (r.remaining / r.duration).clamp(0.0, 1.0))
    }

    /// Seconds left on the effect, if active
    pub fn remaining(&self, kind: PowerupKind) -> Option<f32> {
        self.active.get(&kind).map(|r| r.remaining)
    }

    /// Most recently activated effect still running
    pub fn dominant(&self) -> Option<PowerupKind> {
        self.dominant
    }

    /// Running effects, ordered by kind
    pub fn records(&self) -> impl Iterator<Item = &PowerupRecord> {
        self.active.values()
    }

    /// Ledger clock (seconds)
    pub fn clock(&self) -> f64 {
        self.clock
    }

    fn recompute_dominant(&mut self) {
        self.dominant = self
            .active
            .values()
            .max_by(|a, b| {
                a.activated_at
                    .total_cmp(&b.activated_at)
                    .then(a.sequence.cmp(&b.sequence))
            })
            .map(|r| r.kind);
    }
}
