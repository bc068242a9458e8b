//! Pooled entity and its per-tick lifecycle
//!
//! An entity moves through `Active -> Despawning -> Pooled`. Only the pool
//! registry moves it back to `Active`, with its transform reset.

use glam::Vec2;

use super::category::Category;
use super::lanes::LaneGeometry;
use crate::tuning::{FlourishTuning, LifecycleTuning};
use crate::{cubic_in, lerp};

/// Render-facing transform (scale and opacity)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub opacity: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityPhase {
    /// In the scene, moving every tick
    Active,
    /// Playing the power-up flourish; ignores normal movement and the overlap guard
    Despawning {
        elapsed: f32,
        start_pos: Vec2,
        start: Transform,
    },
    /// Idle in its category's pool
    Pooled,
}

/// Outcome of one lifecycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still in the scene
    Alive,
    /// Done; hand back to the pool registry
    Finished,
}

/// Read-only view of the world an entity needs for one tick
pub struct MotionContext<'a> {
    /// Current scroll speed (units/s)
    pub speed: f32,
    pub player_pos: Vec2,
    pub magnet_active: bool,
    pub lanes: &'a dyn LaneGeometry,
    pub tuning: &'a LifecycleTuning,
}

/// A reusable scene object
#[derive(Debug, Clone)]
pub struct Entity {
    id: u32,
    category: Category,
    /// Lane the entity was spawned into
    pub lane: usize,
    /// x horizontal, y vertical (decreasing toward the player)
    pub pos: Vec2,
    pub transform: Transform,
    /// Transform captured at construction, restored on every release
    initial: Transform,
    phase: EntityPhase,
}

impl Entity {
    pub(crate) fn new(id: u32, category: Category, initial: Transform) -> Self {
        Self {
            id,
            category,
            lane: 0,
            pos: Vec2::ZERO,
            transform: initial,
            initial,
            phase: EntityPhase::Pooled,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn phase(&self) -> EntityPhase {
        self.phase
    }

    pub fn initial_transform(&self) -> Transform {
        self.initial
    }

    #[inline]
    pub fn is_despawning(&self) -> bool {
        matches!(self.phase, EntityPhase::Despawning { .. })
    }

    /// Place into the scene at `pos` in `lane`
    pub(crate) fn activate(&mut self, lane: usize, pos: Vec2) {
        self.lane = lane;
        self.pos = pos;
        self.phase = EntityPhase::Active;
    }

    /// Restore the construction-time transform and park in the pool
    pub(crate) fn reset(&mut self) {
        self.transform = self.initial;
        self.phase = EntityPhase::Pooled;
    }

    /// Advance one tick
    pub fn update(&mut self, ctx: &MotionContext<'_>, dt: f32) -> Step {
        match self.phase {
            EntityPhase::Pooled => Step::Finished,
            EntityPhase::Despawning { .. } => self.advance_flourish(&ctx.tuning.flourish, dt),
            EntityPhase::Active => {
                let attracted = self.category.magnet_eligible()
                    && ctx.magnet_active
                    && self.pos.distance(ctx.player_pos) < ctx.tuning.magnet_radius;

                if attracted {
                    let alpha = ctx.tuning.magnet.alpha(dt);
                    self.pos = self.pos.lerp(ctx.player_pos, alpha);
                } else {
                    self.pos.y -= ctx.speed * dt;
                    self.pos.x = ctx.lanes.lane_center_x(self.lane, self.pos.y);
                }

                if self.pos.y < ctx.tuning.off_screen_y {
                    self.begin_despawn()
                } else {
                    Step::Alive
                }
            }
        }
    }

    /// Leave the scene: power-ups start their flourish, everything else finishes now.
    /// Calling this on an entity already despawning has no effect.
    pub fn begin_despawn(&mut self) -> Step {
        match self.phase {
            EntityPhase::Despawning { .. } => Step::Alive,
            EntityPhase::Pooled => Step::Finished,
            EntityPhase::Active if self.category.powerup().is_some() => {
                self.phase = EntityPhase::Despawning {
                    elapsed: 0.0,
                    start_pos: self.pos,
                    start: self.transform,
                };
                Step::Alive
            }
            EntityPhase::Active => Step::Finished,
        }
    }

    fn advance_flourish(&mut self, flourish: &FlourishTuning, dt: f32) -> Step {
        let EntityPhase::Despawning {
            elapsed,
            start_pos,
            start,
        } = &mut self.phase
        else {
            return Step::Alive;
        };

        *elapsed += dt;
        let t = *elapsed;

        self.pos = start_pos.lerp(flourish.focal_point, cubic_in(t / flourish.move_duration));
        self.transform.scale = lerp(
            start.scale,
            flourish.target_scale,
            cubic_in(t / flourish.scale_duration),
        );
        self.transform.opacity = lerp(start.opacity, 0.0, cubic_in(t / flourish.duration));

        if t >= flourish.duration {
            Step::Finished
        } else {
            Step::Alive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::category::{ObstacleKind, PowerupKind};
    use crate::sim::lanes::PerspectiveLanes;
    use crate::tuning::MagnetApproach;

    fn spawned(category: Category, lane: usize, lanes: &PerspectiveLanes) -> Entity {
        let mut entity = Entity::new(1, category, Transform::default());
        entity.activate(lane, Vec2::new(lanes.lane_center_x(lane, SPAWN_Y), SPAWN_Y));
        entity
    }

    fn ctx<'a>(
        lanes: &'a PerspectiveLanes,
        tuning: &'a LifecycleTuning,
        speed: f32,
        magnet_active: bool,
    ) -> MotionContext<'a> {
        MotionContext {
            speed,
            player_pos: Vec2::new(0.0, -400.0),
            magnet_active,
            lanes,
            tuning,
        }
    }

    #[test]
    fn test_movement_integration() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let mut entity = spawned(Category::Collectible, 0, &lanes);
        let ctx = ctx(&lanes, &tuning, 300.0, false);

        for _ in 0..60 {
            assert_eq!(entity.update(&ctx, SIM_DT), Step::Alive);
        }

        assert!((SPAWN_Y - entity.pos.y - 300.0).abs() < 0.01);
        // x follows the lane curve, not a straight line
        assert!((entity.pos.x - lanes.lane_center_x(0, entity.pos.y)).abs() < 1e-4);
    }

    #[test]
    fn test_magnet_pulls_collectible_in_range() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning {
            magnet: MagnetApproach::PerTick { fraction: 0.1 },
            ..Default::default()
        };
        let mut entity = spawned(Category::Collectible, 1, &lanes);
        entity.pos = Vec2::new(0.0, -100.0);
        let ctx = ctx(&lanes, &tuning, 300.0, true);

        entity.update(&ctx, SIM_DT);
        // 10% of the 300 units to the player at y = -400
        assert!((entity.pos.y - (-130.0)).abs() < 1e-3);
    }

    #[test]
    fn test_magnet_ignores_obstacles_and_far_entities() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let ctx = ctx(&lanes, &tuning, 300.0, true);

        let mut obstacle = spawned(Category::Obstacle(ObstacleKind::Crate), 1, &lanes);
        obstacle.pos = Vec2::new(0.0, -100.0);
        obstacle.update(&ctx, SIM_DT);
        assert!((obstacle.pos.y - (-105.0)).abs() < 1e-3);

        // At the spawn row the player is 950 units away
        let mut far = spawned(Category::Collectible, 1, &lanes);
        far.update(&ctx, SIM_DT);
        assert!((far.pos.y - (SPAWN_Y - 5.0)).abs() < 1e-3);
    }

    #[test]
    fn test_time_normalized_magnet_is_rate_independent() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let ctx = ctx(&lanes, &tuning, 0.0, true);

        let mut at_60 = spawned(Category::Collectible, 1, &lanes);
        at_60.pos = Vec2::new(0.0, 0.0);
        let mut at_120 = at_60.clone();

        for _ in 0..30 {
            at_60.update(&ctx, 1.0 / 60.0);
        }
        for _ in 0..60 {
            at_120.update(&ctx, 1.0 / 120.0);
        }
        assert!((at_60.pos.y - at_120.pos.y).abs() < 0.5);
    }

    #[test]
    fn test_offscreen_collectible_finishes_immediately() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let mut entity = spawned(Category::Collectible, 2, &lanes);
        entity.pos.y = OFF_SCREEN_Y + 1.0;
        let ctx = ctx(&lanes, &tuning, 300.0, false);
        assert_eq!(entity.update(&ctx, SIM_DT), Step::Finished);
    }

    #[test]
    fn test_powerup_flourish() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let mut entity = spawned(Category::Powerup(PowerupKind::Speed), 0, &lanes);
        entity.pos.y = OFF_SCREEN_Y + 1.0;
        let ctx = ctx(&lanes, &tuning, 300.0, false);

        assert_eq!(entity.update(&ctx, SIM_DT), Step::Alive);
        assert!(entity.is_despawning());

        // Second despawn request is ignored
        assert_eq!(entity.begin_despawn(), Step::Alive);

        let mut ticks = 0;
        while entity.update(&ctx, SIM_DT) == Step::Alive {
            ticks += 1;
            assert!(ticks < 100, "flourish never finished");
        }
        // 0.5 s at 60 Hz
        assert!((29..=31).contains(&ticks));
        assert!((entity.pos - tuning.flourish.focal_point).length() < 1e-3);
        assert!((entity.transform.scale - 2.0).abs() < 1e-3);
        assert!(entity.transform.opacity.abs() < 1e-3);
    }

    #[test]
    fn test_flourish_scale_is_absolute() {
        let lanes = PerspectiveLanes::default();
        let tuning = LifecycleTuning::default();
        let initial = Transform {
            scale: 0.6,
            opacity: 1.0,
        };
        let mut entity = Entity::new(1, Category::Powerup(PowerupKind::Magnet), initial);
        entity.activate(1, Vec2::new(0.0, SPAWN_Y));
        assert_eq!(entity.begin_despawn(), Step::Alive);

        let ctx = ctx(&lanes, &tuning, 300.0, false);
        let mut last = entity.transform;
        while entity.update(&ctx, SIM_DT) == Step::Alive {
            last = entity.transform;
        }
        assert!((last.scale - tuning.flourish.target_scale).abs() < 1e-3);
    }
}
