//! Per-category entity pools
//!
//! Pools are a cache, not a capacity limit: an empty pool constructs a fresh
//! entity on demand. Entities are moved in and out by value, so an entity is
//! either owned by a pool or by the scene, never both.

use std::collections::HashMap;

use super::category::Category;
use super::entity::{Entity, Transform};
use crate::tuning::PoolTuning;

/// Construction template for a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTemplate {
    pub initial: Transform,
}

impl Default for EntityTemplate {
    fn default() -> Self {
        Self {
            initial: Transform::default(),
        }
    }
}

#[derive(Debug)]
struct Pool {
    template: EntityTemplate,
    idle: Vec<Entity>,
    created: usize,
}

/// Registry of per-category pools
#[derive(Debug)]
pub struct PoolRegistry {
    pools: HashMap<Category, Pool>,
    /// Next entity ID (unique across all categories)
    next_id: u32,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            next_id: 1,
        }
    }

    /// Build a registry from tuning pool entries
    pub fn from_tuning(entries: &[PoolTuning]) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            let template = EntityTemplate {
                initial: Transform {
                    scale: entry.scale,
                    opacity: entry.opacity,
                },
            };
            registry.register(entry.category, template, entry.prewarm);
        }
        registry
    }

    /// Register a pool for `category`, constructing `prewarm` idle entities.
    /// Re-registering replaces the template and drops idle entities.
    pub fn register(&mut self, category: Category, template: EntityTemplate, prewarm: usize) {
        let mut pool = Pool {
            template,
            idle: Vec::with_capacity(prewarm),
            created: 0,
        };
        for _ in 0..prewarm {
            let entity = Entity::new(self.allocate_id(), category, template.initial);
            pool.idle.push(entity);
            pool.created += 1;
        }
        log::info!("Registered pool {} (prewarm {})", category, prewarm);
        self.pools.insert(category, pool);
    }

    /// Remove the pool for `category`; its idle entities are dropped
    pub fn unregister(&mut self, category: Category) -> bool {
        self.pools.remove(&category).is_some()
    }

    pub fn is_registered(&self, category: Category) -> bool {
        self.pools.contains_key(&category)
    }

    /// Take an entity of `category`, constructing one if the pool is empty.
    /// Returns `None` when no template is registered for the category.
    pub fn acquire(&mut self, category: Category) -> Option<Entity> {
        let Some(pool) = self.pools.get_mut(&category) else {
            log::warn!("No template registered for {}, spawn skipped", category);
            return None;
        };

        if let Some(entity) = pool.idle.pop() {
            return Some(entity);
        }

        let id = self.next_id;
        self.next_id += 1;
        pool.created += 1;
        log::debug!("Pool {} empty, constructed entity {}", category, id);
        Some(Entity::new(id, category, pool.template.initial))
    }

    /// Return an entity to its category's pool with its transform reset.
    /// Entities whose category has no pool are dropped.
    pub fn release(&mut self, mut entity: Entity) {
        let category = entity.category();
        match self.pools.get_mut(&category) {
            Some(pool) => {
                entity.reset();
                pool.idle.push(entity);
            }
            None => {
                log::warn!(
                    "No pool for {}, discarding entity {}",
                    category,
                    entity.id()
                );
            }
        }
    }

    /// Idle entities in the pool for `category`
    pub fn pooled(&self, category: Category) -> usize {
        self.pools.get(&category).map_or(0, |p| p.idle.len())
    }

    /// Entities ever constructed for `category`
    pub fn created(&self, category: Category) -> usize {
        self.pools.get(&category).map_or(0, |p| p.created)
    }

    /// Entities ever constructed across all registered pools
    pub fn total_created(&self) -> usize {
        self.pools.values().map(|p| p.created).sum()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::category::{ObstacleKind, PowerupKind};
    use crate::sim::entity::EntityPhase;
    use glam::Vec2;

    const CRATE: Category = Category::Obstacle(ObstacleKind::Crate);

    #[test]
    fn test_acquire_prefers_pooled() {
        let mut pools = PoolRegistry::new();
        pools.register(CRATE, EntityTemplate::default(), 2);
        assert_eq!(pools.pooled(CRATE), 2);

        let a = pools.acquire(CRATE).unwrap();
        let b = pools.acquire(CRATE).unwrap();
        assert_eq!(pools.created(CRATE), 2);
        assert_ne!(a.id(), b.id());

        // Empty pool constructs on demand
        let c = pools.acquire(CRATE).unwrap();
        assert_eq!(pools.created(CRATE), 3);
        assert_eq!(c.category(), CRATE);
    }

    #[test]
    fn test_acquire_unregistered_is_none() {
        let mut pools = PoolRegistry::new();
        pools.register(Category::Collectible, EntityTemplate::default(), 0);
        assert!(pools.acquire(Category::Powerup(PowerupKind::Magnet)).is_none());
        assert_eq!(pools.total_created(), 0);
    }

    #[test]
    fn test_acquire_never_crosses_categories() {
        let mut pools = PoolRegistry::new();
        pools.register(CRATE, EntityTemplate::default(), 3);
        pools.register(Category::Collectible, EntityTemplate::default(), 3);

        for _ in 0..5 {
            let e = pools.acquire(Category::Collectible).unwrap();
            assert_eq!(e.category(), Category::Collectible);
        }
        assert_eq!(pools.pooled(CRATE), 3);
    }

    #[test]
    fn test_release_resets_transform() {
        let template = EntityTemplate {
            initial: Transform {
                scale: 0.8,
                opacity: 0.9,
            },
        };
        let mut pools = PoolRegistry::new();
        pools.register(Category::Powerup(PowerupKind::Shield), template, 0);

        let mut entity = pools.acquire(Category::Powerup(PowerupKind::Shield)).unwrap();
        entity.activate(1, Vec2::new(0.0, 550.0));
        entity.transform = Transform {
            scale: 2.0,
            opacity: 0.0,
        };
        entity.begin_despawn();
        assert!(entity.is_despawning());

        let id = entity.id();
        pools.release(entity);

        let reused = pools.acquire(Category::Powerup(PowerupKind::Shield)).unwrap();
        assert_eq!(reused.id(), id);
        assert_eq!(reused.transform, template.initial);
        assert_eq!(reused.phase(), EntityPhase::Pooled);
        assert!(!reused.is_despawning());
    }

    #[test]
    fn test_release_without_pool_discards() {
        let mut pools = PoolRegistry::new();
        pools.register(CRATE, EntityTemplate::default(), 0);
        let entity = pools.acquire(CRATE).unwrap();

        assert!(pools.unregister(CRATE));
        pools.release(entity);
        assert_eq!(pools.pooled(CRATE), 0);
        assert!(!pools.is_registered(CRATE));
    }

    #[test]
    fn test_from_tuning_prewarms() {
        let pools = PoolRegistry::from_tuning(&crate::Tuning::default().pools);
        assert_eq!(pools.pooled(Category::Collectible), 20);
        assert_eq!(pools.pooled(CRATE), 5);
        assert_eq!(pools.pooled(Category::Powerup(PowerupKind::Speed)), 2);
    }
}
