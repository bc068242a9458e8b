//! Entity categories
//!
//! A category decides an entity's pool, whether the magnet pulls it, and how
//! it leaves the scene.

use serde::{Deserialize, Serialize};

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObstacleKind {
    Crate,
    Grass,
    Flower,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Crate, ObstacleKind::Grass, ObstacleKind::Flower];
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Doubles scroll speed
    Speed,
    /// Pulls nearby collectibles and power-ups toward the player
    Magnet,
    /// Doubles collectible score
    Multiplier,
    /// Absorbs obstacle hits
    Shield,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::Speed,
        PowerupKind::Magnet,
        PowerupKind::Multiplier,
        PowerupKind::Shield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Speed => "Speed",
            PowerupKind::Magnet => "Magnet",
            PowerupKind::Multiplier => "2x",
            PowerupKind::Shield => "Shield",
        }
    }
}

/// Closed set of spawnable entity types; each one keys exactly one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Collectible,
    Obstacle(ObstacleKind),
    Powerup(PowerupKind),
}

impl Category {
    /// Magnet attraction applies to everything except obstacles
    #[inline]
    pub fn magnet_eligible(&self) -> bool {
        !self.is_obstacle()
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        matches!(self, Category::Obstacle(_))
    }

    /// The power-up kind, if this is a power-up
    #[inline]
    pub fn powerup(&self) -> Option<PowerupKind> {
        match self {
            Category::Powerup(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Collectible => write!(f, "Collectible"),
            Category::Obstacle(kind) => write!(f, "Obstacle::{:?}", kind),
            Category::Powerup(kind) => write!(f, "Powerup::{}", kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet_eligibility() {
        assert!(Category::Collectible.magnet_eligible());
        for kind in PowerupKind::ALL {
            assert!(Category::Powerup(kind).magnet_eligible());
        }
        for kind in ObstacleKind::ALL {
            assert!(!Category::Obstacle(kind).magnet_eligible());
        }
    }

    #[test]
    fn test_powerup_accessor() {
        assert_eq!(Category::Powerup(PowerupKind::Shield).powerup(), Some(PowerupKind::Shield));
        assert_eq!(Category::Collectible.powerup(), None);
    }
}
