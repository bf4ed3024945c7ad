//! Collision layer system for filtering collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! A [`CollisionGroup`] pairs the layer a body lives on (`id`) with the
//! layers it is willing to hit (`mask`).

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Catch-all layer for bodies without a specific role
        const DEFAULT = 1 << 0;
        /// Player characters
        const PLAYER = 1 << 1;
        /// Projectiles (bullets, rockets, grenades)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const TERRAIN = 1 << 3;
        /// Pickups and collectibles
        const ITEM = 1 << 4;
        /// Trigger volumes
        const TRIGGER = 1 << 5;
        /// Sensors that only observe
        const SENSOR = 1 << 6;
        /// Immovable props
        const STATIC = 1 << 7;
        /// Generic simulated props
        const DYNAMIC = 1 << 8;
        /// Script-driven movers
        const KINEMATIC = 1 << 9;
    }
}

impl CollisionLayers {
    /// No collision layer
    pub const NONE: Self = Self::empty();

    /// All collision layers
    pub const ALL: Self = Self::all();

    /// Helper to create a mask from multiple layers
    ///
    /// # Example
    /// ```
    /// use rust_physics::physics::CollisionLayers;
    ///
    /// let mask = CollisionLayers::mask(&[
    ///     CollisionLayers::PLAYER,
    ///     CollisionLayers::TERRAIN,
    /// ]);
    /// assert_eq!(mask, CollisionLayers::PLAYER | CollisionLayers::TERRAIN);
    /// ```
    pub fn mask(layers: &[Self]) -> Self {
        layers.iter().fold(Self::NONE, |acc, &layer| acc | layer)
    }
}

/// Collision filter attached to a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionGroup {
    /// Layer this body belongs to
    pub id: CollisionLayers,
    /// Layers this body collides with
    pub mask: CollisionLayers,
}

impl CollisionGroup {
    /// Generic body, collides with everything
    pub const DEFAULT: Self = Self::new(CollisionLayers::DEFAULT, CollisionLayers::ALL);

    /// Player character
    pub const PLAYER: Self = Self::new(
        CollisionLayers::PLAYER,
        CollisionLayers::DEFAULT
            .union(CollisionLayers::PLAYER)
            .union(CollisionLayers::PROJECTILE)
            .union(CollisionLayers::TERRAIN)
            .union(CollisionLayers::ITEM)
            .union(CollisionLayers::STATIC)
            .union(CollisionLayers::DYNAMIC)
            .union(CollisionLayers::KINEMATIC),
    );

    /// Projectile, hits players and terrain only
    pub const PROJECTILE: Self = Self::new(
        CollisionLayers::PROJECTILE,
        CollisionLayers::PLAYER.union(CollisionLayers::TERRAIN),
    );

    /// World geometry
    pub const TERRAIN: Self = Self::new(CollisionLayers::TERRAIN, CollisionLayers::ALL);

    /// Pickup resting on terrain
    pub const ITEM: Self = Self::new(
        CollisionLayers::ITEM,
        CollisionLayers::PLAYER.union(CollisionLayers::TERRAIN),
    );

    /// Trigger volume, reacts to players only
    pub const TRIGGER: Self = Self::new(CollisionLayers::TRIGGER, CollisionLayers::PLAYER);

    /// Sensor, reacts to players and projectiles
    pub const SENSOR: Self = Self::new(
        CollisionLayers::SENSOR,
        CollisionLayers::PLAYER.union(CollisionLayers::PROJECTILE),
    );

    /// Immovable prop
    pub const STATIC: Self = Self::new(CollisionLayers::STATIC, CollisionLayers::ALL);

    /// Simulated prop
    pub const DYNAMIC: Self = Self::new(CollisionLayers::DYNAMIC, CollisionLayers::ALL);

    /// Script-driven mover
    pub const KINEMATIC: Self = Self::new(CollisionLayers::KINEMATIC, CollisionLayers::ALL);

    /// Create a custom group from an explicit id/mask pair
    pub const fn new(id: CollisionLayers, mask: CollisionLayers) -> Self {
        Self { id, mask }
    }

    /// Check whether this group accepts collisions with `other`
    ///
    /// Evaluated one way only: `(self.mask & other.id) != 0`. Set masks
    /// symmetrically to avoid one-directional collision.
    pub fn can_collide_with(&self, other: &Self) -> bool {
        self.mask.intersects(other.id)
    }

    /// Check that both groups accept each other
    pub fn can_collide_mutual(&self, other: &Self) -> bool {
        self.can_collide_with(other) && other.can_collide_with(self)
    }
}

impl Default for CollisionGroup {
    fn default() -> Self {
        Self::DEFAULT
    }
}
