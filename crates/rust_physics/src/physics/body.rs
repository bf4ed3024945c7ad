//! Rigid bodies
//!
//! A [`Body`] is the mutable simulation state of one physics object. Game
//! systems build bodies with [`BodyOptions`] and hand them to the
//! [`PhysicsWorld`](crate::physics::PhysicsWorld), which returns a
//! [`BodyHandle`] for later access.

use crate::foundation::math::{utils, Vec3};
use crate::physics::collision::{Shape, AABB};
use crate::physics::collision_layers::CollisionGroup;
use crate::physics::error::PhysicsError;

slotmap::new_key_type! {
    /// Stable, generation-checked handle to a body owned by a world
    pub struct BodyHandle;
}

/// Opaque identifier of the game object that owns a body
///
/// The physics core stores and returns it untouched; the caller maps it
/// back to its own entity through its own lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerHandle(pub u64);

impl OwnerHandle {
    /// Raw value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for OwnerHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Default body mass
pub const DEFAULT_MASS: f32 = 1.0;

/// Default coefficient of restitution
pub const DEFAULT_RESTITUTION: f32 = 0.3;

/// Default friction coefficient
pub const DEFAULT_FRICTION: f32 = 0.5;

/// Construction options for a [`Body`]
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOptions {
    /// Mass, must be positive and finite
    pub mass: f32,
    /// Bounciness, clamped to [0, 1]
    pub restitution: f32,
    /// Friction coefficient, clamped to >= 0
    pub friction: f32,
    /// Never moves, infinite mass
    pub is_static: bool,
    /// Moves by its own velocity only; collisions never push it
    pub is_kinematic: bool,
    /// Receives world gravity
    pub affected_by_gravity: bool,
    /// Receives world air drag
    pub affected_by_air_resistance: bool,
    /// Collision filter
    pub collision_group: CollisionGroup,
    /// Owning game object
    pub owner: Option<OwnerHandle>,
    /// Initial velocity
    pub velocity: Vec3,
}

impl BodyOptions {
    /// Options for a regular dynamic body
    pub fn new() -> Self {
        Self {
            mass: DEFAULT_MASS,
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            is_static: false,
            is_kinematic: false,
            affected_by_gravity: true,
            affected_by_air_resistance: true,
            collision_group: CollisionGroup::DEFAULT,
            owner: None,
            velocity: Vec3::zeros(),
        }
    }

    /// Options for immovable level geometry
    pub fn fixed() -> Self {
        Self::new()
            .with_static(true)
            .with_collision_group(CollisionGroup::TERRAIN)
    }

    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Mark as static
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark as kinematic
    pub fn with_kinematic(mut self, is_kinematic: bool) -> Self {
        self.is_kinematic = is_kinematic;
        self
    }

    /// Toggle gravity
    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.affected_by_gravity = enabled;
        self
    }

    /// Toggle air resistance
    pub fn with_air_resistance(mut self, enabled: bool) -> Self {
        self.affected_by_air_resistance = enabled;
        self
    }

    /// Set collision group
    pub fn with_collision_group(mut self, group: CollisionGroup) -> Self {
        self.collision_group = group;
        self
    }

    /// Set owner handle
    pub fn with_owner(mut self, owner: impl Into<OwnerHandle>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Rigid body simulation state
///
/// The cached [`AABB`] is kept in sync with the position by every setter.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    position: Vec3,
    velocity: Vec3,
    shape: Shape,
    aabb: AABB,
    mass: f32,
    restitution: f32,
    friction: f32,
    is_static: bool,
    is_kinematic: bool,
    affected_by_gravity: bool,
    affected_by_air_resistance: bool,
    collision_group: CollisionGroup,
    owner: Option<OwnerHandle>,
}

impl Body {
    /// Create a body with `shape` centered at `position`
    pub fn new(position: Vec3, shape: Shape, options: BodyOptions) -> Result<Self, PhysicsError> {
        shape.validate()?;

        if !utils::is_finite(&position) {
            return Err(PhysicsError::InvalidBody(format!("position must be finite, got {position:?}")));
        }
        if !utils::is_finite(&options.velocity) {
            return Err(PhysicsError::InvalidBody(format!(
                "velocity must be finite, got {:?}",
                options.velocity
            )));
        }
        if !options.mass.is_finite() || options.mass <= 0.0 {
            return Err(PhysicsError::InvalidBody(format!("mass must be positive, got {}", options.mass)));
        }
        if options.restitution.is_nan() || options.friction.is_nan() {
            return Err(PhysicsError::InvalidBody("restitution and friction must be numbers".to_string()));
        }

        Ok(Self {
            position,
            velocity: options.velocity,
            shape,
            aabb: AABB::from_shape(&shape, position),
            mass: options.mass,
            restitution: options.restitution.clamp(0.0, 1.0),
            friction: options.friction.max(0.0),
            is_static: options.is_static,
            is_kinematic: options.is_kinematic,
            affected_by_gravity: options.affected_by_gravity,
            affected_by_air_resistance: options.affected_by_air_resistance,
            collision_group: options.collision_group,
            owner: options.owner,
        })
    }

    /// Convenience constructor for a sphere
    pub fn sphere(position: Vec3, radius: f32, options: BodyOptions) -> Result<Self, PhysicsError> {
        Self::new(position, Shape::sphere(radius)?, options)
    }

    /// Convenience constructor for a box with full edge lengths `size`
    pub fn cuboid(position: Vec3, size: Vec3, options: BodyOptions) -> Result<Self, PhysicsError> {
        Self::new(position, Shape::cuboid(size)?, options)
    }

    /// Copy of this body's configuration at the same position, at rest
    pub fn duplicate(&self) -> Self {
        Self {
            velocity: Vec3::zeros(),
            ..self.clone()
        }
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Collision shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Cached world-space bounding box
    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    /// Mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass, zero for bodies collisions cannot move
    pub fn inverse_mass(&self) -> f32 {
        if self.is_immovable() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Restitution in [0, 1]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Friction coefficient
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Static flag
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Kinematic flag
    pub fn is_kinematic(&self) -> bool {
        self.is_kinematic
    }

    /// Dynamic bodies are the ones forces and collisions act on
    pub fn is_dynamic(&self) -> bool {
        !self.is_immovable()
    }

    /// Static or kinematic
    pub fn is_immovable(&self) -> bool {
        self.is_static || self.is_kinematic
    }

    /// Gravity flag
    pub fn affected_by_gravity(&self) -> bool {
        self.affected_by_gravity
    }

    /// Air resistance flag
    pub fn affected_by_air_resistance(&self) -> bool {
        self.affected_by_air_resistance
    }

    /// Collision filter
    pub fn collision_group(&self) -> CollisionGroup {
        self.collision_group
    }

    /// Owning game object
    pub fn owner(&self) -> Option<OwnerHandle> {
        self.owner
    }

    /// Change the collision filter
    pub fn set_collision_group(&mut self, group: CollisionGroup) {
        self.collision_group = group;
    }

    /// Change the restitution (clamped to [0, 1])
    pub fn set_restitution(&mut self, restitution: f32) {
        if !restitution.is_nan() {
            self.restitution = restitution.clamp(0.0, 1.0);
        }
    }

    /// Teleport the body and refresh its bounding box
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_aabb();
    }

    /// Overwrite the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Move by `delta` and refresh the bounding box
    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Recompute the cached bounding box from shape and position
    pub fn update_aabb(&mut self) {
        self.aabb = AABB::from_shape(&self.shape, self.position);
    }

    /// Apply an instantaneous force: adds `force / mass` to velocity
    ///
    /// No-op for static and kinematic bodies.
    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_dynamic() {
            self.velocity += force / self.mass;
        }
    }

    /// Apply an impulse: adds `impulse / mass` to velocity
    ///
    /// No-op for static and kinematic bodies.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.is_dynamic() {
            self.velocity += impulse * self.inverse_mass();
        }
    }

    /// Kinetic energy `0.5 * m * |v|²`
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    /// Linear momentum `m * v`
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}
