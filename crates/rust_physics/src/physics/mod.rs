//! Physics module for rigid bodies, collision detection and response
//!
//! Provides the body model, collision filtering, shape geometry and the
//! [`PhysicsWorld`] that steps them.

pub mod body;
pub mod collision;
pub mod collision_layers;
pub mod error;
pub mod world;

#[cfg(test)]
mod tests;

pub use body::{Body, BodyHandle, BodyOptions, OwnerHandle};
pub use collision::{
    CollisionInfo,
    Contact,
    Ray,
    RaycastResult,
    Shape,
    ShapeKind,
    AABB,
};
pub use collision_layers::{CollisionGroup, CollisionLayers};
pub use error::{PhysicsError, PhysicsResult};
pub use world::{PhysicsWorld, StepStats};
