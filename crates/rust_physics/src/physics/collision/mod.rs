//! Collision geometry
//!
//! Provides the bounding volumes, shapes, ray primitives and narrow-phase
//! tests shared by the world step and ray casting.
//!
//! # Module Organization
//!
//! - [`aabb`] - Axis-aligned bounding boxes
//! - [`shape`] - Sphere and box shapes with geometry queries
//! - [`primitives`] - Rays and ray/shape intersection
//! - [`narrow_phase`] - Exact shape-pair tests and their dispatch table

pub mod aabb;
pub mod shape;
pub mod primitives;
pub mod narrow_phase;

// Re-export commonly used types
pub use aabb::AABB;
pub use shape::{Shape, ShapeKind};
pub use primitives::{intersect_ray_shape, Ray, RaycastResult, ShapeHit};
pub use narrow_phase::{collide_shapes, CollisionInfo, Contact, NarrowPhaseFn, NARROW_PHASE_TABLE};
