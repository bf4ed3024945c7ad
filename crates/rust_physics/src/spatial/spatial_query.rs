//! Abstract spatial query interface for broad-phase collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2:
//! "Spatial partitioning schemes... allow us to quickly cull out pairs of
//! objects that cannot possibly be colliding."
//!
//! This abstraction allows swapping different spatial partitioning schemes
//! (uniform grid, BVH, ...) without changing the world step.

use crate::foundation::math::Vec3;
use crate::physics::body::BodyHandle;
use crate::physics::collision::AABB;

/// Abstract interface for spatial partitioning used in broad-phase collision detection
///
/// Implementations must never report false negatives: every body whose
/// current bounds overlap a query region has to be returned.
pub trait SpatialQuery: Send {
    /// Insert a body with its current bounds, replacing any previous entry
    fn insert(&mut self, body: BodyHandle, aabb: &AABB);

    /// Remove a body from the spatial structure
    fn remove(&mut self, body: BodyHandle) -> bool;

    /// Update a body's bounds (remove then insert)
    fn update(&mut self, body: BodyHandle, aabb: &AABB) {
        self.remove(body);
        self.insert(body, aabb);
    }

    /// Candidate bodies overlapping `aabb`, deduplicated
    fn query_aabb(&self, aabb: &AABB) -> Vec<BodyHandle>;

    /// Candidate neighbors of a stored body, excluding the body itself
    fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle>;

    /// Bodies whose bounds lie within `radius` of `position`
    fn query_sphere(&self, position: Vec3, radius: f32) -> Vec<BodyHandle>;

    /// Clear all bodies from the spatial structure
    fn clear(&mut self);

    /// Get the number of bodies in the structure
    fn body_count(&self) -> usize;
}
