//! Ray primitives and ray/shape intersection algorithms

use approx::abs_diff_eq;

use crate::foundation::math::{utils, Vec3};
use crate::physics::body::{BodyHandle, OwnerHandle};
use super::aabb::AABB;
use super::shape::Shape;

/// Tolerance used to decide which box face a ray hit lies on
pub const FACE_EPSILON: f32 = 1.0e-4;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (always normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, or `None` when `direction` has no length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        utils::normalize_or_none(&direction).map(|direction| Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Hit of a ray against one shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// Result of a world ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    /// The body that was hit
    pub body: BodyHandle,
    /// Owner of the body, if any
    pub owner: Option<OwnerHandle>,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal at the intersection point
    pub normal: Vec3,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
}

/// Test a ray against `shape` placed at `position`
pub fn intersect_ray_shape(ray: &Ray, shape: &Shape, position: Vec3, max_distance: f32) -> Option<ShapeHit> {
    match *shape {
        Shape::Sphere { radius } => intersect_ray_sphere(ray, position, radius, max_distance),
        Shape::Box { .. } => intersect_ray_box(ray, &shape.bounding_box(position), max_distance),
    }
}

/// Ray/sphere test by projecting the center onto the ray
///
/// Spheres whose center projects behind the origin are rejected. When the
/// origin is inside the sphere the exit point is reported.
pub fn intersect_ray_sphere(ray: &Ray, center: Vec3, radius: f32, max_distance: f32) -> Option<ShapeHit> {
    let to_center = center - ray.origin;
    let t_closest = to_center.dot(&ray.direction);
    if t_closest < 0.0 {
        return None;
    }

    let perpendicular_sq = to_center.magnitude_squared() - t_closest * t_closest;
    let radius_sq = radius * radius;
    if perpendicular_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - perpendicular_sq).max(0.0).sqrt();
    let t_enter = t_closest - half_chord;
    let t = if t_enter >= 0.0 { t_enter } else { t_closest + half_chord };
    if t > max_distance {
        return None;
    }

    let point = ray.point_at(t);
    let normal = utils::normalize_or_none(&(point - center)).unwrap_or(-ray.direction);
    Some(ShapeHit { distance: t, point, normal })
}

/// Ray/box test using the slab method
///
/// The normal is the first face (x, y, z; min before max) the hit point
/// lies on within [`FACE_EPSILON`]. Exact edge and corner hits therefore
/// report the lowest axis. An origin inside the box hits at distance 0.
pub fn intersect_ray_box(ray: &Ray, aabb: &AABB, max_distance: f32) -> Option<ShapeHit> {
    let (t_enter, _t_exit) = aabb.ray_interval(ray.origin, ray.direction)?;
    let t = t_enter.max(0.0);
    if t > max_distance {
        return None;
    }

    let point = ray.point_at(t);
    let normal = box_face_normal(aabb, point).unwrap_or(-ray.direction);
    Some(ShapeHit { distance: t, point, normal })
}

/// Outward normal of the box face `point` lies on, if any
fn box_face_normal(aabb: &AABB, point: Vec3) -> Option<Vec3> {
    for axis in 0..3 {
        if abs_diff_eq!(point[axis], aabb.min[axis], epsilon = FACE_EPSILON) {
            return Some(utils::axis_vector(axis, -1.0));
        }
        if abs_diff_eq!(point[axis], aabb.max[axis], epsilon = FACE_EPSILON) {
            return Some(utils::axis_vector(axis, 1.0));
        }
    }
    None
}
