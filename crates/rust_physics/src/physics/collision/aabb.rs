//! Axis-aligned bounding boxes
//!
//! The bounding volume every body carries. It is always a pure function of
//! the body's shape and position, see [`AABB::from_shape`].

use crate::foundation::math::{utils, Vec3};
use super::shape::Shape;

/// Axis-Aligned Bounding Box for broad-phase and box collision tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    ///
    /// Corners are sorted per axis so `min <= max` always holds.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Bounding box of `shape` placed at `position`
    pub fn from_shape(shape: &Shape, position: Vec3) -> Self {
        Self::from_center_extents(position, shape.half_extents())
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point (boundary included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains(&self, other: &AABB) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this AABB intersects another AABB
    ///
    /// Touching faces count as intersecting.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest AABB enclosing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow the box by `margin` on every side
    ///
    /// A negative margin shrinks it, collapsing to the center rather than
    /// inverting.
    pub fn expand(&self, margin: f32) -> AABB {
        let extents = (self.extents() + Vec3::repeat(margin)).sup(&Vec3::zeros());
        AABB::from_center_extents(self.center(), extents)
    }

    /// Volume of the box
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Surface area of the box
    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Test ray intersection with this AABB using slab method
    ///
    /// `ray_dir` need not be normalized; the result is in units of
    /// `ray_dir`. Returns the distance to the entry point (0 when the origin
    /// is inside) or `None` if the ray misses or the box is behind it.
    /// Based on "An Efficient and Robust Ray–Box Intersection Algorithm"
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        self.ray_interval(ray_origin, ray_dir)
            .map(|(t_enter, _)| t_enter.max(0.0))
    }

    /// Slab entry/exit parameters along the ray, before clamping to the origin
    ///
    /// Axes where the ray is parallel to the slab either contain the origin
    /// (no constraint) or reject the ray outright.
    pub fn ray_interval(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray_origin[axis];
            let dir = ray_dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_exit >= t_enter && t_exit >= 0.0 {
            Some((t_enter, t_exit))
        } else {
            None
        }
    }

    /// Check that every corner is finite
    pub fn is_finite(&self) -> bool {
        utils::is_finite(&self.min) && utils::is_finite(&self.max)
    }
}
