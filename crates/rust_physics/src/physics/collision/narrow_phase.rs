//! Narrow-phase shape pair tests
//!
//! GEA 13.3.4: "The narrow phase performs detailed shape-to-shape tests."
//! Every test takes two shapes with their positions and, on overlap,
//! returns a [`Contact`] whose normal points from the first shape to the
//! second. Tests are selected through [`NARROW_PHASE_TABLE`], indexed by
//! [`ShapeKind::index`] of both operands.

use crate::foundation::math::{utils, Vec3};
use crate::physics::body::BodyHandle;
use super::aabb::AABB;
use super::shape::{Shape, ShapeKind};

/// Geometric result of an overlapping shape pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from A to B
    pub normal: Vec3,
    /// Overlap depth along the normal, never negative
    pub penetration: f32,
    /// Representative contact point in world space
    pub contact_point: Vec3,
}

/// A detected collision between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// First body
    pub body_a: BodyHandle,
    /// Second body
    pub body_b: BodyHandle,
    /// Unit normal pointing from A to B
    pub normal: Vec3,
    /// Overlap depth along the normal
    pub penetration: f32,
    /// Contact point in world space
    pub contact_point: Vec3,
}

impl CollisionInfo {
    /// Attach body handles to a contact
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, contact: Contact) -> Self {
        Self {
            body_a,
            body_b,
            normal: contact.normal,
            penetration: contact.penetration,
            contact_point: contact.contact_point,
        }
    }
}

/// Signature of one narrow-phase test
pub type NarrowPhaseFn = fn(&Shape, Vec3, &Shape, Vec3) -> Option<Contact>;

/// Narrow-phase dispatch table, `[kind_a][kind_b]`
pub const NARROW_PHASE_TABLE: [[NarrowPhaseFn; ShapeKind::COUNT]; ShapeKind::COUNT] = [
    // Sphere vs   Sphere,        Box
    [sphere_sphere_entry, sphere_box_entry],
    // Box vs      Sphere,        Box
    [box_sphere_entry, box_box_entry],
];

/// Run the narrow-phase test for any pair of shapes
pub fn collide_shapes(shape_a: &Shape, position_a: Vec3, shape_b: &Shape, position_b: Vec3) -> Option<Contact> {
    let test = NARROW_PHASE_TABLE[shape_a.kind().index()][shape_b.kind().index()];
    test(shape_a, position_a, shape_b, position_b)
}

fn sphere_sphere_entry(a: &Shape, pa: Vec3, b: &Shape, pb: Vec3) -> Option<Contact> {
    match (*a, *b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => sphere_sphere(pa, ra, pb, rb),
        _ => None,
    }
}

fn sphere_box_entry(a: &Shape, pa: Vec3, b: &Shape, pb: Vec3) -> Option<Contact> {
    match (*a, *b) {
        (Shape::Sphere { radius }, Shape::Box { .. }) => sphere_box(pa, radius, &b.bounding_box(pb)),
        _ => None,
    }
}

fn box_sphere_entry(a: &Shape, pa: Vec3, b: &Shape, pb: Vec3) -> Option<Contact> {
    match (*a, *b) {
        (Shape::Box { .. }, Shape::Sphere { radius }) => {
            sphere_box(pb, radius, &a.bounding_box(pa)).map(|contact| Contact {
                normal: -contact.normal,
                ..contact
            })
        }
        _ => None,
    }
}

fn box_box_entry(a: &Shape, pa: Vec3, b: &Shape, pb: Vec3) -> Option<Contact> {
    match (*a, *b) {
        (Shape::Box { .. }, Shape::Box { .. }) => box_box(&a.bounding_box(pa), &b.bounding_box(pb)),
        _ => None,
    }
}

/// Sphere/sphere test
///
/// Colliding iff the center distance is strictly below the radius sum.
/// Coincident centers separate along +X.
pub fn sphere_sphere(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> Option<Contact> {
    let delta = center_b - center_a;
    let distance = delta.magnitude();
    let radius_sum = radius_a + radius_b;
    if distance >= radius_sum {
        return None;
    }

    let normal = utils::normalize_or_none(&delta).unwrap_or_else(Vec3::x);
    Some(Contact {
        normal,
        penetration: radius_sum - distance,
        contact_point: center_a + normal * radius_a,
    })
}

/// Sphere/box test, normal pointing from the sphere toward the box
///
/// The closest point of the box to the sphere center decides the overlap.
/// A center inside the box is pushed out through the nearest face.
pub fn sphere_box(center: Vec3, radius: f32, aabb: &AABB) -> Option<Contact> {
    let closest = aabb.closest_point(center);
    let delta = closest - center;
    let distance = delta.magnitude();

    if let Some(normal) = utils::normalize_or_none(&delta) {
        if distance >= radius {
            return None;
        }
        return Some(Contact {
            normal,
            penetration: radius - distance,
            contact_point: closest,
        });
    }

    // Center on or inside the box: leave through the shallowest face
    let (axis, sign, depth) = nearest_face(aabb, center);
    let outward = utils::axis_vector(axis, sign);
    Some(Contact {
        normal: -outward,
        penetration: radius + depth,
        contact_point: center + outward * depth,
    })
}

/// Axis, outward sign and depth of the face of `aabb` nearest to an inner point
fn nearest_face(aabb: &AABB, point: Vec3) -> (usize, f32, f32) {
    let mut best = (0, -1.0, f32::INFINITY);
    for axis in 0..3 {
        let to_min = point[axis] - aabb.min[axis];
        let to_max = aabb.max[axis] - point[axis];
        if to_min < best.2 {
            best = (axis, -1.0, to_min);
        }
        if to_max < best.2 {
            best = (axis, 1.0, to_max);
        }
    }
    (best.0, best.1, best.2.max(0.0))
}

/// Box/box test on axis-aligned boxes
///
/// Separates along the axis of smallest positive overlap, toward B's center.
pub fn box_box(a: &AABB, b: &AABB) -> Option<Contact> {
    let mut axis = 0;
    let mut penetration = f32::INFINITY;

    for i in 0..3 {
        let overlap = (a.max[i] - b.min[i]).min(b.max[i] - a.min[i]);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < penetration {
            penetration = overlap;
            axis = i;
        }
    }

    let sign = if b.center()[axis] < a.center()[axis] { -1.0 } else { 1.0 };
    let overlap_region = AABB::new(a.min.sup(&b.min), a.max.inf(&b.max));

    Some(Contact {
        normal: utils::axis_vector(axis, sign),
        penetration,
        contact_point: overlap_region.center(),
    })
}
