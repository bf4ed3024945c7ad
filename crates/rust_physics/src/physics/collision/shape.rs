//! Collision shapes
//!
//! Shapes are stored relative to the body's position; the world-space
//! geometry is derived on demand from `(shape, position)`.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::foundation::math::{utils, Vec3};
use crate::physics::error::PhysicsError;
use super::aabb::AABB;

/// Fieldless tag of a [`Shape`], used to key the narrow-phase table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// [`Shape::Sphere`]
    Sphere,
    /// [`Shape::Box`]
    Box,
}

impl ShapeKind {
    /// Number of shape kinds
    pub const COUNT: usize = 2;

    /// Every kind, in `index` order
    pub const ALL: [ShapeKind; Self::COUNT] = [ShapeKind::Sphere, ShapeKind::Box];

    /// Dense index for table lookups
    pub const fn index(self) -> usize {
        match self {
            Self::Sphere => 0,
            Self::Box => 1,
        }
    }

    /// Lowercase name, as accepted by `FromStr`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Box => "box",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" => Ok(Self::Sphere),
            "box" | "cuboid" => Ok(Self::Box),
            other => Err(PhysicsError::UnknownShapeKind(other.to_string())),
        }
    }
}

/// Collision shape types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// A sphere centered on the body position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// An axis-aligned box centered on the body position
    Box {
        /// Full edge lengths along X, Y and Z
        size: Vec3,
    },
}

impl Shape {
    /// Creates a spherical collision shape with given radius
    pub fn sphere(radius: f32) -> Result<Self, PhysicsError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Self::Sphere { radius })
    }

    /// Creates a box collision shape with the given full edge lengths
    pub fn cuboid(size: Vec3) -> Result<Self, PhysicsError> {
        if !utils::is_finite(&size) || size.iter().any(|&c| c <= 0.0) {
            return Err(PhysicsError::InvalidShape(format!(
                "box size must be positive on every axis, got {size:?}"
            )));
        }
        Ok(Self::Box { size })
    }

    /// Check the dimensions of a shape that bypassed the constructors
    /// (deserialized or built literally)
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Self::Sphere { radius } => Self::sphere(radius).map(|_| ()),
            Self::Box { size } => Self::cuboid(size).map(|_| ()),
        }
    }

    /// Kind tag of this shape
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Box { .. } => ShapeKind::Box,
        }
    }

    /// Half-size of the shape's bounding box
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Sphere { radius } => Vec3::repeat(radius),
            Self::Box { size } => size * 0.5,
        }
    }

    /// World-space bounding box of this shape at `position`
    pub fn bounding_box(&self, position: Vec3) -> AABB {
        AABB::from_shape(self, position)
    }

    /// Volume of the solid
    pub fn volume(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            Self::Box { size } => size.x * size.y * size.z,
        }
    }

    /// Surface area of the solid
    pub fn surface_area(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => 4.0 * PI * radius * radius,
            Self::Box { size } => 2.0 * (size.x * size.y + size.y * size.z + size.z * size.x),
        }
    }

    /// Check whether `point` lies inside the shape placed at `position`
    pub fn contains_point(&self, position: Vec3, point: Vec3) -> bool {
        match *self {
            Self::Sphere { radius } => (point - position).magnitude_squared() <= radius * radius,
            Self::Box { .. } => self.bounding_box(position).contains_point(point),
        }
    }

    /// Closest point of the solid (placed at `position`) to `point`
    ///
    /// Points already inside the solid are returned unchanged.
    pub fn closest_point(&self, position: Vec3, point: Vec3) -> Vec3 {
        match *self {
            Self::Sphere { radius } => {
                let offset = point - position;
                let distance = offset.magnitude();
                if distance <= radius {
                    point
                } else {
                    position + offset * (radius / distance)
                }
            }
            Self::Box { .. } => self.bounding_box(position).closest_point(point),
        }
    }
}
