//! # Rust Physics
//!
//! A fixed-timestep rigid-body physics core for arcade games.
//!
//! ## Features
//!
//! - **Shapes**: Spheres and axis-aligned boxes with exact bounding boxes
//! - **Broad Phase**: Uniform-grid spatial hash behind a swappable trait
//! - **Narrow Phase**: Shape-pair tests selected from a fixed dispatch table
//! - **Response**: Positional correction plus restitution impulses
//! - **Filtering**: Layer/mask collision groups
//! - **Ray Casting**: Nearest-hit queries with owner handles for hitscan
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let mut world = PhysicsWorld::new(PhysicsConfig::default())?;
//!     let floor = Body::cuboid(Vec3::zeros(), Vec3::new(20.0, 1.0, 20.0), BodyOptions::fixed())?;
//!     world.add_body(floor);
//!
//!     let ball = world.add_body(Body::sphere(Vec3::new(0.0, 5.0, 0.0), 0.5, BodyOptions::new())?);
//!     world.update(1.0 / 60.0);
//!
//!     assert!(world.body(ball).is_some());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        core::{Config, ConfigError, PhysicsConfig},
        foundation::math::Vec3,
        physics::{
            Body, BodyHandle, BodyOptions, CollisionGroup, CollisionLayers, OwnerHandle,
            PhysicsError, PhysicsResult, PhysicsWorld, RaycastResult, Shape, ShapeKind, StepStats, AABB,
        },
        spatial::{SpatialHash, SpatialQuery},
    };
}
