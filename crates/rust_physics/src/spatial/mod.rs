//! Spatial partitioning data structures
//!
//! Provides the broad-phase index used by the physics world for collision
//! candidate search and region queries.

pub mod spatial_query;
mod spatial_hash;

pub use spatial_hash::{CellCoord, SpatialHash};
pub use spatial_query::SpatialQuery;
