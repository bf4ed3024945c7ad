//! Physics error types

use crate::config::ConfigError;
use crate::physics::body::BodyHandle;

/// Errors raised by the physics core
///
/// These are programmer or configuration errors surfaced at construction
/// time. Runtime degeneracies inside a step are guarded, not reported.
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// Shape dimensions are not positive and finite
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Shape kind name is not recognised
    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),

    /// Body options are out of range
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Spatial hash cell size is not positive and finite
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(f32),

    /// Handle does not refer to a live body
    #[error("Body not found: {0:?}")]
    BodyNotFound(BodyHandle),

    /// World configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
