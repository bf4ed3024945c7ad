//! # Physics World Configuration
//!
//! Every tunable of the simulation lives in [`PhysicsConfig`]: gravity, air
//! drag, the fixed tick length, the per-call substep cap and the broad-phase
//! cell size. It can be built in code with the `with_*` builders or loaded
//! from a TOML/RON file through the [`Config`] trait.
//!
//! ```toml
//! gravity = [0.0, -9.81, 0.0]
//! air_resistance = 0.01
//! time_step = 0.016666668
//! max_steps = 10
//! cell_size = 4.0
//! ```

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::{constants, utils, Vec3};

/// Default fixed physics tick (60 Hz)
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Default upper bound on substeps per `update` call
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Default quadratic drag coefficient
pub const DEFAULT_AIR_RESISTANCE: f32 = 0.01;

/// Default spatial hash cell side length
pub const DEFAULT_CELL_SIZE: f32 = 4.0;

/// # Physics Configuration
///
/// Configuration for a single [`PhysicsWorld`](crate::physics::PhysicsWorld).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravitational acceleration applied to dynamic bodies
    pub gravity: Vec3,
    /// Quadratic drag coefficient
    pub air_resistance: f32,
    /// Fixed simulation tick in seconds
    pub time_step: f32,
    /// Maximum substeps run by one `update` call
    pub max_steps: u32,
    /// Side length of a broad-phase grid cell
    pub cell_size: f32,
}

impl PhysicsConfig {
    /// Create a configuration with the default values
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -constants::STANDARD_GRAVITY, 0.0),
            air_resistance: DEFAULT_AIR_RESISTANCE,
            time_step: DEFAULT_TIME_STEP,
            max_steps: DEFAULT_MAX_STEPS,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the air resistance coefficient
    pub fn with_air_resistance(mut self, air_resistance: f32) -> Self {
        self.air_resistance = air_resistance;
        self
    }

    /// Set the fixed time step
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Set the maximum substeps per update
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the broad-phase cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !utils::is_finite(&self.gravity) {
            return Err(ConfigError::Invalid(format!("Gravity must be finite, got {:?}", self.gravity)));
        }

        if !self.air_resistance.is_finite() || self.air_resistance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Air resistance must be a non-negative number, got {}",
                self.air_resistance
            )));
        }

        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::Invalid(format!("Time step must be positive, got {}", self.time_step)));
        }

        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("Max steps must be at least 1".to_string()));
        }

        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!("Cell size must be positive, got {}", self.cell_size)));
        }

        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PhysicsConfig {}
