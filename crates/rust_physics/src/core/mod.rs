//! # Core Module
//!
//! Shared configuration used by every physics subsystem.
//!
//! ## Organization
//!
//! - **Config**: [`PhysicsConfig`] and the defaults the world falls back to

pub mod config;

pub use crate::config::{Config, ConfigError};
pub use config::PhysicsConfig;
