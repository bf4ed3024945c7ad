//! Math utilities and types
//!
//! Provides the fundamental vector type and the small helpers the physics
//! code needs on top of nalgebra.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Math constants
pub mod constants {
    /// Lengths below this are treated as zero when normalizing
    pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

    /// Standard gravity at the Earth's surface (m/s²)
    pub const STANDARD_GRAVITY: f32 = 9.81;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Normalize a vector, or `None` when it has no usable direction
    pub fn normalize_or_none(v: &Vec3) -> Option<Vec3> {
        v.try_normalize(constants::NORMALIZE_EPSILON)
    }

    /// Componentwise floor
    pub fn floor(v: &Vec3) -> Vec3 {
        v.map(f32::floor)
    }

    /// Check every component is finite
    pub fn is_finite(v: &Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }

    /// Unit vector along `axis` (0 = X, 1 = Y, 2 = Z) scaled by `sign`
    pub fn axis_vector(axis: usize, sign: f32) -> Vec3 {
        let mut v = Vec3::zeros();
        v[axis] = sign;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_or_none_rejects_zero() {
        assert!(utils::normalize_or_none(&Vec3::zeros()).is_none());
        let n = utils::normalize_or_none(&Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_axis_vector() {
        assert_eq!(utils::axis_vector(1, -1.0), Vec3::new(0.0, -1.0, 0.0));
    }
}
