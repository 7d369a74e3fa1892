//! Sampling routines used by the sun model.

// solar
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::solar::{Float, TWO_PI};

/// Samples a direction uniformly (with respect to solid angle) inside
/// the cone around +z.
pub fn uniform_sample_cone(u: &Point2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta: Float = (1.0 as Float - u.x) + u.x * cos_theta_max;
    let sin_theta: Float = (1.0 as Float - cos_theta * cos_theta).max(0.0).sqrt();
    let phi: Float = u.y * TWO_PI;
    Vector3f {
        x: phi.cos() * sin_theta,
        y: phi.sin() * sin_theta,
        z: cos_theta,
    }
}
