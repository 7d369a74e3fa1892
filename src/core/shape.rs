//! Careful abstraction of geometric shapes in a ray tracer is a key
//! component of a clean system design. All surface primitives
//! implement the common **Shape** interface, and the tracer and the
//! flux analysis use this interface without needing any details about
//! the underlying shape. New kinds of surfaces are added by
//! implementing the trait.
//!
//! Every method works in the shape's own local frame. Placing a shape
//! in the world is the job of a
//! [SurfaceNode](../primitive/struct.SurfaceNode.html).

// std
use std::fmt;
// others
use strum_macros::{Display, EnumIter, EnumString};
// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds2f, Bounds3f, Normal3f, Point2f, Point3f, Ray};
use crate::core::interaction::DifferentialGeometry;
use crate::core::solar::{Float, EPSILON};

/// Handle of a surface registered in a
/// [SurfaceRegistry](../primitive/struct.SurfaceRegistry.html).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which sides of a surface produce hits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ActiveSide {
    #[strum(serialize = "front")]
    Front,
    #[strum(serialize = "back")]
    Back,
    #[strum(to_string = "both", serialize = "inside_and_outside")]
    Both,
}

impl Default for ActiveSide {
    fn default() -> Self {
        ActiveSide::Both
    }
}

impl ActiveSide {
    pub fn accepts(self, is_front: bool) -> bool {
        match self {
            ActiveSide::Front => is_front,
            ActiveSide::Back => !is_front,
            ActiveSide::Both => true,
        }
    }
}

/// The side of a surface a photon landed on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SurfaceSide {
    #[strum(serialize = "front")]
    Front,
    #[strum(serialize = "back")]
    Back,
}

impl From<bool> for SurfaceSide {
    fn from(is_front: bool) -> Self {
        if is_front {
            SurfaceSide::Front
        } else {
            SurfaceSide::Back
        }
    }
}

pub trait Shape: Send + Sync {
    fn name(&self) -> &'static str;
    /// Nearest hit inside the ray's interval that lies on the
    /// parametric domain, inside the aperture (if any) and on an active
    /// side. Returns the record and the ray parameter.
    fn intersect(
        &self,
        r: &Ray,
        aperture: Option<&dyn Aperture>,
    ) -> Option<(DifferentialGeometry, Float)>;
    fn intersect_p(&self, r: &Ray, aperture: Option<&dyn Aperture>) -> bool {
        self.intersect(r, aperture).is_some()
    }
    fn get_point(&self, u: Float, v: Float) -> Point3f;
    fn get_normal(&self, u: Float, v: Float) -> Normal3f;
    fn get_uv(&self, p: &Point3f) -> Point2f;
    fn object_bound(&self) -> Bounds3f;
    fn area(&self) -> Float;
    fn active_side(&self) -> ActiveSide;
    /// Rejects invalid parameters; called once when the shape is placed
    /// in a scene.
    fn validate(&self) -> Result<(), ConfigError>;
    /// Rectangle of the 2D coordinate system used for flux binning.
    fn analysis_extent(&self) -> Bounds2f;
    /// Maps a local hit point into the rectangle of
    /// [analysis_extent](#tymethod.analysis_extent).
    fn analysis_coordinates(&self, p: &Point3f) -> Point2f;
}

/// Accepts a parametric coordinate pair on the unit square, allowing
/// for round-off at the borders.
pub fn uv_in_domain(u: Float, v: Float) -> bool {
    u >= -EPSILON && u <= 1.0 + EPSILON && v >= -EPSILON && v <= 1.0 + EPSILON
}

/// Shared parameter check for the shape constructors.
pub fn check_positive(
    shape: &'static str,
    parameter: &'static str,
    value: Float,
) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidShapeParameter {
            shape,
            parameter,
            value,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn active_side_filters_hits() {
        assert!(ActiveSide::Front.accepts(true));
        assert!(!ActiveSide::Front.accepts(false));
        assert!(ActiveSide::Back.accepts(false));
        assert!(!ActiveSide::Back.accepts(true));
        for side in ActiveSide::iter() {
            assert_eq!(ActiveSide::from_str(&side.to_string()).ok(), Some(side));
        }
        assert_eq!(ActiveSide::from_str("BOTH").ok(), Some(ActiveSide::Both));
    }

    #[test]
    fn positive_parameters_only() {
        assert!(check_positive("plane", "width_x", 1.0).is_ok());
        assert!(check_positive("plane", "width_x", 0.0).is_err());
        assert!(check_positive("plane", "width_x", -2.0).is_err());
        assert!(check_positive("plane", "width_x", Float::NAN).is_err());
    }
}
