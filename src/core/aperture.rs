//! Apertures restrict the valid parametric domain of a shape. A shape
//! that is given an aperture only reports hits whose (u, v) pair is
//! inside of it, so the same dish or plane can be cut to a rectangle,
//! an ellipse or a ring without changing the shape itself.

// solar
use crate::core::error::ConfigError;
use crate::core::solar::Float;

pub trait Aperture: Send + Sync {
    fn is_inside(&self, u: Float, v: Float) -> bool;
}

/// Axis-aligned sub-rectangle of the unit square.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ApertureRectangle {
    pub u_min: Float,
    pub u_max: Float,
    pub v_min: Float,
    pub v_max: Float,
}

impl ApertureRectangle {
    pub fn new(u_min: Float, u_max: Float, v_min: Float, v_max: Float) -> Result<Self, ConfigError> {
        if !(u_min < u_max && v_min < v_max) {
            return Err(ConfigError::InvalidAperture(format!(
                "rectangle [{}, {}] x [{}, {}] is empty",
                u_min, u_max, v_min, v_max
            )));
        }
        Ok(ApertureRectangle {
            u_min,
            u_max,
            v_min,
            v_max,
        })
    }
}

impl Aperture for ApertureRectangle {
    fn is_inside(&self, u: Float, v: Float) -> bool {
        u >= self.u_min && u <= self.u_max && v >= self.v_min && v <= self.v_max
    }
}

/// Ellipse centred at (u0, v0) with semi-axes `a` (along u) and `b`
/// (along v).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ApertureEllipse {
    pub u0: Float,
    pub v0: Float,
    pub a: Float,
    pub b: Float,
}

impl ApertureEllipse {
    pub fn new(u0: Float, v0: Float, a: Float, b: Float) -> Result<Self, ConfigError> {
        if !(a > 0.0 && b > 0.0) {
            return Err(ConfigError::InvalidAperture(format!(
                "ellipse semi-axes must be positive (got {}, {})",
                a, b
            )));
        }
        Ok(ApertureEllipse { u0, v0, a, b })
    }
}

impl Aperture for ApertureEllipse {
    fn is_inside(&self, u: Float, v: Float) -> bool {
        let du: Float = (u - self.u0) / self.a;
        let dv: Float = (v - self.v0) / self.b;
        du * du + dv * dv <= 1.0
    }
}

/// Ring around the centre (½, ½) of the unit square.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ApertureAnnulus {
    pub r_min: Float,
    pub r_max: Float,
}

impl ApertureAnnulus {
    pub fn new(r_min: Float, r_max: Float) -> Result<Self, ConfigError> {
        if !(r_min >= 0.0 && r_min < r_max) {
            return Err(ConfigError::InvalidAperture(format!(
                "annulus needs 0 <= r_min < r_max (got {}, {})",
                r_min, r_max
            )));
        }
        Ok(ApertureAnnulus { r_min, r_max })
    }
}

impl Aperture for ApertureAnnulus {
    fn is_inside(&self, u: Float, v: Float) -> bool {
        let du: Float = u - 0.5;
        let dv: Float = v - 0.5;
        let r2: Float = du * du + dv * dv;
        r2 >= self.r_min * self.r_min && r2 <= self.r_max * self.r_max
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rectangle() {
        let a = ApertureRectangle::new(0.25, 0.75, 0.0, 0.5).expect("valid");
        assert!(a.is_inside(0.5, 0.25));
        assert!(!a.is_inside(0.8, 0.25));
        assert!(!a.is_inside(0.5, 0.6));
        assert!(ApertureRectangle::new(0.5, 0.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn ellipse_and_annulus() {
        let e = ApertureEllipse::new(0.5, 0.5, 0.5, 0.25).expect("valid");
        assert!(e.is_inside(0.9, 0.5));
        assert!(!e.is_inside(0.5, 0.9));
        assert!(ApertureEllipse::new(0.5, 0.5, 0.0, 0.25).is_err());
        let ring = ApertureAnnulus::new(0.2, 0.4).expect("valid");
        assert!(!ring.is_inside(0.5, 0.5));
        assert!(ring.is_inside(0.8, 0.5));
        assert!(!ring.is_inside(1.0, 1.0));
        assert!(ApertureAnnulus::new(0.4, 0.2).is_err());
    }
}
