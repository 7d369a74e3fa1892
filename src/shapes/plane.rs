// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds2f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::{is_front_facing, DifferentialGeometry};
use crate::core::shape::{check_positive, uv_in_domain, ActiveSide, Shape};
use crate::core::solar::{Float, EPSILON};

/// Rectangle of `width_x` by `width_y` centred at the origin of the
/// z = 0 plane. The geometric normal is +z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub width_x: Float,
    pub width_y: Float,
    pub active_side: ActiveSide,
}

impl Default for Plane {
    fn default() -> Self {
        Plane {
            width_x: 1.0,
            width_y: 1.0,
            active_side: ActiveSide::Both,
        }
    }
}

impl Plane {
    pub fn new(width_x: Float, width_y: Float, active_side: ActiveSide) -> Self {
        Plane {
            width_x,
            width_y,
            active_side,
        }
    }
}

impl Shape for Plane {
    fn name(&self) -> &'static str {
        "plane"
    }
    fn intersect(
        &self,
        r: &Ray,
        aperture: Option<&dyn Aperture>,
    ) -> Option<(DifferentialGeometry, Float)> {
        let d: &Vector3f = r.direction();
        // reject rays parallel to the plane
        if d.z.abs() < EPSILON {
            return None;
        }
        let t_hit: Float = -r.o.z / d.z;
        if !r.in_range(t_hit) {
            return None;
        }
        let p_hit: Point3f = r.position(t_hit);
        let uv: Point2f = self.get_uv(&p_hit);
        if !uv_in_domain(uv.x, uv.y) {
            return None;
        }
        if let Some(aperture) = aperture {
            if !aperture.is_inside(uv.x, uv.y) {
                return None;
            }
        }
        let n: Normal3f = self.get_normal(uv.x, uv.y);
        let is_front: bool = is_front_facing(&n, d);
        if !self.active_side.accepts(is_front) {
            return None;
        }
        let dg = DifferentialGeometry::new(
            Point3f::new(p_hit.x, p_hit.y, 0.0),
            uv,
            Vector3f::new(self.width_x, 0.0, 0.0),
            Vector3f::new(0.0, self.width_y, 0.0),
            n,
            is_front,
        );
        Some((dg, t_hit))
    }
    fn get_point(&self, u: Float, v: Float) -> Point3f {
        Point3f::new((u - 0.5) * self.width_x, (v - 0.5) * self.width_y, 0.0)
    }
    fn get_normal(&self, _u: Float, _v: Float) -> Normal3f {
        Normal3f::new(0.0, 0.0, 1.0)
    }
    fn get_uv(&self, p: &Point3f) -> Point2f {
        Point2f::new(p.x / self.width_x + 0.5, p.y / self.width_y + 0.5)
    }
    fn object_bound(&self) -> Bounds3f {
        Bounds3f::new(self.get_point(0.0, 0.0), self.get_point(1.0, 1.0))
    }
    fn area(&self) -> Float {
        self.width_x * self.width_y
    }
    fn active_side(&self) -> ActiveSide {
        self.active_side
    }
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive(self.name(), "width_x", self.width_x)?;
        check_positive(self.name(), "width_y", self.width_y)
    }
    fn analysis_extent(&self) -> Bounds2f {
        Bounds2f::new(
            Point2f::new(-0.5 * self.width_x, -0.5 * self.width_y),
            Point2f::new(0.5 * self.width_x, 0.5 * self.width_y),
        )
    }
    fn analysis_coordinates(&self, p: &Point3f) -> Point2f {
        Point2f::new(p.x, p.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::aperture::ApertureRectangle;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uv_round_trip_and_corners() {
        let plane = Plane::new(4.0, 2.0, ActiveSide::Both);
        for i in 0..=10 {
            for j in 0..=10 {
                let u: Float = i as Float / 10.0;
                let v: Float = j as Float / 10.0;
                let uv = plane.get_uv(&plane.get_point(u, v));
                assert_abs_diff_eq!(uv.x, u, epsilon = 1e-12);
                assert_abs_diff_eq!(uv.y, v, epsilon = 1e-12);
            }
        }
        assert_eq!(plane.get_point(0.0, 0.0), Point3f::new(-2.0, -1.0, 0.0));
        assert_eq!(plane.get_point(1.0, 1.0), Point3f::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn ray_along_normal_hits_at_distance() {
        let plane = Plane::new(2.0, 2.0, ActiveSide::Front);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 3.0), Vector3f::new(0.0, 0.0, -1.0));
        let (dg, t) = plane.intersect(&ray, None).expect("hit from the front");
        assert_abs_diff_eq!(t, 3.0);
        assert!(dg.n.approx_eq(&Normal3f::new(0.0, 0.0, 1.0)));
        assert!(dg.is_front);
        assert_abs_diff_eq!(dg.uv.x, 0.5);
        // the same ray from below strikes the back side
        let below = Ray::new(Point3f::new(0.0, 0.0, -3.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(plane.intersect(&below, None).is_none());
        let both = Plane::new(2.0, 2.0, ActiveSide::Both);
        let (dg, _t) = both.intersect(&below, None).expect("hit from the back");
        assert!(!dg.is_front);
    }

    #[test]
    fn misses_outside_extent_interval_and_aperture() {
        let plane = Plane::new(2.0, 2.0, ActiveSide::Both);
        let outside = Ray::new(Point3f::new(1.5, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(plane.intersect(&outside, None).is_none());
        let short = Ray::with_interval(
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, -1.0),
            EPSILON,
            0.5,
        );
        assert!(!plane.intersect_p(&short, None));
        let parallel = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(plane.intersect(&parallel, None).is_none());
        let aperture = ApertureRectangle::new(0.0, 0.4, 0.0, 1.0).expect("valid");
        let centre = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(plane.intersect(&centre, Some(&aperture)).is_none());
        let left = Ray::new(Point3f::new(-0.5, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(plane.intersect(&left, Some(&aperture)).is_some());
    }

    #[test]
    fn invalid_widths_are_rejected() {
        assert!(Plane::new(0.0, 1.0, ActiveSide::Both).validate().is_err());
        assert!(Plane::new(1.0, -1.0, ActiveSide::Both).validate().is_err());
        assert!(Plane::default().validate().is_ok());
    }
}
