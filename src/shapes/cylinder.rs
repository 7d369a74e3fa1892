// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds2f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::{is_front_facing, DifferentialGeometry};
use crate::core::shape::{check_positive, uv_in_domain, ActiveSide, Shape};
use crate::core::solar::{quadratic, Float, EPSILON, TWO_PI};

/// Open cylinder around the z axis, `z` in `[-length/2, length/2]`,
/// swept from `phi = 0` to `phi_max`. The normal points away from the
/// axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cylinder {
    pub radius: Float,
    pub length: Float,
    pub phi_max: Float,
    pub active_side: ActiveSide,
}

impl Default for Cylinder {
    fn default() -> Self {
        Cylinder {
            radius: 0.5,
            length: 1.0,
            phi_max: TWO_PI,
            active_side: ActiveSide::Both,
        }
    }
}

impl Cylinder {
    pub fn new(radius: Float, length: Float, phi_max: Float, active_side: ActiveSide) -> Self {
        Cylinder {
            radius,
            length,
            phi_max,
            active_side,
        }
    }
    fn phi(p: &Point3f) -> Float {
        let mut phi: Float = p.y.atan2(p.x);
        if phi < 0.0 as Float {
            phi += TWO_PI;
        }
        phi
    }
    /// Hit record for the root `t`, or `None` if that point is clipped
    /// away or struck from an inactive side.
    fn hit_at(
        &self,
        r: &Ray,
        t: Float,
        aperture: Option<&dyn Aperture>,
    ) -> Option<DifferentialGeometry> {
        if !r.in_range(t) {
            return None;
        }
        let mut p_hit: Point3f = r.position(t);
        // refine cylinder intersection point
        let hit_rad: Float = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        p_hit.x *= self.radius / hit_rad;
        p_hit.y *= self.radius / hit_rad;
        let phi: Float = Cylinder::phi(&p_hit);
        // test cylinder intersection against clipping parameters
        if phi > self.phi_max || p_hit.z.abs() > 0.5 * self.length + EPSILON {
            return None;
        }
        let u: Float = phi / self.phi_max;
        let v: Float = p_hit.z / self.length + 0.5;
        if !uv_in_domain(u, v) {
            return None;
        }
        if let Some(aperture) = aperture {
            if !aperture.is_inside(u, v) {
                return None;
            }
        }
        let n: Normal3f = Normal3f::new(p_hit.x / self.radius, p_hit.y / self.radius, 0.0);
        let is_front: bool = is_front_facing(&n, r.direction());
        if !self.active_side.accepts(is_front) {
            return None;
        }
        // compute cylinder $\dpdu$ and $\dpdv$
        let dpdu: Vector3f = Vector3f {
            x: -self.phi_max * p_hit.y,
            y: self.phi_max * p_hit.x,
            z: 0.0,
        };
        let dpdv: Vector3f = Vector3f {
            x: 0.0,
            y: 0.0,
            z: self.length,
        };
        Some(DifferentialGeometry::new(
            p_hit,
            Point2f::new(u, v),
            dpdu,
            dpdv,
            n,
            is_front,
        ))
    }
}

impl Shape for Cylinder {
    fn name(&self) -> &'static str {
        "cylinder"
    }
    fn intersect(
        &self,
        r: &Ray,
        aperture: Option<&dyn Aperture>,
    ) -> Option<(DifferentialGeometry, Float)> {
        let d: &Vector3f = r.direction();
        let o: &Point3f = &r.o;
        // compute quadratic cylinder coefficients
        let a: Float = d.x * d.x + d.y * d.y;
        if a < EPSILON * EPSILON {
            // parallel to the axis
            return None;
        }
        let b: Float = 2.0 * (d.x * o.x + d.y * o.y);
        let c: Float = o.x * o.x + o.y * o.y - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;
        if t0 > r.t_max.get() || t1 < r.t_min.get() {
            return None;
        }
        // the nearer root wins unless it is clipped, then try the other
        for t in [t0, t1].iter() {
            if let Some(dg) = self.hit_at(r, *t, aperture) {
                return Some((dg, *t));
            }
        }
        None
    }
    fn get_point(&self, u: Float, v: Float) -> Point3f {
        let phi: Float = u * self.phi_max;
        Point3f::new(
            self.radius * phi.cos(),
            self.radius * phi.sin(),
            (v - 0.5) * self.length,
        )
    }
    fn get_normal(&self, u: Float, _v: Float) -> Normal3f {
        let phi: Float = u * self.phi_max;
        Normal3f::new(phi.cos(), phi.sin(), 0.0)
    }
    fn get_uv(&self, p: &Point3f) -> Point2f {
        Point2f::new(
            Cylinder::phi(p) / self.phi_max,
            p.z / self.length + 0.5,
        )
    }
    fn object_bound(&self) -> Bounds3f {
        Bounds3f::new(
            Point3f::new(-self.radius, -self.radius, -0.5 * self.length),
            Point3f::new(self.radius, self.radius, 0.5 * self.length),
        )
    }
    fn area(&self) -> Float {
        self.length * self.radius * self.phi_max
    }
    fn active_side(&self) -> ActiveSide {
        self.active_side
    }
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive(self.name(), "radius", self.radius)?;
        check_positive(self.name(), "length", self.length)?;
        check_positive(self.name(), "phi_max", self.phi_max)?;
        if self.phi_max > TWO_PI + EPSILON {
            return Err(ConfigError::InvalidShapeParameter {
                shape: self.name(),
                parameter: "phi_max",
                value: self.phi_max,
            });
        }
        Ok(())
    }
    /// The surface unrolled: arc length along x, height along y.
    fn analysis_extent(&self) -> Bounds2f {
        Bounds2f::new(
            Point2f::new(0.0, -0.5 * self.length),
            Point2f::new(self.phi_max * self.radius, 0.5 * self.length),
        )
    }
    fn analysis_coordinates(&self, p: &Point3f) -> Point2f {
        Point2f::new(Cylinder::phi(p) * self.radius, p.z)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::aperture::ApertureRectangle;
    use crate::core::solar::PI;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uv_round_trip() {
        let cylinder = Cylinder::new(2.0, 3.0, PI, ActiveSide::Both);
        for i in 0..=8 {
            for j in 0..=8 {
                let u: Float = i as Float / 8.0;
                let v: Float = j as Float / 8.0;
                let uv = cylinder.get_uv(&cylinder.get_point(u, v));
                assert_abs_diff_eq!(uv.x, u, epsilon = 1e-9);
                assert_abs_diff_eq!(uv.y, v, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn nearest_root_hits_outside() {
        let cylinder = Cylinder::default();
        let ray = Ray::new(Point3f::new(5.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        let (dg, t) = cylinder.intersect(&ray, None).expect("hit");
        assert_abs_diff_eq!(t, 4.5, epsilon = 1e-12);
        assert!(dg.is_front);
        assert!(dg.n.approx_eq(&Normal3f::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn falls_back_to_far_root_when_near_one_is_rejected() {
        // the near root strikes the outside (front) and is rejected
        let back_only = Cylinder::new(0.5, 1.0, TWO_PI, ActiveSide::Back);
        let ray = Ray::new(Point3f::new(5.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        let (dg, t) = back_only.intersect(&ray, None).expect("inner wall");
        assert_abs_diff_eq!(t, 5.5, epsilon = 1e-12);
        assert!(!dg.is_front);
        // half cylinder: the near side (phi = pi) is cut away
        let half = Cylinder::new(0.5, 1.0, PI / 2.0, ActiveSide::Both);
        let ray = Ray::new(Point3f::new(-5.0, 0.25, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let (dg, _t) = half.intersect(&ray, None).expect("far wall");
        assert!(dg.p.x > 0.0);
        // aperture cutting the near root
        let aperture = ApertureRectangle::new(0.0, 0.3, 0.0, 1.0).expect("valid");
        let full = Cylinder::default();
        let ray = Ray::new(Point3f::new(-5.0, 0.1, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let (dg, _t) = full.intersect(&ray, Some(&aperture)).expect("far root");
        assert!(dg.uv.x <= 0.3);
        assert!(!dg.is_front);
    }

    #[test]
    fn misses() {
        let cylinder = Cylinder::default();
        let above = Ray::new(Point3f::new(5.0, 0.0, 2.0), Vector3f::new(-1.0, 0.0, 0.0));
        assert!(cylinder.intersect(&above, None).is_none());
        let axial = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(cylinder.intersect(&axial, None).is_none());
        let wide = Ray::new(Point3f::new(5.0, 2.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        assert!(!cylinder.intersect_p(&wide, None));
        assert!(Cylinder::new(0.5, 1.0, 7.0, ActiveSide::Both).validate().is_err());
    }
}
