// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds2f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::{is_front_facing, DifferentialGeometry};
use crate::core::shape::{check_positive, uv_in_domain, ActiveSide, Shape};
use crate::core::solar::{Float, EPSILON, PI, TWO_PI};

/// Flat circular disk of the given radius in the z = 0 plane, normal
/// +z. Parameterized in polar form: `u = phi / 2pi`, `v = r / radius`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Disk {
    pub radius: Float,
    pub active_side: ActiveSide,
}

impl Default for Disk {
    fn default() -> Self {
        Disk {
            radius: 0.5,
            active_side: ActiveSide::Both,
        }
    }
}

impl Disk {
    pub fn new(radius: Float, active_side: ActiveSide) -> Self {
        Disk {
            radius,
            active_side,
        }
    }
}

impl Shape for Disk {
    fn name(&self) -> &'static str {
        "disk"
    }
    fn intersect(
        &self,
        r: &Ray,
        aperture: Option<&dyn Aperture>,
    ) -> Option<(DifferentialGeometry, Float)> {
        let d: &Vector3f = r.direction();
        // reject disk intersections for rays parallel to the disk's plane
        if d.z.abs() < EPSILON {
            return None;
        }
        let t_hit: Float = -r.o.z / d.z;
        if !r.in_range(t_hit) {
            return None;
        }
        // see if hit point is inside disk radius
        let p_hit: Point3f = r.position(t_hit);
        let dist2: Float = p_hit.x * p_hit.x + p_hit.y * p_hit.y;
        if dist2 > self.radius * self.radius {
            return None;
        }
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
        let phi: Float = uv.x * TWO_PI;
        let dpdu: Vector3f = Vector3f::new(-TWO_PI * p_hit.y, TWO_PI * p_hit.x, 0.0);
        let dpdv: Vector3f = Vector3f::new(self.radius * phi.cos(), self.radius * phi.sin(), 0.0);
        let dg = DifferentialGeometry::new(
            Point3f::new(p_hit.x, p_hit.y, 0.0),
            uv,
            dpdu,
            dpdv,
            n,
            is_front,
        );
        Some((dg, t_hit))
    }
    fn get_point(&self, u: Float, v: Float) -> Point3f {
        let phi: Float = u * TWO_PI;
        let r: Float = v * self.radius;
        Point3f::new(r * phi.cos(), r * phi.sin(), 0.0)
    }
    fn get_normal(&self, _u: Float, _v: Float) -> Normal3f {
        Normal3f::new(0.0, 0.0, 1.0)
    }
    fn get_uv(&self, p: &Point3f) -> Point2f {
        let mut phi: Float = p.y.atan2(p.x);
        if phi < 0.0 as Float {
            phi += TWO_PI;
        }
        let dist: Float = (p.x * p.x + p.y * p.y).sqrt();
        Point2f::new(phi / TWO_PI, dist / self.radius)
    }
    fn object_bound(&self) -> Bounds3f {
        Bounds3f::new(
            Point3f::new(-self.radius, -self.radius, 0.0),
            Point3f::new(self.radius, self.radius, 0.0),
        )
    }
    fn area(&self) -> Float {
        PI * self.radius * self.radius
    }
    fn active_side(&self) -> ActiveSide {
        self.active_side
    }
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive(self.name(), "radius", self.radius)
    }
    fn analysis_extent(&self) -> Bounds2f {
        Bounds2f::new(
            Point2f::new(-self.radius, -self.radius),
            Point2f::new(self.radius, self.radius),
        )
    }
    fn analysis_coordinates(&self, p: &Point3f) -> Point2f {
        Point2f::new(p.x, p.y)
    }
}
