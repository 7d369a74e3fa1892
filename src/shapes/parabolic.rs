// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{
    vec3_cross_vec3, Bounds2f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f,
};
use crate::core::interaction::{is_front_facing, DifferentialGeometry};
use crate::core::shape::{check_positive, uv_in_domain, ActiveSide, Shape};
use crate::core::solar::{quadratic, Float, EPSILON};

/// Number of midpoint samples per axis used to integrate the area.
const AREA_SAMPLES: usize = 64;

/// Paraboloid `z = (x^2 + y^2) / (4 f)` over a `width_x` by `width_y`
/// footprint centred on the axis. The focus sits at `(0, 0, f)` and the
/// normal points towards it (the concave side is the front).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParabolicDish {
    pub focus_length: Float,
    pub width_x: Float,
    pub width_y: Float,
    pub active_side: ActiveSide,
}

impl Default for ParabolicDish {
    fn default() -> Self {
        ParabolicDish {
            focus_length: 0.125,
            width_x: 1.0,
            width_y: 1.0,
            active_side: ActiveSide::Both,
        }
    }
}

impl ParabolicDish {
    pub fn new(focus_length: Float, width_x: Float, width_y: Float, active_side: ActiveSide) -> Self {
        ParabolicDish {
            focus_length,
            width_x,
            width_y,
            active_side,
        }
    }
    pub fn focus(&self) -> Point3f {
        Point3f::new(0.0, 0.0, self.focus_length)
    }
    fn height(&self, x: Float, y: Float) -> Float {
        (x * x + y * y) / (4.0 * self.focus_length)
    }
    fn partials(&self, x: Float, y: Float) -> (Vector3f, Vector3f) {
        let two_f: Float = 2.0 * self.focus_length;
        (
            Vector3f::new(self.width_x, 0.0, x * self.width_x / two_f),
            Vector3f::new(0.0, self.width_y, y * self.width_y / two_f),
        )
    }
    fn hit_at(
        &self,
        r: &Ray,
        t: Float,
        aperture: Option<&dyn Aperture>,
    ) -> Option<DifferentialGeometry> {
        if !r.in_range(t) {
            return None;
        }
        let hit: Point3f = r.position(t);
        let uv: Point2f = self.get_uv(&hit);
        if !uv_in_domain(uv.x, uv.y) {
            return None;
        }
        if let Some(aperture) = aperture {
            if !aperture.is_inside(uv.x, uv.y) {
                return None;
            }
        }
        let n: Normal3f = self.get_normal(uv.x, uv.y);
        let is_front: bool = is_front_facing(&n, r.direction());
        if !self.active_side.accepts(is_front) {
            return None;
        }
        // project back onto the surface
        let p: Point3f = Point3f::new(hit.x, hit.y, self.height(hit.x, hit.y));
        let (dpdu, dpdv) = self.partials(p.x, p.y);
        Some(DifferentialGeometry::new(p, uv, dpdu, dpdv, n, is_front))
    }
}

impl Shape for ParabolicDish {
    fn name(&self) -> &'static str {
        "parabolic dish"
    }
    fn intersect(
        &self,
        r: &Ray,
        aperture: Option<&dyn Aperture>,
    ) -> Option<(DifferentialGeometry, Float)> {
        let d: &Vector3f = r.direction();
        let o: &Point3f = &r.o;
        let four_f: Float = 4.0 * self.focus_length;
        let a: Float = d.x * d.x + d.y * d.y;
        let b: Float = 2.0 * (o.x * d.x + o.y * d.y) - four_f * d.z;
        let c: Float = o.x * o.x + o.y * o.y - four_f * o.z;
        if a < EPSILON * EPSILON {
            // parallel to the axis: a single crossing
            if b.abs() < EPSILON {
                return None;
            }
            let t: Float = -c / b;
            return self.hit_at(r, t, aperture).map(|dg| (dg, t));
        }
        let (t0, t1) = quadratic(a, b, c)?;
        if t0 > r.t_max.get() || t1 < r.t_min.get() {
            return None;
        }
        for t in [t0, t1].iter() {
            if let Some(dg) = self.hit_at(r, *t, aperture) {
                return Some((dg, *t));
            }
        }
        None
    }
    fn get_point(&self, u: Float, v: Float) -> Point3f {
        let x: Float = (u - 0.5) * self.width_x;
        let y: Float = (v - 0.5) * self.width_y;
        Point3f::new(x, y, self.height(x, y))
    }
    fn get_normal(&self, u: Float, v: Float) -> Normal3f {
        let x: Float = (u - 0.5) * self.width_x;
        let y: Float = (v - 0.5) * self.width_y;
        let two_f: Float = 2.0 * self.focus_length;
        Normal3f::new(-x / two_f, -y / two_f, 1.0).normalize()
    }
    fn get_uv(&self, p: &Point3f) -> Point2f {
        Point2f::new(p.x / self.width_x + 0.5, p.y / self.width_y + 0.5)
    }
    fn object_bound(&self) -> Bounds3f {
        let corner: Point3f = self.get_point(1.0, 1.0);
        Bounds3f::new(
            Point3f::new(-0.5 * self.width_x, -0.5 * self.width_y, 0.0),
            corner,
        )
    }
    /// Midpoint rule over the footprint of `|dpdu x dpdv|`.
    fn area(&self) -> Float {
        let step: Float = 1.0 / AREA_SAMPLES as Float;
        let mut area: Float = 0.0;
        for i in 0..AREA_SAMPLES {
            for j in 0..AREA_SAMPLES {
                let p: Point3f =
                    self.get_point((i as Float + 0.5) * step, (j as Float + 0.5) * step);
                let (dpdu, dpdv) = self.partials(p.x, p.y);
                area += vec3_cross_vec3(&dpdu, &dpdv).length();
            }
        }
        area * step * step
    }
    fn active_side(&self) -> ActiveSide {
        self.active_side
    }
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive(self.name(), "focus_length", self.focus_length)?;
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
