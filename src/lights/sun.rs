// solar
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::rng::Rng;
use crate::core::sampling::uniform_sample_cone;
use crate::core::solar::{lerp, Float, EPSILON, PI};
use crate::core::transform::Transform;

/// Direct normal irradiance in W/m^2 used when nothing else is given.
pub const DEFAULT_IRRADIANCE: Float = 1000.0;
/// Angular radius of the solar disk in radians.
pub const DEFAULT_THETA_MAX: Float = 0.00465;

/// Sun shape with uniform radiance inside a cone of half-angle
/// `theta_max`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SunPillbox {
    pub irradiance: Float,
    pub theta_max: Float,
}

impl Default for SunPillbox {
    fn default() -> Self {
        SunPillbox {
            irradiance: DEFAULT_IRRADIANCE,
            theta_max: DEFAULT_THETA_MAX,
        }
    }
}

impl SunPillbox {
    pub fn new(irradiance: Float, theta_max: Float) -> Result<Self, ConfigError> {
        if !(irradiance > 0.0 && irradiance.is_finite()) {
            return Err(ConfigError::InvalidShapeParameter {
                shape: "sun",
                parameter: "irradiance",
                value: irradiance,
            });
        }
        if !(theta_max >= 0.0 && theta_max < 0.5 * PI) {
            return Err(ConfigError::InvalidShapeParameter {
                shape: "sun",
                parameter: "theta_max",
                value: theta_max,
            });
        }
        Ok(SunPillbox {
            irradiance,
            theta_max,
        })
    }
    /// Direction in the sun frame, around the +y axis.
    pub fn generate_direction(&self, rng: &mut Rng) -> Vector3f {
        let u: Point2f = Point2f::new(rng.uniform_float(), rng.uniform_float());
        let v: Vector3f = uniform_sample_cone(&u, self.theta_max.cos());
        Vector3f::new(v.x, v.z, v.y)
    }
}

/// Unit vector pointing at the sun. The azimuth is measured from +y
/// towards +x, the elevation from the horizon (z = 0) upwards. Both in
/// radians.
pub fn sun_vector(azimuth: Float, elevation: Float) -> Vector3f {
    Vector3f::new(
        azimuth.sin() * elevation.cos(),
        azimuth.cos() * elevation.cos(),
        elevation.sin(),
    )
}

/// The sun: its shape plus its position in the sky (radians).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SunSource {
    pub shape: SunPillbox,
    pub azimuth: Float,
    pub elevation: Float,
}

impl Default for SunSource {
    fn default() -> Self {
        SunSource {
            shape: SunPillbox::default(),
            azimuth: 0.0,
            elevation: 0.5 * PI,
        }
    }
}

impl SunSource {
    pub fn new(shape: SunPillbox, azimuth: Float, elevation: Float) -> Self {
        SunSource {
            shape,
            azimuth,
            elevation,
        }
    }
    pub fn direction(&self) -> Vector3f {
        sun_vector(self.azimuth, self.elevation)
    }
    /// Aperture covering a target with the given world bound.
    pub fn aperture_for(&self, world_bound: &Bounds3f) -> Result<SunAperture, ConfigError> {
        SunAperture::enclosing(world_bound, self.azimuth, self.elevation)
    }
}

/// Rectangle perpendicular to the sun direction from which all rays
/// start. In the sun frame it spans `x` and `z` at `y = 0`, and rays
/// travel along +y.
#[derive(Debug, Clone)]
pub struct SunAperture {
    pub world_to_sun: Transform,
    pub x_min: Float,
    pub x_max: Float,
    pub z_min: Float,
    pub z_max: Float,
}

impl SunAperture {
    /// Smallest aperture (in the sun frame) that covers the given world
    /// bound when seen from the sun.
    pub fn enclosing(
        world_bound: &Bounds3f,
        azimuth: Float,
        elevation: Float,
    ) -> Result<SunAperture, ConfigError> {
        if world_bound.is_empty() {
            return Err(ConfigError::DegenerateExtent);
        }
        let to_sun: Vector3f = sun_vector(azimuth, elevation);
        let centre: Point3f = world_bound.center();
        let distance: Float = world_bound.diagonal().length() + 1.0;
        let eye: Point3f = centre + to_sun * distance;
        let up: Vector3f = if to_sun.z.abs() > 1.0 - EPSILON {
            Vector3f::new(0.0, 1.0, 0.0)
        } else {
            Vector3f::new(0.0, 0.0, 1.0)
        };
        let world_to_sun: Transform = Transform::look_at(&eye, &centre, &up)?;
        let local: Bounds3f = world_to_sun.transform_bounds(world_bound);
        let aperture = SunAperture {
            world_to_sun,
            x_min: local.p_min.x,
            x_max: local.p_max.x,
            z_min: local.p_min.z,
            z_max: local.p_max.z,
        };
        if !(aperture.area() > 0.0) {
            return Err(ConfigError::DegenerateExtent);
        }
        Ok(aperture)
    }
    pub fn area(&self) -> Float {
        (self.x_max - self.x_min) * (self.z_max - self.z_min)
    }
    /// World space ray leaving a random point of the aperture.
    pub fn generate_ray(&self, sun: &SunPillbox, rng: &mut Rng) -> Ray {
        let x: Float = lerp(rng.uniform_float(), self.x_min, self.x_max);
        let z: Float = lerp(rng.uniform_float(), self.z_min, self.z_max);
        let d: Vector3f = sun.generate_direction(rng);
        let local = Ray::new(Point3f::new(x, 0.0, z), d);
        self.world_to_sun.transform_ray_inverse(&local)
    }
    /// Power carried by every ray when `n_rays` are traced.
    pub fn photon_power(&self, sun: &SunPillbox, n_rays: u64) -> Float {
        if n_rays == 0 {
            return 0.0;
        }
        sun.irradiance * self.area() / n_rays as Float
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::vec3_dot_vec3f;
    use approx::assert_abs_diff_eq;

    fn unit_square() -> Bounds3f {
        Bounds3f::new(Point3f::new(-0.5, -0.5, 0.0), Point3f::new(0.5, 0.5, 0.0))
    }

    #[test]
    fn zenith_sun_covers_the_target_footprint() {
        let aperture = SunAperture::enclosing(&unit_square(), 0.0, 0.5 * PI).expect("valid");
        assert_abs_diff_eq!(aperture.area(), 1.0, epsilon = 1e-9);
        let sun = SunPillbox::new(1000.0, 0.0).expect("valid");
        let mut rng = Rng::with_sequence(1);
        for _ in 0..100 {
            let ray = aperture.generate_ray(&sun, &mut rng);
            assert!(ray.direction().approx_eq(&Vector3f::new(0.0, 0.0, -1.0)));
            let t: Float = -ray.o.z / ray.direction().z;
            let p = ray.position(t);
            assert!(p.x.abs() <= 0.5 + 1e-9 && p.y.abs() <= 0.5 + 1e-9);
        }
        assert_abs_diff_eq!(aperture.photon_power(&sun, 1000), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn rays_point_away_from_the_sun() {
        let (azimuth, elevation): (Float, Float) = (0.7, 0.4);
        let aperture = SunAperture::enclosing(&unit_square(), azimuth, elevation).expect("valid");
        let sun = SunPillbox::default();
        let to_sun = sun_vector(azimuth, elevation);
        let mut rng = Rng::with_sequence(3);
        for _ in 0..100 {
            let ray = aperture.generate_ray(&sun, &mut rng);
            let cos = -vec3_dot_vec3f(ray.direction(), &to_sun);
            assert!(cos >= sun.theta_max.cos() - 1e-9);
        }
    }

    #[test]
    fn invalid_sun_parameters() {
        assert!(SunPillbox::new(0.0, 0.01).is_err());
        assert!(SunPillbox::new(1000.0, -0.01).is_err());
        assert!(SunAperture::enclosing(&Bounds3f::default(), 0.0, 1.0).is_err());
    }
}
