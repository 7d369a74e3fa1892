//! In order to measure flux on a receiver there must be a source of
//! illumination. The only light source of a solar concentrator is the
//! sun.
//!
//! ## Sun
//!
//! The **SunPillbox** models the sun as a disk of uniform radiance: ray
//! directions are spread uniformly over a small cone of half-angle
//! `theta_max` around the sun vector.
//!
//! Rays start on a **SunAperture**, a rectangle perpendicular to the
//! sun vector that is just large enough to cover the target when seen
//! from the sun. Every traced ray carries the same share of the power
//! falling on that rectangle.
//!
//! ```rust
//! use rs_solartrace::core::geometry::{Bounds3f, Point3f};
//! use rs_solartrace::core::rng::Rng;
//! use rs_solartrace::lights::sun::{SunAperture, SunPillbox};
//!
//! let target = Bounds3f::new(Point3f::new(-1.0, -1.0, 0.0), Point3f::new(1.0, 1.0, 0.0));
//! let aperture = SunAperture::enclosing(&target, 0.0, 1.2).unwrap();
//! let sun = SunPillbox::default();
//! let mut rng = Rng::with_sequence(0);
//! let ray = aperture.generate_ray(&sun, &mut rng);
//! assert!(ray.direction().z < 0.0);
//! ```

pub mod sun;
