//! The geometric kernel: math types, transforms, the shape interface,
//! intersection records, surface nodes and photons.

pub mod aperture;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod photon;
pub mod primitive;
pub mod rng;
pub mod sampling;
pub mod shape;
pub mod solar;
pub mod transform;
