//! Error types.
//!
//! Only configuration problems and I/O are errors. A ray missing a
//! shape, a (u, v) pair outside an aperture or an analysis without
//! photons are ordinary outcomes and are expressed with `Option` or
//! zero-valued statistics instead.

use thiserror::Error;

use crate::core::shape::ShapeId;
use crate::core::solar::Float;

/// Precondition violations detected while setting things up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("singular matrix can not be inverted")]
    SingularMatrix,

    #[error("\"up\" vector {up:?} and viewing direction {dir:?} passed to look_at are parallel")]
    DegenerateLookAt { up: [Float; 3], dir: [Float; 3] },

    #[error("invalid {parameter} for {shape}: {value}")]
    InvalidShapeParameter {
        shape: &'static str,
        parameter: &'static str,
        value: Float,
    },

    #[error("invalid aperture: {0}")]
    InvalidAperture(String),

    #[error("grid divisions must be at least 1 (got {width} x {height})")]
    InvalidDivisions { width: usize, height: usize },

    #[error("surface extent must be strictly positive")]
    DegenerateExtent,

    #[error("no surface selected for flux analysis")]
    NoSurfaceSelected,

    #[error("no surface registered with {0:?}")]
    UnknownShape(ShapeId),
}

/// Errors of a flux analysis run or export.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("a tracing worker panicked")]
    WorkerPanicked,

    #[error("nothing available to export, run the simulation first")]
    NothingToExport,

    #[error("flux image of {width} x {height} cells at {pixels_per_cell} pixels per cell is too large")]
    ImageTooLarge {
        width: usize,
        height: usize,
        pixels_per_cell: u32,
    },
}
