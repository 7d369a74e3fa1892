//! Once photons have been traced onto a surface they are binned into a
//! regular grid over the surface's analysis rectangle. The
//! **FluxAnalysis** session turns the counts into flux statistics,
//! sector profiles and a flux matrix, and **export** writes the result
//! as text or as an image.

pub mod export;
pub mod flux;
