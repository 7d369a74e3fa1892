//! # rs_solartrace
//!
//! [Rust][rust] crate to trace sun light onto the surfaces of a solar
//! concentrator and measure the flux arriving on them.
//!
//! The photon tracer lives [here][tracer]; it feeds the flux analysis
//! found [here][flux].
//!
//! [rust]: https://www.rust-lang.org
//! [tracer]: tracer/fn.trace_photons.html
//! [flux]: analysis/flux/struct.FluxAnalysis.html

#[macro_use] extern crate impl_ops;

pub mod analysis;
pub mod blockqueue;
pub mod core;
pub mod lights;
pub mod shapes;
pub mod tracer;
