//! Surfaces of a solar concentrator. All of them implement the
//! [Shape](../core/shape/trait.Shape.html) interface in their own local
//! frame.
//!
//! - Cylinder
//! - Disk
//! - Parabolic dish
//! - Plane
//!
//! ## Planes
//!
//! The simplest receiver or mirror facet: a rectangle in the z = 0
//! plane, parameterized linearly over its two widths.
//!
//! ## Disks
//!
//! The disk has a particularly straightforward intersection routine
//! that avoids solving a quadratic equation. It uses polar (u, v)
//! coordinates.
//!
//! ## Cylinders
//!
//! Cylinder shapes are centered around the z axis and may be limited to
//! a partial sweep angle, which is how trough receivers and tube
//! segments are modelled. The quadratic can yield two valid roots; the
//! nearer one is reported unless it is clipped, cut by an aperture or
//! on an inactive side.
//!
//! ## Parabolic Dishes
//!
//! A paraboloid of revolution over a rectangular footprint. Rays
//! parallel to its axis reflect through the focus.

pub mod cylinder;
pub mod disk;
pub mod parabolic;
pub mod plane;
