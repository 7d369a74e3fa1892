//! The geometry of a particular point on a surface is represented by
//! a **DifferentialGeometry** record. Having this abstraction lets the
//! tracer and the flux analysis work with points on surfaces without
//! needing to consider the particular type of geometric shape the
//! points lie on.
//!
//! A record is created fresh for every successful intersection and is
//! plain data (`Copy`). The intersected surface is referenced by a
//! [ShapeId](../shape/struct.ShapeId.html) handle, never owned.

// solar
use crate::core::geometry::{nrm_dot_vec3f, Normal3f, Point2f, Point3f, Vector3f};
use crate::core::shape::ShapeId;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DifferentialGeometry {
    pub p: Point3f,
    pub uv: Point2f,
    pub dpdu: Vector3f,
    pub dpdv: Vector3f,
    pub n: Normal3f,
    /// filled in by the surface node that owns the shape
    pub shape: Option<ShapeId>,
    /// the ray struck the side the normal points to
    pub is_front: bool,
}

impl DifferentialGeometry {
    pub fn new(
        p: Point3f,
        uv: Point2f,
        dpdu: Vector3f,
        dpdv: Vector3f,
        n: Normal3f,
        is_front: bool,
    ) -> Self {
        DifferentialGeometry {
            p,
            uv,
            dpdu,
            dpdv,
            n,
            shape: None,
            is_front,
        }
    }
}

/// A ray travelling along `d` hits the front side when it moves against
/// the normal.
pub fn is_front_facing(n: &Normal3f, d: &Vector3f) -> bool {
    nrm_dot_vec3f(n, d) < 0.0
}
