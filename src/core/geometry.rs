//! Almost all nontrivial graphics programs are built on a foundation
//! of geometric classes. These classes represent mathematical
//! constructs like points, vectors, and rays.
//!
//! # Points
//!
//! A **point** is a zero-dimensional location in 2D or 3D space.
//! Although the same representation is used for vectors, the fact that
//! a point represents a position whereas a vector represents a
//! direction leads to a number of important differences in how they
//! are treated, most visibly under a
//! [Transform](../transform/struct.Transform.html).
//!
//! # Normals
//!
//! A surface **normal** is a vector that is perpendicular to a surface
//! at a particular position. Normals behave differently than vectors
//! when transformed by non-uniform scales or shears, which is why they
//! get their own type.
//!
//! # Rays
//!
//! A **ray** is a line segment specified by its origin, its direction
//! and the parametric interval `[t_min, t_max]` along which hits are
//! accepted. The reciprocal of the direction is cached for slab tests
//! against bounding boxes, so the direction can only be changed with
//! [set_direction](struct.Ray.html#method.set_direction).
//!
//! ```rust
//! use rs_solartrace::core::geometry::{Point3f, Ray, Vector3f};
//!
//! let ray = Ray::new(
//!     Point3f::new(0.0, 0.0, 5.0),
//!     Vector3f::new(0.0, 0.0, -1.0),
//! );
//! let p = ray.position(5.0);
//! assert_eq!(p.z, 0.0);
//! ```
//!
//! # Bounding Boxes
//!
//! The **Bounds2f** and **Bounds3f** classes represent axis-aligned
//! regions. A default bounding box is *empty* (its minimum is larger
//! than its maximum), so that the first point added to it becomes its
//! only content.

// std
use std::cell::Cell;
use std::fmt;
use std::ops;
use std::ops::{Index, IndexMut};
// others
use strum_macros::EnumIter;
// solar
use crate::core::solar::{equals, Float, EPSILON, INFINITY};

#[derive(EnumIter, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum XYZEnum {
    X = 0,
    Y = 1,
    Z = 2,
}

// Vector3f

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Vector3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3f { x, y, z }
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
    pub fn abs(&self) -> Vector3f {
        Vector3f {
            x: self.x.abs(),
            y: self.y.abs(),
            z: self.z.abs(),
        }
    }
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new vector pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Vector3f {
        *self / self.length()
    }
    /// Component-wise comparison within the kernel tolerance.
    pub fn approx_eq(&self, v: &Vector3f) -> bool {
        equals(self.x, v.x) && equals(self.y, v.y) && equals(self.z, v.z)
    }
}

impl Index<XYZEnum> for Vector3f {
    type Output = Float;
    fn index(&self, index: XYZEnum) -> &Float {
        match index {
            XYZEnum::X => &self.x,
            XYZEnum::Y => &self.y,
            _ => &self.z,
        }
    }
}

impl IndexMut<XYZEnum> for Vector3f {
    fn index_mut(&mut self, index: XYZEnum) -> &mut Float {
        match index {
            XYZEnum::X => &mut self.x,
            XYZEnum::Y => &mut self.y,
            _ => &mut self.z,
        }
    }
}

impl From<Point3f> for Vector3f {
    fn from(p: Point3f) -> Self {
        Vector3f {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<Normal3f> for Vector3f {
    fn from(n: Normal3f) -> Self {
        Vector3f {
            x: n.x,
            y: n.y,
            z: n.z,
        }
    }
}

impl_op!(-|a: Vector3f| -> Vector3f {
    Vector3f {
        x: -a.x,
        y: -a.y,
        z: -a.z,
    }
});

impl_op_ex!(+|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex_commutative!(*|a: &Vector3f, b: Float| -> Vector3f {
    Vector3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

impl_op_ex!(/|a: &Vector3f, b: Float| -> Vector3f {
    assert_ne!(b, 0.0 as Float);
    let inv: Float = 1.0 as Float / b;
    Vector3f {
        x: a.x * inv,
        y: a.y * inv,
        z: a.z * inv,
    }
});

impl_op!(+= |a: &mut Vector3f, b: Vector3f| {
    a.x += b.x;
    a.y += b.y;
    a.z += b.z;
});

impl_op!(*= |a: &mut Vector3f, b: Float| {
    a.x *= b;
    a.y *= b;
    a.z *= b;
});

/// Product of the Euclidean magnitudes of the two vectors and the
/// cosine of the angle between them.
pub fn vec3_dot_vec3f(v1: &Vector3f, v2: &Vector3f) -> Float {
    v1.x * v2.x + v1.y * v2.y + v1.z * v2.z
}

/// Given two vectors in 3D, the cross product is a vector that is
/// perpendicular to both of them.
pub fn vec3_cross_vec3(v1: &Vector3f, v2: &Vector3f) -> Vector3f {
    let v1x: Float = v1.x;
    let v1y: Float = v1.y;
    let v1z: Float = v1.z;
    let v2x: Float = v2.x;
    let v2y: Float = v2.y;
    let v2z: Float = v2.z;
    Vector3f {
        x: (v1y * v2z) - (v1z * v2y),
        y: (v1z * v2x) - (v1x * v2z),
        z: (v1x * v2y) - (v1y * v2x),
    }
}

// Point3f

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Point3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Point3f { x, y, z }
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
    pub fn approx_eq(&self, p: &Point3f) -> bool {
        equals(self.x, p.x) && equals(self.y, p.y) && equals(self.z, p.z)
    }
}

impl fmt::Display for Point3f {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Index<XYZEnum> for Point3f {
    type Output = Float;
    fn index(&self, index: XYZEnum) -> &Float {
        match index {
            XYZEnum::X => &self.x,
            XYZEnum::Y => &self.y,
            _ => &self.z,
        }
    }
}

impl IndexMut<XYZEnum> for Point3f {
    fn index_mut(&mut self, index: XYZEnum) -> &mut Float {
        match index {
            XYZEnum::X => &mut self.x,
            XYZEnum::Y => &mut self.y,
            _ => &mut self.z,
        }
    }
}

impl_op_ex!(+|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Point3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op!(+= |a: &mut Point3f, b: Vector3f| {
    a.x += b.x;
    a.y += b.y;
    a.z += b.z;
});

/// Linear interpolation between two points.
pub fn pnt3_lerp(t: Float, p0: &Point3f, p1: &Point3f) -> Point3f {
    *p0 + (*p1 - *p0) * t
}

// Normal3f

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Normal3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Normal3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Normal3f { x, y, z }
    }
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new normal pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Normal3f {
        let len: Float = self.length();
        assert_ne!(len, 0.0 as Float);
        Normal3f {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }
    pub fn approx_eq(&self, n: &Normal3f) -> bool {
        equals(self.x, n.x) && equals(self.y, n.y) && equals(self.z, n.z)
    }
}

impl From<Vector3f> for Normal3f {
    fn from(v: Vector3f) -> Self {
        Normal3f {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl_op_ex_commutative!(*|a: &Normal3f, b: Float| -> Normal3f {
    Normal3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

pub fn nrm_dot_vec3f(n1: &Normal3f, v2: &Vector3f) -> Float {
    n1.x * v2.x + n1.y * v2.y + n1.z * v2.z
}

// Point2f

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

impl Point2f {
    pub fn new(x: Float, y: Float) -> Self {
        Point2f { x, y }
    }
}

// Bounds2f

/// Axis-aligned rectangle, used for surface extents and sun apertures.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds2f {
    pub p_min: Point2f,
    pub p_max: Point2f,
}

impl Default for Bounds2f {
    fn default() -> Self {
        Bounds2f {
            p_min: Point2f {
                x: Float::MAX,
                y: Float::MAX,
            },
            p_max: Point2f {
                x: Float::MIN,
                y: Float::MIN,
            },
        }
    }
}

impl Bounds2f {
    pub fn new(p1: Point2f, p2: Point2f) -> Self {
        Bounds2f {
            p_min: Point2f {
                x: p1.x.min(p2.x),
                y: p1.y.min(p2.y),
            },
            p_max: Point2f {
                x: p1.x.max(p2.x),
                y: p1.y.max(p2.y),
            },
        }
    }
    pub fn width(&self) -> Float {
        self.p_max.x - self.p_min.x
    }
    pub fn height(&self) -> Float {
        self.p_max.y - self.p_min.y
    }
    pub fn area(&self) -> Float {
        self.width() * self.height()
    }
    /// A usable extent has finite, strictly positive width and height.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
            || !self.width().is_finite()
            || !self.height().is_finite()
    }
}

// Bounds3f

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    fn default() -> Bounds3f {
        let min_num: Float = Float::MIN;
        let max_num: Float = Float::MAX;
        Bounds3f {
            p_min: Point3f {
                x: max_num,
                y: max_num,
                z: max_num,
            },
            p_max: Point3f {
                x: min_num,
                y: min_num,
                z: min_num,
            },
        }
    }
}

impl Bounds3f {
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        let p_min: Point3f = Point3f {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            z: p1.z.min(p2.z),
        };
        let p_max: Point3f = Point3f {
            x: p1.x.max(p2.x),
            y: p1.y.max(p2.y),
            z: p1.z.max(p2.z),
        };
        Bounds3f { p_min, p_max }
    }
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }
    pub fn corner(&self, corner: u8) -> Point3f {
        assert!(corner < 8_u8);
        let x: Float = if corner & 1 == 0 {
            self.p_min.x
        } else {
            self.p_max.x
        };
        let y: Float = if corner & 2 == 0 {
            self.p_min.y
        } else {
            self.p_max.y
        };
        let z: Float = if corner & 4 == 0 {
            self.p_min.z
        } else {
            self.p_max.z
        };
        Point3f { x, y, z }
    }
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }
    pub fn center(&self) -> Point3f {
        pnt3_lerp(0.5, &self.p_min, &self.p_max)
    }
    /// Slab test using the cached reciprocal direction of the ray.
    /// Returns the parametric range overlapping the ray's own interval.
    pub fn intersect_b(&self, ray: &Ray) -> Option<(Float, Float)> {
        let mut t0: Float = ray.t_min.get();
        let mut t1: Float = ray.t_max.get();
        let inv_dir: &Vector3f = ray.inv_direction();
        for i in [XYZEnum::X, XYZEnum::Y, XYZEnum::Z].iter() {
            // update interval for _i_th bounding box slab
            let mut t_near: Float = (self.p_min[*i] - ray.o[*i]) * inv_dir[*i];
            let mut t_far: Float = (self.p_max[*i] - ray.o[*i]) * inv_dir[*i];
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            // a zero direction component yields NaN for points on the slab
            if t_near.is_nan() || t_far.is_nan() {
                continue;
            }
            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

/// Grow a bounding box so it contains the given point.
pub fn bnd3_union_pnt3f(b: &Bounds3f, p: &Point3f) -> Bounds3f {
    let p_min: Point3f = Point3f {
        x: b.p_min.x.min(p.x),
        y: b.p_min.y.min(p.y),
        z: b.p_min.z.min(p.z),
    };
    let p_max: Point3f = Point3f {
        x: b.p_max.x.max(p.x),
        y: b.p_max.y.max(p.y),
        z: b.p_max.z.max(p.z),
    };
    Bounds3f { p_min, p_max }
}

/// Is a 3D point inside a 3D bound?
pub fn pnt3_inside_bnd3(p: &Point3f, b: &Bounds3f) -> bool {
    p.x >= b.p_min.x
        && p.x <= b.p_max.x
        && p.y >= b.p_min.y
        && p.y <= b.p_max.y
        && p.z >= b.p_min.z
        && p.z <= b.p_max.z
}

// Ray

#[derive(Debug, Clone)]
pub struct Ray {
    /// origin
    pub o: Point3f,
    /// direction
    d: Vector3f,
    /// per-axis reciprocal of the direction
    inv_d: Vector3f,
    /// limits the ray to a segment along its infinite extent
    pub t_min: Cell<Float>,
    pub t_max: Cell<Float>,
}

impl Default for Ray {
    fn default() -> Self {
        Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0))
    }
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Ray::with_interval(o, d, EPSILON, INFINITY)
    }
    pub fn with_interval(o: Point3f, d: Vector3f, t_min: Float, t_max: Float) -> Self {
        let mut ray = Ray {
            o,
            d,
            inv_d: Vector3f::default(),
            t_min: Cell::new(t_min),
            t_max: Cell::new(t_max),
        };
        ray.set_direction(d);
        ray
    }
    pub fn position(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
    pub fn direction(&self) -> &Vector3f {
        &self.d
    }
    pub fn inv_direction(&self) -> &Vector3f {
        &self.inv_d
    }
    /// Replaces the direction and its cached reciprocal together.
    pub fn set_direction(&mut self, d: Vector3f) {
        self.d = d;
        self.inv_d = Vector3f {
            x: 1.0 as Float / d.x,
            y: 1.0 as Float / d.y,
            z: 1.0 as Float / d.z,
        };
    }
    /// Is the parameter _t_ inside the valid interval?
    pub fn in_range(&self, t: Float) -> bool {
        t >= self.t_min.get() && t <= self.t_max.get()
    }
}

impl PartialEq for Ray {
    fn eq(&self, rhs: &Ray) -> bool {
        self.o.approx_eq(&rhs.o)
            && self.d.approx_eq(&rhs.d)
            && equals(self.t_min.get(), rhs.t_min.get())
            && (self.t_max.get() == rhs.t_max.get() || equals(self.t_max.get(), rhs.t_max.get()))
    }
}
