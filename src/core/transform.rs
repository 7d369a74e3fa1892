//! In general, transformations make it possible to work in the most
//! convenient coordinate space. Every shape intersects rays in its own
//! local frame, and a **Transform** carries rays into that frame and
//! the resulting hit records back out of it.
//!
//! ## 4 x 4 Matrices
//!
//! The **Matrix4x4** structure provides a low-level representation of
//! 4 x 4 matrices. It is an integral part of the **Transform** class.
//! Matrices are immutable once built and are shared between transforms
//! through an `Arc`, so copying or inverting a transform never copies
//! a matrix.
//!
//! ## Transformations
//!
//! In general a transformation is a mapping from points to points and
//! from vectors to vectors. When a new **Transform** is created, it
//! defaults to the *identity transformation* - the transformation
//! that maps each point and each vector to itself.
//!
//! The inverse matrix is computed exactly once, when the transform is
//! built. The named factories below know their inverse in closed form;
//! only [Transform::new](struct.Transform.html#method.new) and
//! [Transform::from_array](struct.Transform.html#method.from_array)
//! run a general matrix inversion, and they report a singular matrix
//! as an error.
//!
//! ### Translations
//!
//! Translations only affect points, leaving vectors unchanged. The
//! inverse negates the offsets.
//!
//! ### Scaling
//!
//! We can differentiate between **uniform** scaling, where all three
//! scale factors have the same value, and **nonuniform** scaling,
//! where they may have different values. The inverse uses the
//! reciprocal factors, so none of them may be zero.
//!
//! ### X, Y, And Z Axis Rotations
//!
//! Rotation matrices are orthonormal and their inverse is their
//! transpose. Angles are given in radians.
//!
//! ### The Look-At Transformation
//!
//! The caller specifies a position, a point to look at, and an "up"
//! vector. The camera-to-world matrix is built directly from the
//! columns *right*, *view direction* and *new up* (with the position as
//! translation), and its inverse becomes the forward (world-to-camera)
//! matrix.
//!
//! ```rust
//! use rs_solartrace::core::geometry::{Point3f, Vector3f};
//! use rs_solartrace::core::transform::Transform;
//!
//! let t = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0));
//! let p = t.transform_point(&Point3f::default());
//! assert_eq!(p, Point3f::new(1.0, 2.0, 3.0));
//! let back = t.inverse().transform_point(&p);
//! assert_eq!(back, Point3f::default());
//! ```

// std
use std::fmt;
use std::ops::Mul;
use std::sync::Arc;
// solar
use crate::core::error::ConfigError;
use crate::core::geometry::{bnd3_union_pnt3f, vec3_cross_vec3};
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::DifferentialGeometry;
use crate::core::solar::{equals, Float, EPSILON};

#[derive(Debug, Copy, Clone)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Matrix4x4 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t00: Float,
        t01: Float,
        t02: Float,
        t03: Float,
        t10: Float,
        t11: Float,
        t12: Float,
        t13: Float,
        t20: Float,
        t21: Float,
        t22: Float,
        t23: Float,
        t30: Float,
        t31: Float,
        t32: Float,
        t33: Float,
    ) -> Self {
        Matrix4x4 {
            m: [
                [t00, t01, t02, t03],
                [t10, t11, t12, t13],
                [t20, t21, t22, t23],
                [t30, t31, t32, t33],
            ],
        }
    }
    pub fn transpose(m: &Matrix4x4) -> Matrix4x4 {
        Matrix4x4 {
            m: [
                [m.m[0][0], m.m[1][0], m.m[2][0], m.m[3][0]],
                [m.m[0][1], m.m[1][1], m.m[2][1], m.m[3][1]],
                [m.m[0][2], m.m[1][2], m.m[2][2], m.m[3][2]],
                [m.m[0][3], m.m[1][3], m.m[2][3], m.m[3][3]],
            ],
        }
    }
    /// Gauss-Jordan elimination with full pivoting. Returns `None` for
    /// a singular matrix.
    pub fn inverse(m: &Matrix4x4) -> Option<Matrix4x4> {
        let mut indxc: [usize; 4] = [0; 4];
        let mut indxr: [usize; 4] = [0; 4];
        let mut ipiv: [u8; 4] = [0; 4];
        let mut minv: Matrix4x4 = *m;
        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, item) in ipiv.iter().enumerate() {
                        if *item == 0 {
                            let abs: Float = (minv.m[j][k]).abs();
                            if abs >= big {
                                big = abs;
                                irow = j;
                                icol = k;
                            }
                        } else if *item > 1 {
                            return None;
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            // swap rows _irow_ and _icol_ for pivot
            if irow != icol {
                minv.m.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv.m[icol][icol] == 0.0 {
                return None;
            }
            // set $m[icol][icol]$ to one by scaling row _icol_ appropriately
            let pivinv: Float = 1.0 / minv.m[icol][icol];
            minv.m[icol][icol] = 1.0;
            for j in 0..4 {
                minv.m[icol][j] *= pivinv;
            }
            // subtract this row from others to zero out their columns
            for j in 0..4 {
                if j != icol {
                    let save: Float = minv.m[j][icol];
                    minv.m[j][icol] = 0.0;
                    for k in 0..4 {
                        minv.m[j][k] -= minv.m[icol][k] * save;
                    }
                }
            }
        }
        // swap columns to reflect permutation
        for i in 0..4 {
            let j = 3 - i;
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    minv.m[k].swap(indxr[j], indxc[j])
                }
            }
        }
        if minv.m.iter().flatten().any(|v| !v.is_finite()) {
            return None;
        }
        Some(minv)
    }
    /// Determinant of the upper-left 3x3 (linear) block.
    pub fn linear_determinant(&self) -> Float {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
    /// Element-wise comparison within [EPSILON](../solar/constant.EPSILON.html).
    pub fn approx_eq(&self, rhs: &Matrix4x4) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(rhs.m.iter().flatten())
            .all(|(a, b)| equals(*a, *b))
    }
}

impl PartialEq for Matrix4x4 {
    fn eq(&self, rhs: &Matrix4x4) -> bool {
        self.approx_eq(rhs)
    }
}

impl fmt::Display for Matrix4x4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.m.iter() {
            writeln!(f, "[ {} {} {} {} ]", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

/// The product of two matrices.
pub fn mtx_mul(m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = m1.m[i][0] * m2.m[0][j]
                + m1.m[i][1] * m2.m[1][j]
                + m1.m[i][2] * m2.m[2][j]
                + m1.m[i][3] * m2.m[3][j];
        }
    }
    r
}

#[derive(Debug, Clone)]
pub struct Transform {
    pub m: Arc<Matrix4x4>,
    pub m_inv: Arc<Matrix4x4>,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    /// Builds a transform from 16 coefficients given in row-major order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t00: Float,
        t01: Float,
        t02: Float,
        t03: Float,
        t10: Float,
        t11: Float,
        t12: Float,
        t13: Float,
        t20: Float,
        t21: Float,
        t22: Float,
        t23: Float,
        t30: Float,
        t31: Float,
        t32: Float,
        t33: Float,
    ) -> Result<Transform, ConfigError> {
        let m: Matrix4x4 = Matrix4x4::new(
            t00, t01, t02, t03, t10, t11, t12, t13, t20, t21, t22, t23, t30, t31, t32, t33,
        );
        Transform::from_matrix(m)
    }
    pub fn from_array(m: [[Float; 4]; 4]) -> Result<Transform, ConfigError> {
        Transform::from_matrix(Matrix4x4 { m })
    }
    pub fn from_matrix(m: Matrix4x4) -> Result<Transform, ConfigError> {
        let m_inv: Matrix4x4 = Matrix4x4::inverse(&m).ok_or(ConfigError::SingularMatrix)?;
        Ok(Transform::from_parts(m, m_inv))
    }
    /// Pairs a matrix with its known inverse. Nothing is checked, the
    /// caller guarantees that `m_inv` is the inverse of `m`.
    pub fn from_parts(m: Matrix4x4, m_inv: Matrix4x4) -> Transform {
        Transform {
            m: Arc::new(m),
            m_inv: Arc::new(m_inv),
        }
    }
    pub fn identity() -> Transform {
        let m: Arc<Matrix4x4> = Arc::new(Matrix4x4::default());
        Transform {
            m: m.clone(),
            m_inv: m,
        }
    }
    /// Swaps the two shared matrices.
    pub fn inverse(&self) -> Transform {
        Transform {
            m: self.m_inv.clone(),
            m_inv: self.m.clone(),
        }
    }
    /// True if the transform changes a left-handed coordinate system
    /// into a right-handed one, or vice versa.
    pub fn swaps_handedness(&self) -> bool {
        self.m.linear_determinant() < 0.0 as Float
    }
    pub fn translate(delta: &Vector3f) -> Transform {
        Transform::from_parts(
            Matrix4x4::new(
                1.0, 0.0, 0.0, delta.x, 0.0, 1.0, 0.0, delta.y, 0.0, 0.0, 1.0, delta.z, 0.0, 0.0,
                0.0, 1.0,
            ),
            Matrix4x4::new(
                1.0, 0.0, 0.0, -delta.x, 0.0, 1.0, 0.0, -delta.y, 0.0, 0.0, 1.0, -delta.z, 0.0,
                0.0, 0.0, 1.0,
            ),
        )
    }
    /// Scale factors must be non-zero.
    pub fn scale(x: Float, y: Float, z: Float) -> Transform {
        debug_assert!(x != 0.0 && y != 0.0 && z != 0.0, "zero scale factor");
        Transform::from_parts(
            Matrix4x4::new(
                x, 0.0, 0.0, 0.0, 0.0, y, 0.0, 0.0, 0.0, 0.0, z, 0.0, 0.0, 0.0, 0.0, 1.0,
            ),
            Matrix4x4::new(
                1.0 / x,
                0.0,
                0.0,
                0.0,
                0.0,
                1.0 / y,
                0.0,
                0.0,
                0.0,
                0.0,
                1.0 / z,
                0.0,
                0.0,
                0.0,
                0.0,
                1.0,
            ),
        )
    }
    pub fn rotate_x(theta: Float) -> Transform {
        let sin_theta: Float = theta.sin();
        let cos_theta: Float = theta.cos();
        let m = Matrix4x4::new(
            1.0, 0.0, 0.0, 0.0, 0.0, cos_theta, -sin_theta, 0.0, 0.0, sin_theta, cos_theta, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Transform::from_parts(m, Matrix4x4::transpose(&m))
    }
    pub fn rotate_y(theta: Float) -> Transform {
        let sin_theta: Float = theta.sin();
        let cos_theta: Float = theta.cos();
        let m = Matrix4x4::new(
            cos_theta, 0.0, sin_theta, 0.0, 0.0, 1.0, 0.0, 0.0, -sin_theta, 0.0, cos_theta, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Transform::from_parts(m, Matrix4x4::transpose(&m))
    }
    pub fn rotate_z(theta: Float) -> Transform {
        let sin_theta: Float = theta.sin();
        let cos_theta: Float = theta.cos();
        let m = Matrix4x4::new(
            cos_theta, -sin_theta, 0.0, 0.0, sin_theta, cos_theta, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Transform::from_parts(m, Matrix4x4::transpose(&m))
    }
    /// Rotation by `theta` radians around an arbitrary (non-zero) axis.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Transform {
        let a: Vector3f = axis.normalize();
        let sin_theta: Float = theta.sin();
        let cos_theta: Float = theta.cos();
        let mut m = Matrix4x4::default();
        // compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        m.m[0][3] = 0.0;
        // compute rotations of second basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        m.m[1][3] = 0.0;
        // compute rotations of third basis vectors
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
        m.m[2][3] = 0.0;
        Transform::from_parts(m, Matrix4x4::transpose(&m))
    }
    /// World-to-camera transform for a camera at `pos` looking at
    /// `look`. In camera space the view direction is +y and the new up
    /// vector is +z.
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Result<Transform, ConfigError> {
        let dir: Vector3f = (*look - *pos).normalize();
        let cross: Vector3f = vec3_cross_vec3(&dir, &up.normalize());
        if cross.length() < EPSILON || dir.has_nans() {
            return Err(ConfigError::DegenerateLookAt {
                up: [up.x, up.y, up.z],
                dir: [dir.x, dir.y, dir.z],
            });
        }
        let right: Vector3f = cross.normalize();
        let new_up: Vector3f = vec3_cross_vec3(&right, &dir);
        let camera_to_world: Matrix4x4 = Matrix4x4::new(
            right.x, dir.x, new_up.x, pos.x, right.y, dir.y, new_up.y, pos.y, right.z, dir.z,
            new_up.z, pos.z, 0.0, 0.0, 0.0, 1.0,
        );
        // orthonormal rotation: inverse is the transpose, the position
        // is carried back through it
        let mut world_to_camera: Matrix4x4 = Matrix4x4::transpose(&camera_to_world);
        for i in 0..3 {
            world_to_camera.m[3][i] = 0.0;
            world_to_camera.m[i][3] = -(world_to_camera.m[i][0] * pos.x
                + world_to_camera.m[i][1] * pos.y
                + world_to_camera.m[i][2] * pos.z);
        }
        Ok(Transform::from_parts(world_to_camera, camera_to_world))
    }
    /// Applies the affine 3x4 block (the projective row is ignored).
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let x: Float = p.x;
        let y: Float = p.y;
        let z: Float = p.z;
        let m = &self.m.m;
        Point3f {
            x: m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3],
            y: m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3],
            z: m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3],
        }
    }
    /// Applies the full 4x4 matrix followed by the homogeneous divide.
    pub fn project_point(&self, p: &Point3f) -> Option<Point3f> {
        let m = &self.m.m;
        let wp: Float = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];
        if wp == 0.0 as Float {
            return None;
        }
        let xyz: Point3f = self.transform_point(p);
        Some(Point3f {
            x: xyz.x / wp,
            y: xyz.y / wp,
            z: xyz.z / wp,
        })
    }
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let x: Float = v.x;
        let y: Float = v.y;
        let z: Float = v.z;
        let m = &self.m.m;
        Vector3f {
            x: m[0][0] * x + m[0][1] * y + m[0][2] * z,
            y: m[1][0] * x + m[1][1] * y + m[1][2] * z,
            z: m[2][0] * x + m[2][1] * y + m[2][2] * z,
        }
    }
    /// Normals are transformed by the transpose of the inverse matrix.
    pub fn transform_normal(&self, n: &Normal3f) -> Normal3f {
        let x: Float = n.x;
        let y: Float = n.y;
        let z: Float = n.z;
        let m_inv = &self.m_inv.m;
        Normal3f {
            x: m_inv[0][0] * x + m_inv[1][0] * y + m_inv[2][0] * z,
            y: m_inv[0][1] * x + m_inv[1][1] * y + m_inv[2][1] * z,
            z: m_inv[0][2] * x + m_inv[1][2] * y + m_inv[2][2] * z,
        }
    }
    /// Same as `self.inverse().transform_normal(n)`.
    pub fn transform_inverse_normal(&self, n: &Normal3f) -> Normal3f {
        let x: Float = n.x;
        let y: Float = n.y;
        let z: Float = n.z;
        let m = &self.m.m;
        Normal3f {
            x: m[0][0] * x + m[1][0] * y + m[2][0] * z,
            y: m[0][1] * x + m[1][1] * y + m[2][1] * z,
            z: m[0][2] * x + m[1][2] * y + m[2][2] * z,
        }
    }
    pub fn transform_ray(&self, r: &Ray) -> Ray {
        Ray::with_interval(
            self.transform_point(&r.o),
            self.transform_vector(r.direction()),
            r.t_min.get(),
            r.t_max.get(),
        )
    }
    /// Maps a ray with the inverse matrix, e.g. from world space into
    /// the local frame of a shape.
    pub fn transform_ray_inverse(&self, r: &Ray) -> Ray {
        self.inverse().transform_ray(r)
    }
    /// Transforms the eight corners and encloses them again. The result
    /// is not minimal for rotated boxes.
    pub fn transform_bounds(&self, b: &Bounds3f) -> Bounds3f {
        let mut ret: Bounds3f = Bounds3f::default();
        for corner in 0..8_u8 {
            ret = bnd3_union_pnt3f(&ret, &self.transform_point(&b.corner(corner)));
        }
        ret
    }
    pub fn transform_differential_geometry(&self, dg: &DifferentialGeometry) -> DifferentialGeometry {
        let n: Normal3f = self.transform_normal(&dg.n);
        DifferentialGeometry {
            p: self.transform_point(&dg.p),
            uv: dg.uv,
            dpdu: self.transform_vector(&dg.dpdu),
            dpdv: self.transform_vector(&dg.dpdv),
            n: if n.length_squared() > 0.0 { n.normalize() } else { n },
            shape: dg.shape,
            is_front: dg.is_front,
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, rhs: &Transform) -> bool {
        self.m.approx_eq(&rhs.m)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.m)
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;
    fn mul(self, rhs: &'b Transform) -> Transform {
        Transform::from_parts(mtx_mul(&self.m, &rhs.m), mtx_mul(&rhs.m_inv, &self.m_inv))
    }
}
