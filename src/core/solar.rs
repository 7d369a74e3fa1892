//! Type definition of Float, otherwise constants and functions which
//! can be used almost everywhere else in the code.

// std
use std::ops::{Add, Mul, Sub};

pub type Float = f64;

/// Tolerance shared by the geometric kernel (ray start, equality
/// tests, parallel-ray detection).
pub const EPSILON: Float = 1.0e-6;
pub const INFINITY: Float = std::f64::INFINITY;
pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * std::f64::consts::PI;

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Interpolate linearly between two provided values.
pub fn lerp<S, T>(t: S, a: T, b: T) -> T
where
    S: num::One,
    S: Sub<S, Output = S>,
    S: Copy,
    T: Add<T, Output = T>,
    T: Mul<S, Output = T>,
{
    let one: S = num::One::one();
    a * (one - t) + b * t
}

/// Compares two values within [EPSILON](constant.EPSILON.html).
pub fn equals(a: Float, b: Float) -> bool {
    (a - b).abs() < EPSILON
}

/// Convert from angles expressed in degrees to radians.
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert from angles expressed in radians to degrees.
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}

/// Find solution(s) of the quadratic equation at<sup>2</sup> + bt + c
/// = 0. The roots are returned in ascending order.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    // find quadratic discriminant
    let discrim: Float = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim: Float = discrim.sqrt();
    // compute quadratic _t_ values
    let q: Float = if b < 0.0 {
        -0.5 * (b - root_discrim)
    } else {
        -0.5 * (b + root_discrim)
    };
    if q == 0.0 {
        // b == 0 and c == 0: double root at the origin
        return Some((0.0, 0.0));
    }
    let mut t0: Float = q / a;
    let mut t1: Float = c / q;
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}
