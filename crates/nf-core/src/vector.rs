//! Spatial vector helpers.
//!
//! Vectors are always stored with three components; the active dimension is
//! passed explicitly so 2D meshes simply leave the z component at zero.

use crate::numeric::Real;

pub type Vec3 = [Real; 3];

pub const ZERO: Vec3 = [0.0; 3];

#[inline]
pub fn dot(n_dim: usize, a: &Vec3, b: &Vec3) -> Real {
    (0..n_dim).map(|d| a[d] * b[d]).sum()
}

#[inline]
pub fn squared_norm(n_dim: usize, a: &Vec3) -> Real {
    dot(n_dim, a, a)
}

#[inline]
pub fn norm(n_dim: usize, a: &Vec3) -> Real {
    squared_norm(n_dim, a).sqrt()
}

/// Component-wise difference `b - a`.
#[inline]
pub fn delta(n_dim: usize, a: &Vec3, b: &Vec3) -> Vec3 {
    let mut out = ZERO;
    for d in 0..n_dim {
        out[d] = b[d] - a[d];
    }
    out
}

#[inline]
pub fn distance(n_dim: usize, a: &Vec3, b: &Vec3) -> Real {
    norm(n_dim, &delta(n_dim, a, b))
}

#[inline]
pub fn scale(n_dim: usize, a: &Vec3, s: Real) -> Vec3 {
    let mut out = ZERO;
    for d in 0..n_dim {
        out[d] = a[d] * s;
    }
    out
}

/// Split a vector into its length and unit direction.
///
/// Returns `None` for a zero-length vector.
pub fn unit(n_dim: usize, a: &Vec3) -> Option<(Real, Vec3)> {
    let len = norm(n_dim, a);
    if len > 0.0 && len.is_finite() {
        Some((len, scale(n_dim, a, 1.0 / len)))
    } else {
        None
    }
}

/// Tangential part of `v` with respect to the unit normal `n`.
pub fn tangential(n_dim: usize, v: &Vec3, n: &Vec3) -> Vec3 {
    let vn = dot(n_dim, v, n);
    let mut out = ZERO;
    for d in 0..n_dim {
        out[d] = v[d] - vn * n[d];
    }
    out
}
