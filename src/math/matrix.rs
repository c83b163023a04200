use std::ops::{Add, AddAssign, Mul, MulAssign};

use super::{tolerance::*, types::*};

/// A dense 2x2 complex matrix, stored row-major.
///
/// This is the matrix type carried by the general `U`/`CU` gates and by the
/// one-qubit Kraus channels, so it only implements the small amount of algebra
/// those call sites need.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Matrix2X2 {
    pub m00: C,
    pub m01: C,
    pub m10: C,
    pub m11: C,
}

impl Matrix2X2 {
    pub const fn new(m00: C, m01: C, m10: C, m11: C) -> Self {
        Self { m00, m01, m10, m11 }
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        Self {
            m00: self.m00.conj(),
            m01: self.m10.conj(),
            m10: self.m01.conj(),
            m11: self.m11.conj(),
        }
    }

    /// Element-wise conjugate, without the transpose.
    pub(crate) fn conj(&self) -> Self {
        Self {
            m00: self.m00.conj(),
            m01: self.m01.conj(),
            m10: self.m10.conj(),
            m11: self.m11.conj(),
        }
    }

    pub fn determinant(&self) -> C {
        self.m00 * self.m11 - self.m10 * self.m01
    }

    pub fn trace(&self) -> C {
        self.m00 + self.m11
    }

    /// Frobenius norm.
    pub fn norm(&self) -> R {
        let sum = self.m00.norm_sqr()
            + self.m01.norm_sqr()
            + self.m10.norm_sqr()
            + self.m11.norm_sqr();
        sum.sqrt()
    }

    /// Matrix square root by the closed-form trace/determinant formula.
    ///
    /// Of the four square roots of a 2x2 matrix, the solution with `s = +sqrt(det)`
    /// is used unless `trace + 2s` is close enough to zero that dividing by
    /// `t = sqrt(trace + 2s)` would blow up (the negated identity is the
    /// canonical case); the sign of `s` is flipped there.
    pub fn sqrt(&self) -> Self {
        self.sqrt_with_tolerance(MATRIX_2X2_SQRT_TOLERANCE)
    }

    pub fn sqrt_with_tolerance(&self, tolerance: R) -> Self {
        let trace = self.trace();
        let determinant = self.determinant();

        let (s, t) = matrix_sqrt_parameters(trace, determinant, tolerance);

        Self {
            m00: (self.m00 + s) / t,
            m01: self.m01 / t,
            m10: self.m10 / t,
            m11: (self.m11 + s) / t,
        }
    }

    /// Near-equality of all four elements under a squared L2 tolerance.
    pub fn almost_eq(&self, other: &Self, tolerance_sq: R) -> bool {
        super::almost_eq(self.m00, other.m00, tolerance_sq)
            && super::almost_eq(self.m10, other.m10, tolerance_sq)
            && super::almost_eq(self.m01, other.m01, tolerance_sq)
            && super::almost_eq(self.m11, other.m11, tolerance_sq)
    }
}

fn matrix_sqrt_parameters(trace: C, determinant: C, tolerance: R) -> (C, C) {
    let s = determinant.sqrt();
    let t_arg = trace + 2.0 * s;

    if t_arg.norm_sqr() > tolerance {
        (s, t_arg.sqrt())
    } else {
        (-s, (trace - 2.0 * s).sqrt())
    }
}

impl Mul for Matrix2X2 {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
        }
    }
}

impl MulAssign for Matrix2X2 {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<C> for Matrix2X2 {
    type Output = Self;

    fn mul(self, scalar: C) -> Self {
        Self {
            m00: self.m00 * scalar,
            m01: self.m01 * scalar,
            m10: self.m10 * scalar,
            m11: self.m11 * scalar,
        }
    }
}

impl Mul<R> for Matrix2X2 {
    type Output = Self;

    fn mul(self, scalar: R) -> Self {
        self * C::new(scalar, 0.0)
    }
}

impl Add for Matrix2X2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            m00: self.m00 + other.m00,
            m01: self.m01 + other.m01,
            m10: self.m10 + other.m10,
            m11: self.m11 + other.m11,
        }
    }
}

impl AddAssign for Matrix2X2 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
