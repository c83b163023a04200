pub use std::f64::consts::*;

pub use self::{consts::*, types::*};

pub mod approx_cmp;
pub mod matrix;

mod consts {
    use super::types::*;

    pub const C_ONE: C = C { re: 1., im: 0. };
    pub const C_ZERO: C = C { re: 0., im: 0. };
    pub const C_IMAG: C = C { re: 0., im: 1. };
}

mod types {
    pub type N = usize;
    pub type Z = isize;

    pub type R = f64;
    pub type C = num_complex::Complex<R>;
}

/// Default tolerances shared by the validating constructors and the
/// near-equality checks. Every one of them can be overridden per call.
pub mod tolerance {
    use super::types::*;

    pub const CONSTRUCTION_NORMALIZATION_TOLERANCE: R = 1e-6;
    pub const COMPLEX_ALMOST_EQ_TOLERANCE_SQ: R = 1e-6;
    pub const MATRIX_2X2_SQRT_TOLERANCE: R = 1e-6;
    pub const DENSITY_MATRIX_TRACE_TOLERANCE: R = 1e-8;
    pub const MATRIX_HERMITIAN_TOLERANCE: R = 1e-8;
    pub const PROJECTION_NORMALIZATION_TOLERANCE: R = 1e-8;
}

#[inline]
pub fn pow_2_int(exponent: N) -> N {
    1usize << exponent
}

#[inline]
pub fn is_power_of_2(value: N) -> bool {
    value > 0 && value & (value - 1) == 0
}

/// Position of the single set bit; assumes `is_power_of_2(power)`.
#[inline]
pub fn log_2_int(power: N) -> N {
    power.trailing_zeros() as N
}

/// Reverse the lowest `n_relevant_bits` bits of `value`.
pub fn endian_flip(mut value: N, n_relevant_bits: N) -> N {
    let mut backward = 0;
    for _ in 0..n_relevant_bits {
        backward <<= 1;
        backward |= value & 1;
        value >>= 1;
    }
    backward
}

#[inline]
pub(crate) fn flat_index_to_grid_2d(i_flat: N, size1: N) -> (N, N) {
    (i_flat / size1, i_flat % size1)
}

#[inline]
pub(crate) fn flat_index_to_grid_3d(i_flat: N, size1: N, size2: N) -> (N, N, N) {
    let i0 = i_flat / (size1 * size2);
    let rest = i_flat - i0 * size1 * size2;
    (i0, rest / size2, rest % size2)
}

/// Near-equality of two complex numbers under a squared L2 tolerance.
#[inline]
pub fn almost_eq(left: C, right: C, tolerance_sq: R) -> bool {
    (left - right).norm_sqr() < tolerance_sq
}
