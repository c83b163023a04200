pub(crate) use float_cmp::*;

use super::types::*;

const ULPS: i64 = 2;

/// ULP-based equality for values that should be exactly equal up to
/// floating-point noise; tolerance-based checks use `math::almost_eq`.
#[inline]
pub(crate) fn approx_cmp(x: R, y: R) -> bool {
    approx_eq!(R, x, y, ulps = ULPS)
}
