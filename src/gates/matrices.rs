//! Material 2x2 matrices for the primitive gates.
//!
//! The simulators never touch these on the hot path (the kernels carry their
//! own pre-computed coefficients); they exist for decomposition, circuit
//! comparison under unitary equivalence, and the controlled-circuit builders.

use crate::math::{matrix::Matrix2X2, C, C_IMAG, C_ONE, C_ZERO, FRAC_1_SQRT_2, R};

use super::Gate;

pub fn i_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, C_ONE)
}

pub fn h_gate() -> Matrix2X2 {
    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    Matrix2X2::new(rt, rt, rt, -rt)
}

pub fn x_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ZERO, C_ONE, C_ONE, C_ZERO)
}

pub fn y_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ZERO, -C_IMAG, C_IMAG, C_ZERO)
}

pub fn z_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, -C_ONE)
}

pub fn s_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, C_IMAG)
}

pub fn sdag_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, -C_IMAG)
}

pub fn t_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, C::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2))
}

pub fn tdag_gate() -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, C::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2))
}

pub fn sx_gate() -> Matrix2X2 {
    let plus = C::new(0.5, 0.5);
    let minus = C::new(0.5, -0.5);
    Matrix2X2::new(plus, minus, minus, plus)
}

pub fn sxdag_gate() -> Matrix2X2 {
    let plus = C::new(0.5, 0.5);
    let minus = C::new(0.5, -0.5);
    Matrix2X2::new(minus, plus, plus, minus)
}

pub fn rx_gate(angle: R) -> Matrix2X2 {
    let cost = (angle / 2.0).cos();
    let sint = (angle / 2.0).sin();
    Matrix2X2::new(
        C::new(cost, 0.0),
        C::new(0.0, -sint),
        C::new(0.0, -sint),
        C::new(cost, 0.0),
    )
}

pub fn ry_gate(angle: R) -> Matrix2X2 {
    let cost = (angle / 2.0).cos();
    let sint = (angle / 2.0).sin();
    Matrix2X2::new(
        C::new(cost, 0.0),
        C::new(-sint, 0.0),
        C::new(sint, 0.0),
        C::new(cost, 0.0),
    )
}

pub fn rz_gate(angle: R) -> Matrix2X2 {
    let cost = (angle / 2.0).cos();
    let sint = (angle / 2.0).sin();
    Matrix2X2::new(
        C::new(cost, -sint),
        C_ZERO,
        C_ZERO,
        C::new(cost, sint),
    )
}

pub fn p_gate(angle: R) -> Matrix2X2 {
    Matrix2X2::new(C_ONE, C_ZERO, C_ZERO, C::new(angle.cos(), angle.sin()))
}

/// The matrix of a fixed (angle-free) transform gate, controlled or not.
///
/// Panics when handed a tag outside that category.
pub fn non_angle_gate(gate: Gate) -> Matrix2X2 {
    match gate {
        Gate::H | Gate::Ch => h_gate(),
        Gate::X | Gate::Cx => x_gate(),
        Gate::Y | Gate::Cy => y_gate(),
        Gate::Z | Gate::Cz => z_gate(),
        Gate::S | Gate::Cs => s_gate(),
        Gate::Sdag | Gate::Csdag => sdag_gate(),
        Gate::T | Gate::Ct => t_gate(),
        Gate::Tdag | Gate::Ctdag => tdag_gate(),
        Gate::Sx | Gate::Csx => sx_gate(),
        Gate::Sxdag | Gate::Csxdag => sxdag_gate(),
        _ => panic!("{:?} is not a fixed-matrix transform gate", gate),
    }
}

/// The matrix of an angle-parameterised transform gate, controlled or not.
///
/// Panics when handed a tag outside that category.
pub fn angle_gate(gate: Gate, angle: R) -> Matrix2X2 {
    match gate {
        Gate::Rx | Gate::Crx => rx_gate(angle),
        Gate::Ry | Gate::Cry => ry_gate(angle),
        Gate::Rz | Gate::Crz => rz_gate(angle),
        Gate::P | Gate::Cp => p_gate(angle),
        _ => panic!("{:?} is not an angle-parameterised transform gate", gate),
    }
}
