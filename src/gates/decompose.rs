//! Decomposition of an arbitrary 2x2 unitary into primitive gates.
//!
//! The pipeline tries the cheapest representations first: a direct match
//! against a fixed-matrix gate, then angle recovery for the rotation and phase
//! gates, then an Euler-angle split for special unitaries, and finally a
//! determinant-phase peel that reduces the general case to the special one.

use crate::math::{matrix::Matrix2X2, R};

use super::{matrices, Gate, GateInfo};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DecomposedGate {
    pub gate: Gate,
    pub angle: Option<R>,
}

impl DecomposedGate {
    fn fixed(gate: Gate) -> Self {
        Self { gate, angle: None }
    }

    fn with_angle(gate: Gate, angle: R) -> Self {
        Self { gate, angle: Some(angle) }
    }
}

fn determinant_angle(unitary: &Matrix2X2) -> R {
    let det = unitary.determinant();
    det.im.atan2(det.re)
}

fn decomp_to_single_primitive_gate(
    unitary: &Matrix2X2,
    tolerance_sq: R,
) -> Option<DecomposedGate> {
    const FIXED: [(Gate, fn() -> Matrix2X2); 10] = [
        (Gate::H, matrices::h_gate),
        (Gate::X, matrices::x_gate),
        (Gate::Y, matrices::y_gate),
        (Gate::Z, matrices::z_gate),
        (Gate::S, matrices::s_gate),
        (Gate::Sdag, matrices::sdag_gate),
        (Gate::T, matrices::t_gate),
        (Gate::Tdag, matrices::tdag_gate),
        (Gate::Sx, matrices::sx_gate),
        (Gate::Sxdag, matrices::sxdag_gate),
    ];

    for (gate, matrix) in FIXED {
        if unitary.almost_eq(&matrix(), tolerance_sq) {
            return Some(DecomposedGate::fixed(gate));
        }
    }

    // the rotation gates share the feature that the angle can be recovered
    // from the arccos of the real part of m11
    let real_11 = unitary.m11.re.clamp(-1.0, 1.0);
    let theta = 2.0 * real_11.acos();

    if unitary.almost_eq(&matrices::rx_gate(theta), tolerance_sq) {
        return Some(DecomposedGate::with_angle(Gate::Rx, theta));
    }
    if unitary.almost_eq(&matrices::ry_gate(theta), tolerance_sq) {
        return Some(DecomposedGate::with_angle(Gate::Ry, theta));
    }
    if unitary.almost_eq(&matrices::rz_gate(theta), tolerance_sq) {
        return Some(DecomposedGate::with_angle(Gate::Rz, theta));
    }

    // the phase gate needs both components of m11
    let imag_11 = unitary.m11.im.clamp(-1.0, 1.0);
    let p_theta = imag_11.atan2(real_11);

    if unitary.almost_eq(&matrices::p_gate(p_theta), tolerance_sq) {
        return Some(DecomposedGate::with_angle(Gate::P, p_theta));
    }

    None
}

fn decomp_special_unitary(unitary: &Matrix2X2, tolerance_sq: R) -> Vec<DecomposedGate> {
    let abs00 = unitary.m00.norm().clamp(0.0, 1.0);

    let theta = -abs00.acos();
    let lambda = -unitary.m00.im.atan2(unitary.m00.re);
    let mu = -unitary.m01.im.atan2(unitary.m01.re);

    let mut output = Vec::new();

    if (lambda - mu).abs() > tolerance_sq {
        output.push(DecomposedGate::with_angle(Gate::Rz, lambda - mu));
    }

    if (2.0 * theta).abs() > tolerance_sq {
        output.push(DecomposedGate::with_angle(Gate::Ry, 2.0 * theta));
    }

    if (lambda + mu).abs() > tolerance_sq {
        output.push(DecomposedGate::with_angle(Gate::Rz, lambda + mu));
    }

    output
}

/// Decompose `unitary` into primitive gates, in application order: the
/// product of the emitted matrices, last emitted leftmost, reconstructs
/// `unitary` to within the tolerance.
pub(crate) fn decomp_to_primitive_gates(
    unitary: &Matrix2X2,
    tolerance_sq: R,
) -> Vec<DecomposedGate> {
    if let Some(primitive) = decomp_to_single_primitive_gate(unitary, tolerance_sq) {
        return vec![primitive];
    }

    let det_angle = determinant_angle(unitary);

    if det_angle.abs() < tolerance_sq {
        decomp_special_unitary(unitary, tolerance_sq)
    } else {
        let special_unitary = matrices::p_gate(-det_angle) * *unitary;
        let mut output = decomp_special_unitary(&special_unitary, tolerance_sq);
        output.push(DecomposedGate::with_angle(Gate::P, det_angle));

        output
    }
}

pub(crate) fn decomp_to_one_target_gates(
    target: usize,
    unitary: &Matrix2X2,
    tolerance_sq: R,
) -> Vec<GateInfo> {
    decomp_to_primitive_gates(unitary, tolerance_sq)
        .into_iter()
        .map(|primitive| match primitive.angle {
            Some(angle) => GateInfo::one_target_one_angle(primitive.gate, target, angle),
            None => GateInfo::one_target(primitive.gate, target),
        })
        .collect()
}

pub(crate) fn decomp_to_one_control_one_target_gates(
    control: usize,
    target: usize,
    unitary: &Matrix2X2,
    tolerance_sq: R,
) -> Vec<GateInfo> {
    decomp_to_primitive_gates(unitary, tolerance_sq)
        .into_iter()
        .map(|primitive| {
            let controlled = primitive
                .gate
                .controlled()
                .expect("every decomposed primitive has a controlled counterpart");
            match primitive.angle {
                Some(angle) => GateInfo::one_control_one_target_one_angle(
                    controlled, control, target, angle,
                ),
                None => GateInfo::one_control_one_target(controlled, control, target),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tolerance::COMPLEX_ALMOST_EQ_TOLERANCE_SQ;
    use crate::math::{C, PI};

    const TOL: R = COMPLEX_ALMOST_EQ_TOLERANCE_SQ;

    fn reconstruct(primitives: &[DecomposedGate]) -> Matrix2X2 {
        primitives.iter().fold(matrices::i_gate(), |acc, primitive| {
            let matrix = match primitive.angle {
                Some(angle) => matrices::angle_gate(primitive.gate, angle),
                None => matrices::non_angle_gate(primitive.gate),
            };
            // later gates are applied after earlier ones
            matrix * acc
        })
    }

    #[test]
    fn fixed_gates_decompose_to_themselves() {
        let primitives = decomp_to_primitive_gates(&matrices::h_gate(), TOL);
        assert_eq!(primitives, vec![DecomposedGate::fixed(Gate::H)]);

        let primitives = decomp_to_primitive_gates(&matrices::sxdag_gate(), TOL);
        assert_eq!(primitives, vec![DecomposedGate::fixed(Gate::Sxdag)]);
    }

    #[test]
    fn rotation_angles_are_recovered() {
        for angle in [0.1, 1.0, 2.5] {
            let primitives = decomp_to_primitive_gates(&matrices::ry_gate(angle), TOL);
            assert_eq!(primitives.len(), 1);
            assert_eq!(primitives[0].gate, Gate::Ry);
            assert!((primitives[0].angle.unwrap() - angle).abs() < 1e-6);
        }
    }

    #[test]
    fn phase_gate_is_recovered() {
        let primitives = decomp_to_primitive_gates(&matrices::p_gate(0.77), TOL);
        assert_eq!(primitives.len(), 1);
        assert_eq!(primitives[0].gate, Gate::P);
        assert!((primitives[0].angle.unwrap() - 0.77).abs() < 1e-6);
    }

    #[test]
    fn special_unitary_collapses_to_euler_rotations() {
        let unitary =
            matrices::rz_gate(0.4) * matrices::ry_gate(1.1) * matrices::rz_gate(-0.9);
        let primitives = decomp_to_primitive_gates(&unitary, TOL);

        assert!(primitives.len() <= 3);
        assert!(reconstruct(&primitives).almost_eq(&unitary, 1e-9));
    }

    #[test]
    fn general_unitary_reconstructs_with_phase_peel() {
        let unitary = matrices::p_gate(0.6) * matrices::ry_gate(0.8) * matrices::rz_gate(1.3);
        let primitives = decomp_to_primitive_gates(&unitary, TOL);

        assert!(primitives.len() <= 4);
        assert_eq!(primitives.last().unwrap().gate, Gate::P);
        assert!(reconstruct(&primitives).almost_eq(&unitary, 1e-9));
    }

    #[test]
    fn diagonal_phase_matrix_reconstructs() {
        let unitary = Matrix2X2::new(
            C::from_polar(1.0, 0.3),
            crate::math::C_ZERO,
            crate::math::C_ZERO,
            C::from_polar(1.0, -1.2),
        );
        let primitives = decomp_to_primitive_gates(&unitary, TOL);
        assert!(reconstruct(&primitives).almost_eq(&unitary, 1e-9));
    }

    #[test]
    fn controlled_decomposition_maps_tags() {
        let gates = decomp_to_one_control_one_target_gates(0, 1, &matrices::ry_gate(PI / 5.0), TOL);
        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].gate, Gate::Cry);
        assert_eq!(gates[0].control_target(), (0, 1));
    }
}
