//! Near-equality of circuits under unitary equivalence.
//!
//! Two circuits compare equal when they act identically: loggers are skipped
//! on both sides, measurements compare by their `(qubit, bit)` pair, control
//! flow compares predicates exactly and branches recursively, and every other
//! gate is coerced to its material `U`/`CU` form so that, say, an `Rz(pi)`
//! and a `U` holding the same matrix are interchangeable.

use crate::gates::{matrices, Gate, GateInfo};
use crate::math::{matrix::Matrix2X2, N, R};

use super::{CircuitElement, ControlFlowInstruction, QuantumCircuit};

enum UForm {
    Single(N, Matrix2X2),
    Double(N, N, Matrix2X2),
}

fn material_matrix(info: &GateInfo) -> Matrix2X2 {
    if info.gate.is_non_angle_transform() {
        matrices::non_angle_gate(info.gate)
    } else if info.gate.is_angle_transform() {
        matrices::angle_gate(info.gate, info.angle())
    } else {
        *info.unitary()
    }
}

fn as_u_form(info: &GateInfo) -> UForm {
    let matrix = material_matrix(info);

    if info.gate.is_single_qubit_transform() {
        UForm::Single(info.target(), matrix)
    } else {
        let (control, target) = info.control_target();
        UForm::Double(control, target, matrix)
    }
}

fn gates_almost_eq(left: &GateInfo, right: &GateInfo, tolerance_sq: R) -> bool {
    if left.gate == Gate::M || right.gate == Gate::M {
        return left.gate == Gate::M
            && right.gate == Gate::M
            && left.qubit_bit() == right.qubit_bit();
    }

    match (as_u_form(left), as_u_form(right)) {
        (UForm::Single(left_target, left_mat), UForm::Single(right_target, right_mat)) => {
            left_target == right_target && left_mat.almost_eq(&right_mat, tolerance_sq)
        }
        (
            UForm::Double(left_control, left_target, left_mat),
            UForm::Double(right_control, right_target, right_mat),
        ) => {
            left_control == right_control
                && left_target == right_target
                && left_mat.almost_eq(&right_mat, tolerance_sq)
        }
        _ => false,
    }
}

fn control_flow_almost_eq(
    left: &ControlFlowInstruction,
    right: &ControlFlowInstruction,
    tolerance_sq: R,
) -> bool {
    match (left, right) {
        (ControlFlowInstruction::If(left_stmt), ControlFlowInstruction::If(right_stmt)) => {
            left_stmt.predicate() == right_stmt.predicate()
                && almost_eq(left_stmt.circuit(), right_stmt.circuit(), tolerance_sq)
        }
        (
            ControlFlowInstruction::IfElse(left_stmt),
            ControlFlowInstruction::IfElse(right_stmt),
        ) => {
            left_stmt.predicate() == right_stmt.predicate()
                && almost_eq(left_stmt.if_circuit(), right_stmt.if_circuit(), tolerance_sq)
                && almost_eq(left_stmt.else_circuit(), right_stmt.else_circuit(), tolerance_sq)
        }
        (ControlFlowInstruction::While(left_stmt), ControlFlowInstruction::While(right_stmt)) => {
            left_stmt.predicate() == right_stmt.predicate()
                && almost_eq(left_stmt.circuit(), right_stmt.circuit(), tolerance_sq)
        }
        _ => false,
    }
}

fn all_remaining_are_loggers(circuit: &QuantumCircuit, i_start: N) -> bool {
    circuit.elements()[i_start..].iter().all(CircuitElement::is_logger)
}

/// Compare two circuits element by element, skipping loggers.
pub fn almost_eq(left: &QuantumCircuit, right: &QuantumCircuit, tolerance_sq: R) -> bool {
    if left.n_qubits() != right.n_qubits() || left.n_bits() != right.n_bits() {
        return false;
    }

    let mut i_left = 0;
    let mut i_right = 0;

    while i_left < left.n_elements() && i_right < right.n_elements() {
        let left_element = &left.elements()[i_left];
        if left_element.is_logger() {
            i_left += 1;
            continue;
        }

        let right_element = &right.elements()[i_right];
        if right_element.is_logger() {
            i_right += 1;
            continue;
        }

        let elements_match = match (left_element, right_element) {
            (CircuitElement::Gate(left_gate), CircuitElement::Gate(right_gate)) => {
                gates_almost_eq(left_gate, right_gate, tolerance_sq)
            }
            (
                CircuitElement::ControlFlow(left_instruction),
                CircuitElement::ControlFlow(right_instruction),
            ) => control_flow_almost_eq(left_instruction, right_instruction, tolerance_sq),
            _ => false,
        };

        if !elements_match {
            return false;
        }

        i_left += 1;
        i_right += 1;
    }

    if i_left == left.n_elements() && i_right < right.n_elements() {
        return all_remaining_are_loggers(right, i_right);
    }

    if i_left < left.n_elements() && i_right == right.n_elements() {
        return all_remaining_are_loggers(left, i_left);
    }

    true
}
