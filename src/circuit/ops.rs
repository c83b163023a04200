//! Whole-circuit operations: concatenation, transpilation to primitive
//! gates, and the controlled-circuit builders.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::gates::compose::apply_multiplicity_controlled_u_gate;
use crate::gates::decompose::{decomp_to_one_control_one_target_gates, decomp_to_one_target_gates};
use crate::gates::{compose::apply_doubly_controlled_gate, matrices, Gate, GateInfo};
use crate::math::{matrix::Matrix2X2, N, R};

use super::{CircuitElement, ControlFlowInstruction, QuantumCircuit};

fn check_same_shape(left: &QuantumCircuit, right: &QuantumCircuit) -> Result<()> {
    if left.n_qubits() != right.n_qubits() || left.n_bits() != right.n_bits() {
        return Err(Error::InvalidCircuitState(format!(
            "cannot concatenate circuits of shape ({}, {}) and ({}, {})",
            left.n_qubits(),
            left.n_bits(),
            right.n_qubits(),
            right.n_bits()
        )));
    }

    Ok(())
}

/// Append deep copies of `right`'s elements onto `left`.
pub fn extend_circuit(left: &mut QuantumCircuit, right: &QuantumCircuit) -> Result<()> {
    check_same_shape(left, right)?;

    for element in right {
        left.push_element(element.clone());
    }

    Ok(())
}

/// `left` followed by `right`, as a new circuit.
pub fn append_circuits(mut left: QuantumCircuit, right: &QuantumCircuit) -> Result<QuantumCircuit> {
    extend_circuit(&mut left, right)?;
    Ok(left)
}

/// Rewrite every `U`/`CU` element as primitive gates through the 2x2
/// decomposition pipeline; control-flow subcircuits are transpiled
/// recursively and all other elements are copied through.
pub fn transpile_to_primitive(circuit: &QuantumCircuit, tolerance_sq: R) -> Result<QuantumCircuit> {
    let mut output = QuantumCircuit::with_bits(circuit.n_qubits(), circuit.n_bits());

    for element in circuit {
        match element {
            CircuitElement::Gate(info) if info.gate == Gate::U => {
                for gate in decomp_to_one_target_gates(info.target(), info.unitary(), tolerance_sq)
                {
                    output.push_gate(gate);
                }
            }
            CircuitElement::Gate(info) if info.gate == Gate::Cu => {
                let (control, target) = info.control_target();
                for gate in decomp_to_one_control_one_target_gates(
                    control,
                    target,
                    info.unitary(),
                    tolerance_sq,
                ) {
                    output.push_gate(gate);
                }
            }
            CircuitElement::ControlFlow(instruction) => {
                let transpiled = match instruction {
                    ControlFlowInstruction::If(statement) => ControlFlowInstruction::If(
                        super::ClassicalIfStatement::new(
                            statement.predicate().clone(),
                            transpile_to_primitive(statement.circuit(), tolerance_sq)?,
                        ),
                    ),
                    ControlFlowInstruction::IfElse(statement) => ControlFlowInstruction::IfElse(
                        super::ClassicalIfElseStatement::new(
                            statement.predicate().clone(),
                            transpile_to_primitive(statement.if_circuit(), tolerance_sq)?,
                            transpile_to_primitive(statement.else_circuit(), tolerance_sq)?,
                        ),
                    ),
                    ControlFlowInstruction::While(statement) => ControlFlowInstruction::While(
                        super::ClassicalWhileStatement::new(
                            statement.predicate().clone(),
                            transpile_to_primitive(statement.circuit(), tolerance_sq)?,
                        ),
                    ),
                };
                output.push_element(CircuitElement::ControlFlow(transpiled));
            }
            other => output.push_element(other.clone()),
        }
    }

    Ok(output)
}

fn check_all_indices_are_unique(indices: &[N]) -> Result<()> {
    let mut seen = HashSet::new();
    for &index in indices {
        if !seen.insert(index) {
            return Err(Error::InvalidQubitMapping(
                "the new qubit indices must be unique".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_valid_number_of_mapped_indices(
    mapped_qubits: &[N],
    subcircuit: &QuantumCircuit,
) -> Result<()> {
    if mapped_qubits.len() != subcircuit.n_qubits() {
        return Err(Error::InvalidQubitMapping(format!(
            "{} mapped indices provided for a subcircuit with {} qubits",
            mapped_qubits.len(),
            subcircuit.n_qubits()
        )));
    }

    Ok(())
}

fn check_no_overlap(mapped_qubits: &[N], control_qubits: &[N]) -> Result<()> {
    let control_set: HashSet<N> = control_qubits.iter().copied().collect();

    for mapped_qubit in mapped_qubits {
        if control_set.contains(mapped_qubit) {
            return Err(Error::InvalidQubitMapping(
                "control qubits cannot overlap with the mapped qubits".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_new_indices_fit(
    mapped_qubits: &[N],
    control_qubits: &[N],
    n_qubits_on_new_circuit: N,
) -> Result<()> {
    if mapped_qubits.len() + control_qubits.len() > n_qubits_on_new_circuit {
        return Err(Error::InvalidQubitMapping(
            "the mapped and control qubits do not fit onto the new circuit".to_string(),
        ));
    }

    for &index in control_qubits.iter().chain(mapped_qubits) {
        if index >= n_qubits_on_new_circuit {
            return Err(Error::OutOfRangeQubit { index, n_qubits: n_qubits_on_new_circuit });
        }
    }

    Ok(())
}

fn material_gate_matrix(info: &GateInfo) -> Matrix2X2 {
    if info.gate.is_non_angle_transform() {
        matrices::non_angle_gate(info.gate)
    } else if info.gate.is_angle_transform() {
        matrices::angle_gate(info.gate, info.angle())
    } else {
        *info.unitary()
    }
}

/// Promote `subcircuit` to a version controlled on one fresh qubit.
///
/// Every unitary element maps through the uncontrolled-to-controlled table
/// (already-controlled gates become doubly controlled via the Toffoli-style
/// ladder); loggers are copied through; measurements and classical control
/// flow cannot be promoted and are fatal. `mapped_qubits[i]` names the new
/// index of the subcircuit's qubit `i`.
pub fn make_controlled_circuit(
    subcircuit: &QuantumCircuit,
    n_new_qubits: N,
    control: N,
    mapped_qubits: &[N],
) -> Result<QuantumCircuit> {
    check_valid_number_of_mapped_indices(mapped_qubits, subcircuit)?;
    check_all_indices_are_unique(mapped_qubits)?;
    check_no_overlap(mapped_qubits, &[control])?;
    check_new_indices_fit(mapped_qubits, &[control], n_new_qubits)?;

    let mut new_circuit = QuantumCircuit::new(n_new_qubits);

    for element in subcircuit {
        let info = match element {
            CircuitElement::ControlFlow(_) => {
                return Err(Error::NonControllableElement("a classical control flow statement"));
            }
            CircuitElement::Logger(logger) => {
                new_circuit.add_circuit_logger(logger.clone());
                continue;
            }
            CircuitElement::Gate(info) => info,
        };

        if info.gate == Gate::M {
            return Err(Error::NonControllableElement("a measurement gate"));
        }

        if info.gate.is_single_qubit_transform() {
            let new_target = mapped_qubits[info.target()];

            if info.gate == Gate::U {
                new_circuit.add_cu_gate(*info.unitary(), control, new_target)?;
            } else {
                let controlled = info
                    .gate
                    .controlled()
                    .expect("every uncontrolled transform gate has a controlled counterpart");

                if info.gate.is_angle_transform() {
                    new_circuit.push_gate(GateInfo::one_control_one_target_one_angle(
                        controlled,
                        control,
                        new_target,
                        info.angle(),
                    ));
                } else {
                    new_circuit.push_gate(GateInfo::one_control_one_target(
                        controlled, control, new_target,
                    ));
                }
            }
        } else {
            let (original_control, original_target) = info.control_target();
            let new_control = mapped_qubits[original_control];
            let new_target = mapped_qubits[original_target];
            let matrix = material_gate_matrix(info);

            apply_doubly_controlled_gate(
                &mut new_circuit,
                &matrix,
                (control, new_control),
                new_target,
            )?;
        }
    }

    Ok(new_circuit)
}

/// Promote `subcircuit` to a version controlled on every qubit in
/// `control_qubits`, through the recursive sqrt-U ladder.
pub fn make_multiplicity_controlled_circuit(
    subcircuit: &QuantumCircuit,
    n_new_qubits: N,
    control_qubits: &[N],
    mapped_qubits: &[N],
) -> Result<QuantumCircuit> {
    if control_qubits.len() == 1 {
        return make_controlled_circuit(subcircuit, n_new_qubits, control_qubits[0], mapped_qubits);
    }

    check_valid_number_of_mapped_indices(mapped_qubits, subcircuit)?;
    check_all_indices_are_unique(mapped_qubits)?;
    check_all_indices_are_unique(control_qubits)?;
    check_no_overlap(mapped_qubits, control_qubits)?;
    check_new_indices_fit(mapped_qubits, control_qubits, n_new_qubits)?;

    let mut new_circuit = QuantumCircuit::new(n_new_qubits);

    for element in subcircuit {
        let info = match element {
            CircuitElement::ControlFlow(_) => {
                return Err(Error::NonControllableElement("a classical control flow statement"));
            }
            CircuitElement::Logger(logger) => {
                new_circuit.add_circuit_logger(logger.clone());
                continue;
            }
            CircuitElement::Gate(info) => info,
        };

        if info.gate == Gate::M {
            return Err(Error::NonControllableElement("a measurement gate"));
        }

        let matrix = material_gate_matrix(info);

        if info.gate.is_single_qubit_transform() {
            let new_target = mapped_qubits[info.target()];
            apply_multiplicity_controlled_u_gate(
                &mut new_circuit,
                &matrix,
                new_target,
                control_qubits,
            )?;
        } else {
            let (original_control, original_target) = info.control_target();
            let new_control = mapped_qubits[original_control];
            let new_target = mapped_qubits[original_target];

            let mut new_controls = control_qubits.to_vec();
            new_controls.push(new_control);

            apply_multiplicity_controlled_u_gate(
                &mut new_circuit,
                &matrix,
                new_target,
                &new_controls,
            )?;
        }
    }

    Ok(new_circuit)
}

/// The phase-estimation power ladder: the k-th control qubit controls
/// `subcircuit` applied `2^k` times.
pub fn make_binary_controlled_circuit(
    subcircuit: &QuantumCircuit,
    n_new_qubits: N,
    control_qubits: &[N],
    mapped_qubits: &[N],
) -> Result<QuantumCircuit> {
    let mut new_circuit = QuantumCircuit::new(n_new_qubits);

    for (i, &control) in control_qubits.iter().enumerate() {
        let n_iterations = 1usize << i;

        for _ in 0..n_iterations {
            let controlled_subcircuit =
                make_controlled_circuit(subcircuit, n_new_qubits, control, mapped_qubits)?;
            extend_circuit(&mut new_circuit, &controlled_subcircuit)?;
        }
    }

    Ok(new_circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::compare::almost_eq;
    use crate::math::tolerance::COMPLEX_ALMOST_EQ_TOLERANCE_SQ;

    const TOL: R = COMPLEX_ALMOST_EQ_TOLERANCE_SQ;

    #[test]
    fn append_and_extend_require_matching_shapes() {
        let mut left = QuantumCircuit::new(2);
        left.add_h_gate(0).unwrap();

        let mut right = QuantumCircuit::new(2);
        right.add_x_gate(1).unwrap();

        let combined = append_circuits(left.clone(), &right).unwrap();
        assert_eq!(combined.n_elements(), 2);

        let mismatched = QuantumCircuit::new(3);
        assert!(append_circuits(left, &mismatched).is_err());
    }

    #[test]
    fn transpile_rewrites_u_gates_to_primitives() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_u_gate(matrices::h_gate(), 0).unwrap();

        let transpiled = transpile_to_primitive(&circuit, TOL).unwrap();
        assert_eq!(transpiled.n_elements(), 1);
        assert_eq!(transpiled.elements()[0].gate().unwrap().gate, Gate::H);

        // a transpiled circuit is unitarily equivalent to the original
        assert!(almost_eq(&circuit, &transpiled, TOL));
    }

    #[test]
    fn controlled_circuit_promotes_each_gate() {
        let mut subcircuit = QuantumCircuit::new(2);
        subcircuit.add_h_gate(0).unwrap();
        subcircuit.add_rx_gate(1, 0.4).unwrap();

        let controlled = make_controlled_circuit(&subcircuit, 3, 0, &[1, 2]).unwrap();

        let tags: Vec<Gate> = controlled
            .elements()
            .iter()
            .map(|element| element.gate().unwrap().gate)
            .collect();
        assert_eq!(tags, vec![Gate::Ch, Gate::Crx]);
        assert_eq!(controlled.elements()[0].gate().unwrap().control_target(), (0, 1));
    }

    #[test]
    fn controlled_circuit_rejects_bad_mappings_and_elements() {
        let mut subcircuit = QuantumCircuit::new(1);
        subcircuit.add_h_gate(0).unwrap();

        assert!(make_controlled_circuit(&subcircuit, 2, 0, &[0]).is_err());
        assert!(make_controlled_circuit(&subcircuit, 2, 0, &[1, 1]).is_err());
        assert!(make_controlled_circuit(&subcircuit, 2, 0, &[5]).is_err());

        let mut measuring = QuantumCircuit::new(1);
        measuring.add_m_gate(0).unwrap();
        assert!(matches!(
            make_controlled_circuit(&measuring, 2, 0, &[1]),
            Err(Error::NonControllableElement(_))
        ));

        let mut with_flow = QuantumCircuit::new(1);
        with_flow.add_m_gate(0).unwrap();
        with_flow.add_if_statement_on_bit(0, QuantumCircuit::new(1)).unwrap();
        assert!(make_controlled_circuit(&with_flow, 2, 0, &[1]).is_err());
    }

    #[test]
    fn already_controlled_gates_become_doubly_controlled() {
        let mut subcircuit = QuantumCircuit::new(2);
        subcircuit.add_cx_gate(0, 1).unwrap();

        let controlled = make_controlled_circuit(&subcircuit, 3, 2, &[0, 1]).unwrap();

        // the Toffoli-style ladder: CU, CX, CU, CX, CU
        assert_eq!(controlled.n_elements(), 5);
    }

    #[test]
    fn binary_controlled_circuit_doubles_per_control() {
        let mut subcircuit = QuantumCircuit::new(1);
        subcircuit.add_p_gate(0, 0.25).unwrap();

        let ladder = make_binary_controlled_circuit(&subcircuit, 3, &[0, 1], &[2]).unwrap();

        // one application for control 0, two for control 1, one CP each
        assert_eq!(ladder.n_elements(), 3);
    }

    #[test]
    fn multiplicity_controlled_circuit_with_two_controls() {
        let mut subcircuit = QuantumCircuit::new(1);
        subcircuit.add_x_gate(0).unwrap();

        let controlled =
            make_multiplicity_controlled_circuit(&subcircuit, 3, &[0, 1], &[2]).unwrap();

        // the two-control ladder expands to five elements
        assert_eq!(controlled.n_elements(), 5);
        assert!(controlled.elements().iter().all(CircuitElement::is_gate));
    }
}
