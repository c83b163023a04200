//! The circuit intermediate representation and its typed builders.
//!
//! A [`QuantumCircuit`] owns an ordered stream of [`CircuitElement`]s. The
//! builders validate every index against the circuit's qubit/bit counts
//! before anything is appended, so a stored circuit never references an
//! out-of-range qubit or bit. Subcircuits embedded in control-flow elements
//! are owned boxes: cloning a circuit deep-copies its whole tree.

pub use self::{
    control_flow::{
        ClassicalIfElseStatement, ClassicalIfStatement, ClassicalWhileStatement,
        ControlFlowInstruction, ControlFlowPredicate, PredicateKind,
    },
    element::CircuitElement,
    logger::{
        CircuitLogger, ClassicalRegisterLogger, DensityMatrixLogger, StatevectorLogger,
    },
    register::ClassicalRegister,
};

pub mod compare;
pub mod control_flow;
pub mod element;
pub mod logger;
pub mod ops;
pub mod register;

use crate::error::{Error, Result};
use crate::gates::{Gate, GateInfo};
use crate::math::{matrix::Matrix2X2, N, R};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuantumCircuit {
    n_qubits: N,
    n_bits: N,
    elements: Vec<CircuitElement>,
}

macro_rules! one_target_builders {
    ($(($single:ident, $plural:ident, $gate:expr)),* $(,)?) => {$(
        pub fn $single(&mut self, target_index: N) -> Result<()> {
            self.check_qubit_range(target_index)?;
            self.elements.push(CircuitElement::Gate(GateInfo::one_target($gate, target_index)));
            Ok(())
        }

        pub fn $plural(&mut self, target_indices: impl IntoIterator<Item = N>) -> Result<()> {
            let indices: Vec<N> = target_indices.into_iter().collect();
            for &index in &indices {
                self.check_qubit_range(index)?;
            }
            for index in indices {
                self.elements.push(CircuitElement::Gate(GateInfo::one_target($gate, index)));
            }
            Ok(())
        }
    )*};
}

macro_rules! one_target_one_angle_builders {
    ($(($single:ident, $plural:ident, $gate:expr)),* $(,)?) => {$(
        pub fn $single(&mut self, target_index: N, angle: R) -> Result<()> {
            self.check_qubit_range(target_index)?;
            self.elements.push(CircuitElement::Gate(GateInfo::one_target_one_angle(
                $gate,
                target_index,
                angle,
            )));
            Ok(())
        }

        pub fn $plural(&mut self, pairs: impl IntoIterator<Item = (N, R)>) -> Result<()> {
            let pairs: Vec<(N, R)> = pairs.into_iter().collect();
            for &(index, _) in &pairs {
                self.check_qubit_range(index)?;
            }
            for (index, angle) in pairs {
                self.elements.push(CircuitElement::Gate(GateInfo::one_target_one_angle(
                    $gate, index, angle,
                )));
            }
            Ok(())
        }
    )*};
}

macro_rules! one_control_one_target_builders {
    ($(($single:ident, $plural:ident, $gate:expr)),* $(,)?) => {$(
        pub fn $single(&mut self, control_index: N, target_index: N) -> Result<()> {
            self.check_control_target(control_index, target_index)?;
            self.elements.push(CircuitElement::Gate(GateInfo::one_control_one_target(
                $gate,
                control_index,
                target_index,
            )));
            Ok(())
        }

        pub fn $plural(&mut self, pairs: impl IntoIterator<Item = (N, N)>) -> Result<()> {
            let pairs: Vec<(N, N)> = pairs.into_iter().collect();
            for &(control, target) in &pairs {
                self.check_control_target(control, target)?;
            }
            for (control, target) in pairs {
                self.elements.push(CircuitElement::Gate(GateInfo::one_control_one_target(
                    $gate, control, target,
                )));
            }
            Ok(())
        }
    )*};
}

macro_rules! one_control_one_target_one_angle_builders {
    ($(($single:ident, $plural:ident, $gate:expr)),* $(,)?) => {$(
        pub fn $single(&mut self, control_index: N, target_index: N, angle: R) -> Result<()> {
            self.check_control_target(control_index, target_index)?;
            self.elements.push(CircuitElement::Gate(
                GateInfo::one_control_one_target_one_angle($gate, control_index, target_index, angle),
            ));
            Ok(())
        }

        pub fn $plural(&mut self, triples: impl IntoIterator<Item = (N, N, R)>) -> Result<()> {
            let triples: Vec<(N, N, R)> = triples.into_iter().collect();
            for &(control, target, _) in &triples {
                self.check_control_target(control, target)?;
            }
            for (control, target, angle) in triples {
                self.elements.push(CircuitElement::Gate(
                    GateInfo::one_control_one_target_one_angle($gate, control, target, angle),
                ));
            }
            Ok(())
        }
    )*};
}

impl QuantumCircuit {
    /// A circuit with as many classical bits as qubits.
    pub fn new(n_qubits: N) -> Self {
        Self { n_qubits, n_bits: n_qubits, elements: Vec::new() }
    }

    pub fn with_bits(n_qubits: N, n_bits: N) -> Self {
        Self { n_qubits, n_bits, elements: Vec::new() }
    }

    pub fn n_qubits(&self) -> N {
        self.n_qubits
    }

    pub fn n_bits(&self) -> N {
        self.n_bits
    }

    pub fn elements(&self) -> &[CircuitElement] {
        &self.elements
    }

    pub fn n_elements(&self) -> N {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CircuitElement> {
        self.elements.iter()
    }

    fn check_qubit_range(&self, index: N) -> Result<()> {
        if index >= self.n_qubits {
            return Err(Error::OutOfRangeQubit { index, n_qubits: self.n_qubits });
        }
        Ok(())
    }

    fn check_bit_range(&self, index: N) -> Result<()> {
        if index >= self.n_bits {
            return Err(Error::OutOfRangeBit { index, n_bits: self.n_bits });
        }
        Ok(())
    }

    fn check_control_target(&self, control_index: N, target_index: N) -> Result<()> {
        self.check_qubit_range(control_index)?;
        self.check_qubit_range(target_index)?;
        if control_index == target_index {
            return Err(Error::InvalidCircuitState(
                "control and target of a two-qubit gate must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn push_gate(&mut self, info: GateInfo) {
        self.elements.push(CircuitElement::Gate(info));
    }

    pub(crate) fn push_element(&mut self, element: CircuitElement) {
        self.elements.push(element);
    }

    pub(crate) fn pop_element(&mut self) -> Option<CircuitElement> {
        self.elements.pop()
    }

    pub(crate) fn push_checked_one_target(&mut self, gate: Gate, target_index: N) -> Result<()> {
        self.check_qubit_range(target_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::one_target(gate, target_index)));
        Ok(())
    }

    pub(crate) fn push_checked_one_target_one_angle(
        &mut self,
        gate: Gate,
        target_index: N,
        angle: R,
    ) -> Result<()> {
        self.check_qubit_range(target_index)?;
        self.elements
            .push(CircuitElement::Gate(GateInfo::one_target_one_angle(gate, target_index, angle)));
        Ok(())
    }

    pub(crate) fn push_checked_one_control_one_target(
        &mut self,
        gate: Gate,
        control_index: N,
        target_index: N,
    ) -> Result<()> {
        self.check_control_target(control_index, target_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::one_control_one_target(
            gate,
            control_index,
            target_index,
        )));
        Ok(())
    }

    pub(crate) fn push_checked_one_control_one_target_one_angle(
        &mut self,
        gate: Gate,
        control_index: N,
        target_index: N,
        angle: R,
    ) -> Result<()> {
        self.check_control_target(control_index, target_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::one_control_one_target_one_angle(
            gate,
            control_index,
            target_index,
            angle,
        )));
        Ok(())
    }

    one_target_builders![
        (add_h_gate, add_h_gates, Gate::H),
        (add_x_gate, add_x_gates, Gate::X),
        (add_y_gate, add_y_gates, Gate::Y),
        (add_z_gate, add_z_gates, Gate::Z),
        (add_s_gate, add_s_gates, Gate::S),
        (add_sdag_gate, add_sdag_gates, Gate::Sdag),
        (add_t_gate, add_t_gates, Gate::T),
        (add_tdag_gate, add_tdag_gates, Gate::Tdag),
        (add_sx_gate, add_sx_gates, Gate::Sx),
        (add_sxdag_gate, add_sxdag_gates, Gate::Sxdag),
    ];

    one_target_one_angle_builders![
        (add_rx_gate, add_rx_gates, Gate::Rx),
        (add_ry_gate, add_ry_gates, Gate::Ry),
        (add_rz_gate, add_rz_gates, Gate::Rz),
        (add_p_gate, add_p_gates, Gate::P),
    ];

    one_control_one_target_builders![
        (add_ch_gate, add_ch_gates, Gate::Ch),
        (add_cx_gate, add_cx_gates, Gate::Cx),
        (add_cy_gate, add_cy_gates, Gate::Cy),
        (add_cz_gate, add_cz_gates, Gate::Cz),
        (add_cs_gate, add_cs_gates, Gate::Cs),
        (add_csdag_gate, add_csdag_gates, Gate::Csdag),
        (add_ct_gate, add_ct_gates, Gate::Ct),
        (add_ctdag_gate, add_ctdag_gates, Gate::Ctdag),
        (add_csx_gate, add_csx_gates, Gate::Csx),
        (add_csxdag_gate, add_csxdag_gates, Gate::Csxdag),
    ];

    one_control_one_target_one_angle_builders![
        (add_crx_gate, add_crx_gates, Gate::Crx),
        (add_cry_gate, add_cry_gates, Gate::Cry),
        (add_crz_gate, add_crz_gates, Gate::Crz),
        (add_cp_gate, add_cp_gates, Gate::Cp),
    ];

    /// Apply the 2x2 unitary `gate` to the qubit at `target_index`.
    pub fn add_u_gate(&mut self, gate: Matrix2X2, target_index: N) -> Result<()> {
        self.check_qubit_range(target_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::u(target_index, gate)));
        Ok(())
    }

    pub fn add_u_gates(
        &mut self,
        gate: &Matrix2X2,
        target_indices: impl IntoIterator<Item = N>,
    ) -> Result<()> {
        let indices: Vec<N> = target_indices.into_iter().collect();
        for &index in &indices {
            self.check_qubit_range(index)?;
        }
        for index in indices {
            self.elements.push(CircuitElement::Gate(GateInfo::u(index, *gate)));
        }
        Ok(())
    }

    pub fn add_cu_gate(
        &mut self,
        gate: Matrix2X2,
        control_index: N,
        target_index: N,
    ) -> Result<()> {
        self.check_control_target(control_index, target_index)?;
        self.elements
            .push(CircuitElement::Gate(GateInfo::cu(control_index, target_index, gate)));
        Ok(())
    }

    pub fn add_cu_gates(
        &mut self,
        gate: &Matrix2X2,
        pairs: impl IntoIterator<Item = (N, N)>,
    ) -> Result<()> {
        let pairs: Vec<(N, N)> = pairs.into_iter().collect();
        for &(control, target) in &pairs {
            self.check_control_target(control, target)?;
        }
        for (control, target) in pairs {
            self.elements.push(CircuitElement::Gate(GateInfo::cu(control, target, *gate)));
        }
        Ok(())
    }

    /// Measure `target_index` into the classical bit of the same index.
    pub fn add_m_gate(&mut self, target_index: N) -> Result<()> {
        self.check_qubit_range(target_index)?;
        self.check_bit_range(target_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::m(target_index, target_index)));
        Ok(())
    }

    /// Measure `target_index` into `bit_index`.
    pub fn add_m_gate_to(&mut self, target_index: N, bit_index: N) -> Result<()> {
        self.check_qubit_range(target_index)?;
        self.check_bit_range(bit_index)?;
        self.elements.push(CircuitElement::Gate(GateInfo::m(target_index, bit_index)));
        Ok(())
    }

    pub fn add_m_gates(&mut self, target_indices: impl IntoIterator<Item = N>) -> Result<()> {
        let indices: Vec<N> = target_indices.into_iter().collect();
        for &index in &indices {
            self.check_qubit_range(index)?;
            self.check_bit_range(index)?;
        }
        for index in indices {
            self.elements.push(CircuitElement::Gate(GateInfo::m(index, index)));
        }
        Ok(())
    }

    fn check_predicate_bits(&self, predicate: &ControlFlowPredicate) -> Result<()> {
        for &bit_index in predicate.bit_indices() {
            self.check_bit_range(bit_index)?;
        }
        Ok(())
    }

    /// Execute `circuit` when `predicate` evaluates true against the
    /// classical register.
    pub fn add_if_statement(
        &mut self,
        predicate: ControlFlowPredicate,
        circuit: QuantumCircuit,
    ) -> Result<()> {
        self.check_predicate_bits(&predicate)?;
        self.elements.push(CircuitElement::ControlFlow(ControlFlowInstruction::If(
            ClassicalIfStatement::new(predicate, circuit),
        )));
        Ok(())
    }

    /// Execute `circuit` when the measured bit at `bit_index` is 1.
    pub fn add_if_statement_on_bit(
        &mut self,
        bit_index: N,
        circuit: QuantumCircuit,
    ) -> Result<()> {
        self.add_if_statement(ControlFlowPredicate::on_bit(bit_index), circuit)
    }

    /// Execute `circuit` when the measured bit at `bit_index` is 0.
    pub fn add_if_not_statement_on_bit(
        &mut self,
        bit_index: N,
        circuit: QuantumCircuit,
    ) -> Result<()> {
        self.add_if_statement(ControlFlowPredicate::on_bit_not(bit_index), circuit)
    }

    pub fn add_if_else_statement(
        &mut self,
        predicate: ControlFlowPredicate,
        if_circuit: QuantumCircuit,
        else_circuit: QuantumCircuit,
    ) -> Result<()> {
        self.check_predicate_bits(&predicate)?;
        self.elements.push(CircuitElement::ControlFlow(ControlFlowInstruction::IfElse(
            ClassicalIfElseStatement::new(predicate, if_circuit, else_circuit),
        )));
        Ok(())
    }

    pub fn add_if_else_statement_on_bit(
        &mut self,
        bit_index: N,
        if_circuit: QuantumCircuit,
        else_circuit: QuantumCircuit,
    ) -> Result<()> {
        self.add_if_else_statement(ControlFlowPredicate::on_bit(bit_index), if_circuit, else_circuit)
    }

    pub fn add_if_not_else_statement_on_bit(
        &mut self,
        bit_index: N,
        if_circuit: QuantumCircuit,
        else_circuit: QuantumCircuit,
    ) -> Result<()> {
        self.add_if_else_statement(
            ControlFlowPredicate::on_bit_not(bit_index),
            if_circuit,
            else_circuit,
        )
    }

    /// Re-execute `circuit` as long as `predicate` evaluates true; the
    /// predicate is re-evaluated after every pass over the body.
    pub fn add_while_statement(
        &mut self,
        predicate: ControlFlowPredicate,
        circuit: QuantumCircuit,
    ) -> Result<()> {
        self.check_predicate_bits(&predicate)?;
        self.elements.push(CircuitElement::ControlFlow(ControlFlowInstruction::While(
            ClassicalWhileStatement::new(predicate, circuit),
        )));
        Ok(())
    }

    pub fn add_while_statement_on_bit(
        &mut self,
        bit_index: N,
        circuit: QuantumCircuit,
    ) -> Result<()> {
        self.add_while_statement(ControlFlowPredicate::on_bit(bit_index), circuit)
    }

    pub fn add_classical_register_logger(&mut self) {
        self.elements.push(CircuitElement::Logger(CircuitLogger::ClassicalRegister(
            ClassicalRegisterLogger::default(),
        )));
    }

    pub fn add_statevector_logger(&mut self) {
        self.elements.push(CircuitElement::Logger(CircuitLogger::Statevector(
            StatevectorLogger::default(),
        )));
    }

    pub fn add_density_matrix_logger(&mut self) {
        self.elements.push(CircuitElement::Logger(CircuitLogger::DensityMatrix(
            DensityMatrixLogger::default(),
        )));
    }

    pub fn add_circuit_logger(&mut self, logger: CircuitLogger) {
        self.elements.push(CircuitElement::Logger(logger));
    }
}

impl<'a> IntoIterator for &'a QuantumCircuit {
    type Item = &'a CircuitElement;
    type IntoIter = std::slice::Iter<'a, CircuitElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
