//! The mixed-state simulator.
//!
//! A gate `G` evolves the state as `G rho G^dagger`. That splits into a row
//! pass (`buffer = G rho`, the kernel applied to row pairs column by column)
//! and a column pass (`rho = buffer G^dagger`, the conjugate kernel applied
//! to column pairs row by row), so every access stays within the two fixed
//! amplitudes of the current generator position and no full matrix product is
//! ever formed.

use ndarray::Array2;
use rand::rngs::StdRng;

use crate::circuit::{CircuitLogger, ClassicalRegister, QuantumCircuit};
use crate::error::{Error, Result};
use crate::gates::{Gate, GateInfo};
use crate::math::{pow_2_int, C, N};
use crate::state::DensityMatrix;

use super::kernels::{kernel_for_gate, KernelDispatch, PairKernel};
use super::measure::simulate_measurement_dm;
use super::pairs::{DoubleQubitGatePairGenerator, SingleQubitGatePairGenerator};
use super::{
    build_prng, check_valid_number_of_qubits, number_of_double_qubit_gate_pairs,
    number_of_single_qubit_gate_pairs, walk_circuit, FlatIndexPair, GateExecutor,
    MEASURING_THREAD_ID,
};

/// Row pass: `dst = G src` for a single-qubit gate.
pub(crate) fn single_qubit_row_pass(
    kernel: &KernelDispatch,
    src: &Array2<C>,
    dst: &mut Array2<C>,
    target_index: N,
    n_qubits: N,
    pair: &FlatIndexPair,
) {
    let mut row_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
    row_iterator.set_state(0);

    for _ in 0..row_iterator.size() {
        let (i_row0, i_row1) = row_iterator.next();

        let mut col_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
        col_iterator.set_state(pair.i_lower);

        for _ in pair.i_lower..pair.i_upper {
            let (i_col0, i_col1) = col_iterator.next();

            let (new00, new10) = kernel.apply(src[(i_row0, i_col0)], src[(i_row1, i_col0)]);
            let (new01, new11) = kernel.apply(src[(i_row0, i_col1)], src[(i_row1, i_col1)]);

            dst[(i_row0, i_col0)] = new00;
            dst[(i_row1, i_col0)] = new10;
            dst[(i_row0, i_col1)] = new01;
            dst[(i_row1, i_col1)] = new11;
        }
    }
}

/// Column pass: `dst = src G^dagger`, expressed through the kernel of the
/// element-wise conjugate of `G`.
pub(crate) fn single_qubit_column_pass(
    conj_kernel: &KernelDispatch,
    src: &Array2<C>,
    dst: &mut Array2<C>,
    target_index: N,
    n_qubits: N,
    pair: &FlatIndexPair,
) {
    let mut col_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
    col_iterator.set_state(0);

    for _ in 0..col_iterator.size() {
        let (i_col0, i_col1) = col_iterator.next();

        let mut row_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
        row_iterator.set_state(pair.i_lower);

        for _ in pair.i_lower..pair.i_upper {
            let (i_row0, i_row1) = row_iterator.next();

            let (new00, new01) = conj_kernel.apply(src[(i_row0, i_col0)], src[(i_row0, i_col1)]);
            let (new10, new11) = conj_kernel.apply(src[(i_row1, i_col0)], src[(i_row1, i_col1)]);

            dst[(i_row0, i_col0)] = new00;
            dst[(i_row0, i_col1)] = new01;
            dst[(i_row1, i_col0)] = new10;
            dst[(i_row1, i_col1)] = new11;
        }
    }
}

/// Row pass for a controlled gate: the kernel acts on the control-set rows,
/// the control-clear rows are copied through.
fn double_qubit_row_pass(
    kernel: &KernelDispatch,
    src: &Array2<C>,
    dst: &mut Array2<C>,
    control_index: N,
    target_index: N,
    n_qubits: N,
    pair: &FlatIndexPair,
) {
    let mut row_iterator = DoubleQubitGatePairGenerator::new(control_index, target_index, n_qubits);
    row_iterator.set_state(0);

    for _ in 0..row_iterator.size() {
        let (r_c0t0, r_c0t1, r_c1t0, r_c1t1) = row_iterator.next_unset_and_set();

        let mut col_iterator =
            DoubleQubitGatePairGenerator::new(control_index, target_index, n_qubits);
        col_iterator.set_state(pair.i_lower);

        for _ in pair.i_lower..pair.i_upper {
            let (c0, c1, c2, c3) = col_iterator.next_unset_and_set();

            for i_col in [c0, c1, c2, c3] {
                dst[(r_c0t0, i_col)] = src[(r_c0t0, i_col)];
                dst[(r_c0t1, i_col)] = src[(r_c0t1, i_col)];

                let (new0, new1) = kernel.apply(src[(r_c1t0, i_col)], src[(r_c1t1, i_col)]);
                dst[(r_c1t0, i_col)] = new0;
                dst[(r_c1t1, i_col)] = new1;
            }
        }
    }
}

/// Column pass for a controlled gate: the conjugate kernel acts on the
/// control-set columns, the control-clear columns are copied through.
fn double_qubit_column_pass(
    conj_kernel: &KernelDispatch,
    src: &Array2<C>,
    dst: &mut Array2<C>,
    control_index: N,
    target_index: N,
    n_qubits: N,
    pair: &FlatIndexPair,
) {
    let mut col_iterator = DoubleQubitGatePairGenerator::new(control_index, target_index, n_qubits);
    col_iterator.set_state(0);

    for _ in 0..col_iterator.size() {
        let (c_c0t0, c_c0t1, c_c1t0, c_c1t1) = col_iterator.next_unset_and_set();

        let mut row_iterator =
            DoubleQubitGatePairGenerator::new(control_index, target_index, n_qubits);
        row_iterator.set_state(pair.i_lower);

        for _ in pair.i_lower..pair.i_upper {
            let (r0, r1, r2, r3) = row_iterator.next_unset_and_set();

            for i_row in [r0, r1, r2, r3] {
                dst[(i_row, c_c0t0)] = src[(i_row, c_c0t0)];
                dst[(i_row, c_c0t1)] = src[(i_row, c_c0t1)];

                let (new0, new1) =
                    conj_kernel.apply(src[(i_row, c_c1t0)], src[(i_row, c_c1t1)]);
                dst[(i_row, c_c1t0)] = new0;
                dst[(i_row, c_c1t1)] = new1;
            }
        }
    }
}

/// Apply a single-qubit gate in place, through the scratch buffer.
pub(crate) fn apply_single_qubit_gate_dm(
    state: &mut DensityMatrix,
    buffer: &mut Array2<C>,
    kernel: &KernelDispatch,
    target_index: N,
    pair: &FlatIndexPair,
) {
    let n_qubits = state.n_qubits();

    single_qubit_row_pass(kernel, state.matrix(), buffer, target_index, n_qubits, pair);
    single_qubit_column_pass(
        &kernel.conj_kernel(),
        buffer,
        state.matrix_mut(),
        target_index,
        n_qubits,
        pair,
    );
}

pub(crate) fn apply_double_qubit_gate_dm(
    state: &mut DensityMatrix,
    buffer: &mut Array2<C>,
    kernel: &KernelDispatch,
    control_index: N,
    target_index: N,
    pair: &FlatIndexPair,
) {
    let n_qubits = state.n_qubits();

    double_qubit_row_pass(
        kernel,
        state.matrix(),
        buffer,
        control_index,
        target_index,
        n_qubits,
        pair,
    );
    double_qubit_column_pass(
        &kernel.conj_kernel(),
        buffer,
        state.matrix_mut(),
        control_index,
        target_index,
        n_qubits,
        pair,
    );
}

struct DensityMatrixExecutor<'a> {
    state: &'a mut DensityMatrix,
    buffer: &'a mut Array2<C>,
    single_pair: FlatIndexPair,
    double_pair: FlatIndexPair,
    thread_id: usize,
    prng: StdRng,
}

impl GateExecutor for DensityMatrixExecutor<'_> {
    fn execute_gate(&mut self, info: &GateInfo, register: &mut ClassicalRegister) -> Result<()> {
        if info.gate == Gate::M {
            if self.thread_id == MEASURING_THREAD_ID {
                let (qubit_index, bit_index) = info.qubit_bit();
                let measured = simulate_measurement_dm(self.state, qubit_index, &mut self.prng)?;
                register.set(bit_index, measured);
            }
            return Ok(());
        }

        let kernel = kernel_for_gate(info);

        if info.gate.is_single_qubit_transform() {
            apply_single_qubit_gate_dm(
                self.state,
                self.buffer,
                &kernel,
                info.target(),
                &self.single_pair,
            );
        } else {
            let (control_index, target_index) = info.control_target();
            apply_double_qubit_gate_dm(
                self.state,
                self.buffer,
                &kernel,
                control_index,
                target_index,
                &self.double_pair,
            );
        }

        Ok(())
    }

    fn capture_logger(&mut self, logger: &mut CircuitLogger, register: &ClassicalRegister) {
        match logger {
            CircuitLogger::ClassicalRegister(logger) => logger.capture(register),
            CircuitLogger::DensityMatrix(logger) => logger.capture(self.state),
            // a statevector logger stays empty in a mixed-state run
            CircuitLogger::Statevector(_) => {}
        }
    }
}

/// Runs circuits against a density matrix; owns the scratch buffer so
/// repeated runs do not reallocate it.
#[derive(Clone, Debug)]
pub struct DensityMatrixSimulator {
    buffer: Array2<C>,
    cregister: Option<ClassicalRegister>,
    circuit_loggers: Vec<CircuitLogger>,
    has_been_run: bool,
}

impl DensityMatrixSimulator {
    pub fn new(n_qubits: N) -> Result<Self> {
        if n_qubits == 0 {
            return Err(Error::InvalidCircuitState(
                "cannot simulate a density matrix with zero qubits".to_string(),
            ));
        }

        let n_states = pow_2_int(n_qubits);

        Ok(Self {
            buffer: Array2::zeros((n_states, n_states)),
            cregister: None,
            circuit_loggers: Vec::new(),
            has_been_run: false,
        })
    }

    pub fn run(
        &mut self,
        circuit: &QuantumCircuit,
        state: &mut DensityMatrix,
        prng_seed: Option<u64>,
    ) -> Result<()> {
        check_valid_number_of_qubits(circuit, state.n_qubits())?;

        if self.buffer.nrows() != state.n_states() {
            return Err(Error::InvalidCircuitState(format!(
                "simulator buffer was sized for {} states but the state has {}",
                self.buffer.nrows(),
                state.n_states()
            )));
        }

        let n_qubits = circuit.n_qubits();
        let single_pair =
            FlatIndexPair { i_lower: 0, i_upper: number_of_single_qubit_gate_pairs(n_qubits) };
        let double_pair =
            FlatIndexPair { i_lower: 0, i_upper: number_of_double_qubit_gate_pairs(n_qubits) };

        let mut register = ClassicalRegister::new(circuit.n_bits());
        self.circuit_loggers.clear();

        let mut executor = DensityMatrixExecutor {
            state,
            buffer: &mut self.buffer,
            single_pair,
            double_pair,
            thread_id: MEASURING_THREAD_ID,
            prng: build_prng(prng_seed),
        };

        walk_circuit(circuit, &mut executor, &mut register, &mut self.circuit_loggers)?;

        self.cregister = Some(register);
        self.has_been_run = true;

        Ok(())
    }

    pub fn has_been_run(&self) -> bool {
        self.has_been_run
    }

    pub fn classical_register(&self) -> Result<&ClassicalRegister> {
        self.cregister.as_ref().ok_or_else(|| {
            Error::InvalidCircuitState(
                "cannot access the classical register before a simulation has run".to_string(),
            )
        })
    }

    pub fn circuit_loggers(&self) -> &[CircuitLogger] {
        &self.circuit_loggers
    }
}

/// One-shot convenience wrapper around [`DensityMatrixSimulator::run`].
pub fn simulate_density_matrix(
    circuit: &QuantumCircuit,
    state: &mut DensityMatrix,
    prng_seed: Option<u64>,
) -> Result<()> {
    let mut simulator = DensityMatrixSimulator::new(state.n_qubits())?;
    simulator.run(circuit, state, prng_seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::C_ONE;
    use crate::state::{statevector_to_density_matrix, Endian, Statevector};

    fn run_both(circuit: &QuantumCircuit, bitstring: &str) -> (Statevector, DensityMatrix) {
        let mut statevector = Statevector::from_bitstring(bitstring, Endian::Little).unwrap();
        crate::sim::simulate(circuit, &mut statevector, Some(1)).unwrap();

        let mut rho = DensityMatrix::from_bitstring(bitstring, Endian::Little).unwrap();
        simulate_density_matrix(circuit, &mut rho, Some(1)).unwrap();

        (statevector, rho)
    }

    fn assert_consistent(statevector: &Statevector, rho: &DensityMatrix) {
        let expected = statevector_to_density_matrix(statevector);
        assert!(rho.almost_eq(&expected, 1e-12));
    }

    #[test]
    fn single_qubit_gates_match_the_pure_state_engine() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.add_h_gate(0).unwrap();
        circuit.add_t_gate(0).unwrap();
        circuit.add_ry_gate(1, 0.37).unwrap();
        circuit.add_sx_gate(1).unwrap();

        let (statevector, rho) = run_both(&circuit, "00");
        assert_consistent(&statevector, &rho);
    }

    #[test]
    fn controlled_gates_match_the_pure_state_engine() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_h_gate(0).unwrap();
        circuit.add_cx_gate(0, 1).unwrap();
        circuit.add_crz_gate(1, 2, 0.81).unwrap();
        circuit.add_cu_gate(crate::gates::matrices::sx_gate(), 2, 0).unwrap();

        let (statevector, rho) = run_both(&circuit, "000");
        assert_consistent(&statevector, &rho);
    }

    #[test]
    fn bell_pair_density_matrix() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.add_h_gate(0).unwrap();
        circuit.add_cx_gate(0, 1).unwrap();

        let mut rho = DensityMatrix::new(2).unwrap();
        simulate_density_matrix(&circuit, &mut rho, None).unwrap();

        assert!((rho.matrix()[(0, 0)].re - 0.5).abs() < 1e-12);
        assert!((rho.matrix()[(3, 3)].re - 0.5).abs() < 1e-12);
        assert!((rho.matrix()[(0, 3)].re - 0.5).abs() < 1e-12);
        assert!((rho.trace() - C_ONE).norm() < 1e-12);
        assert!(rho.is_pure(1e-9));
    }

    #[test]
    fn conditional_branch_executes_against_the_register() {
        let mut if_branch = QuantumCircuit::new(2);
        if_branch.add_x_gate(1).unwrap();

        let mut circuit = QuantumCircuit::new(2);
        circuit.add_x_gate(0).unwrap();
        circuit.add_m_gate(0).unwrap();
        circuit.add_if_statement_on_bit(0, if_branch).unwrap();
        circuit.add_density_matrix_logger();

        let mut rho = DensityMatrix::new(2).unwrap();
        let mut simulator = DensityMatrixSimulator::new(2).unwrap();
        simulator.run(&circuit, &mut rho, Some(3)).unwrap();

        assert!((rho.matrix()[(0b11, 0b11)] - C_ONE).norm() < 1e-12);
        assert_eq!(simulator.classical_register().unwrap().get(0), Some(1));

        let logger = simulator.circuit_loggers()[0].density_matrix_logger().unwrap();
        let snapshot = logger.density_matrix().unwrap();
        assert!((snapshot.matrix()[(0b11, 0b11)] - C_ONE).norm() < 1e-12);
    }

    #[test]
    fn hadamard_preserves_purity_and_trace() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_h_gate(0).unwrap();

        let mut rho = DensityMatrix::new(1).unwrap();
        simulate_density_matrix(&circuit, &mut rho, None).unwrap();

        assert!((rho.matrix()[(0, 0)].re - 0.5).abs() < 1e-12);
        assert!((rho.matrix()[(0, 1)].re - 0.5).abs() < 1e-12);
        assert!(rho.is_pure(1e-9));
    }
}
