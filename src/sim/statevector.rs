//! The pure-state simulator.

use rand::rngs::StdRng;

use crate::circuit::{CircuitLogger, ClassicalRegister, QuantumCircuit};
use crate::error::{Error, Result};
use crate::gates::{Gate, GateInfo};
use crate::math::N;
use crate::state::Statevector;

use super::kernels::{kernel_for_gate, KernelDispatch, PairKernel};
use super::measure::simulate_measurement;
use super::pairs::{DoubleQubitGatePairGenerator, SingleQubitGatePairGenerator};
use super::{
    build_prng, check_valid_number_of_qubits, number_of_double_qubit_gate_pairs,
    number_of_single_qubit_gate_pairs, walk_circuit, FlatIndexPair, GateExecutor,
    MEASURING_THREAD_ID,
};

pub(crate) fn apply_single_qubit_gate(
    state: &mut Statevector,
    kernel: &KernelDispatch,
    target_index: N,
    pair: &FlatIndexPair,
) {
    let mut generator = SingleQubitGatePairGenerator::new(target_index, state.n_qubits());
    generator.set_state(pair.i_lower);

    for _ in pair.i_lower..pair.i_upper {
        let (i0, i1) = generator.next();
        let (new0, new1) = kernel.apply(state[i0], state[i1]);
        state[i0] = new0;
        state[i1] = new1;
    }
}

pub(crate) fn apply_double_qubit_gate(
    state: &mut Statevector,
    kernel: &KernelDispatch,
    control_index: N,
    target_index: N,
    pair: &FlatIndexPair,
) {
    let mut generator =
        DoubleQubitGatePairGenerator::new(control_index, target_index, state.n_qubits());
    generator.set_state(pair.i_lower);

    for _ in pair.i_lower..pair.i_upper {
        let (i0, i1) = generator.next();
        let (new0, new1) = kernel.apply(state[i0], state[i1]);
        state[i0] = new0;
        state[i1] = new1;
    }
}

struct StatevectorExecutor<'a> {
    state: &'a mut Statevector,
    single_pair: FlatIndexPair,
    double_pair: FlatIndexPair,
    thread_id: usize,
    prng: StdRng,
}

impl GateExecutor for StatevectorExecutor<'_> {
    fn execute_gate(&mut self, info: &GateInfo, register: &mut ClassicalRegister) -> Result<()> {
        if info.gate == Gate::M {
            // measurement stays on the measuring thread so the PRNG stream
            // is consumed deterministically
            if self.thread_id == MEASURING_THREAD_ID {
                let (qubit_index, bit_index) = info.qubit_bit();
                let measured = simulate_measurement(self.state, qubit_index, &mut self.prng)?;
                register.set(bit_index, measured);
            }
            return Ok(());
        }

        let kernel = kernel_for_gate(info);

        if info.gate.is_single_qubit_transform() {
            apply_single_qubit_gate(self.state, &kernel, info.target(), &self.single_pair);
        } else {
            let (control_index, target_index) = info.control_target();
            apply_double_qubit_gate(
                self.state,
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
            CircuitLogger::Statevector(logger) => logger.capture(self.state),
            // a density-matrix logger stays empty in a pure-state run
            CircuitLogger::DensityMatrix(_) => {}
        }
    }
}

/// Runs circuits against a statevector; the classical register and captured
/// loggers stay readable afterwards.
#[derive(Clone, Debug, Default)]
pub struct StatevectorSimulator {
    cregister: Option<ClassicalRegister>,
    circuit_loggers: Vec<CircuitLogger>,
    has_been_run: bool,
}

impl StatevectorSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evolve `state` through `circuit`, mutating it in place.
    ///
    /// A fixed `prng_seed` makes every measurement outcome reproducible.
    pub fn run(
        &mut self,
        circuit: &QuantumCircuit,
        state: &mut Statevector,
        prng_seed: Option<u64>,
    ) -> Result<()> {
        check_valid_number_of_qubits(circuit, state.n_qubits())?;

        let n_qubits = circuit.n_qubits();
        let single_pair =
            FlatIndexPair { i_lower: 0, i_upper: number_of_single_qubit_gate_pairs(n_qubits) };
        let double_pair =
            FlatIndexPair { i_lower: 0, i_upper: number_of_double_qubit_gate_pairs(n_qubits) };

        let mut register = ClassicalRegister::new(circuit.n_bits());
        self.circuit_loggers.clear();

        let mut executor = StatevectorExecutor {
            state,
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

    /// The classical register of the last run.
    pub fn classical_register(&self) -> Result<&ClassicalRegister> {
        self.cregister.as_ref().ok_or_else(|| {
            Error::InvalidCircuitState(
                "cannot access the classical register before a simulation has run".to_string(),
            )
        })
    }

    /// The loggers captured during the last run, in encounter order.
    pub fn circuit_loggers(&self) -> &[CircuitLogger] {
        &self.circuit_loggers
    }
}

/// One-shot convenience wrapper around [`StatevectorSimulator::run`].
pub fn simulate(
    circuit: &QuantumCircuit,
    state: &mut Statevector,
    prng_seed: Option<u64>,
) -> Result<()> {
    let mut simulator = StatevectorSimulator::new();
    simulator.run(circuit, state, prng_seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{C, C_ONE, C_ZERO, FRAC_1_SQRT_2};
    use crate::state::Endian;

    #[test]
    fn hadamard_creates_a_superposition() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_h_gate(0).unwrap();

        let mut state = Statevector::new(1).unwrap();
        simulate(&circuit, &mut state, None).unwrap();

        let rt = C::new(FRAC_1_SQRT_2, 0.0);
        assert!((state[0] - rt).norm() < 1e-12);
        assert!((state[1] - rt).norm() < 1e-12);
    }

    #[test]
    fn controlled_gate_acts_only_when_control_is_set() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.add_cx_gate(0, 1).unwrap();

        let mut state = Statevector::from_bitstring("00", Endian::Little).unwrap();
        simulate(&circuit, &mut state, None).unwrap();
        assert!((state[0b00] - C_ONE).norm() < 1e-12);

        let mut state = Statevector::from_bitstring("10", Endian::Little).unwrap();
        simulate(&circuit, &mut state, None).unwrap();
        assert!((state[0b11] - C_ONE).norm() < 1e-12);
    }

    #[test]
    fn qubit_count_mismatch_is_rejected() {
        let circuit = QuantumCircuit::new(2);
        let mut state = Statevector::new(3).unwrap();

        assert!(simulate(&circuit, &mut state, None).is_err());
    }

    #[test]
    fn register_is_unreadable_before_running() {
        let simulator = StatevectorSimulator::new();
        assert!(!simulator.has_been_run());
        assert!(simulator.classical_register().is_err());
    }

    #[test]
    fn measurement_writes_the_register_and_loggers_capture() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_x_gate(0).unwrap();
        circuit.add_m_gate(0).unwrap();
        circuit.add_classical_register_logger();
        circuit.add_statevector_logger();

        let mut state = Statevector::new(1).unwrap();
        let mut simulator = StatevectorSimulator::new();
        simulator.run(&circuit, &mut state, Some(99)).unwrap();

        let register = simulator.classical_register().unwrap();
        assert_eq!(register.get(0), Some(1));

        let loggers = simulator.circuit_loggers();
        assert_eq!(loggers.len(), 2);

        let register_logger = loggers[0].classical_register_logger().unwrap();
        assert_eq!(register_logger.register().unwrap().get(0), Some(1));

        let state_logger = loggers[1].statevector_logger().unwrap();
        assert!((state_logger.statevector().unwrap()[1] - C_ONE).norm() < 1e-12);
        assert_eq!(state_logger.statevector().unwrap()[0], C_ZERO);
    }

    #[test]
    fn while_loop_runs_until_its_bit_flips() {
        // flip qubit 0 and re-measure inside the loop; the loop exits once
        // the measured bit lands on 0
        let mut body = QuantumCircuit::new(1);
        body.add_x_gate(0).unwrap();
        body.add_m_gate(0).unwrap();

        let mut circuit = QuantumCircuit::new(1);
        circuit.add_x_gate(0).unwrap();
        circuit.add_m_gate(0).unwrap();
        circuit.add_while_statement_on_bit(0, body).unwrap();

        let mut state = Statevector::new(1).unwrap();
        let mut simulator = StatevectorSimulator::new();
        simulator.run(&circuit, &mut state, Some(5)).unwrap();

        // the first loop pass flips |1> to |0>, so exactly one pass runs
        let register = simulator.classical_register().unwrap();
        assert_eq!(register.get(0), Some(0));
        assert!((state[0] - C_ONE).norm() < 1e-12);
    }
}
