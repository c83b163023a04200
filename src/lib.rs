#![warn(clippy::cargo)]
#![doc = include_str!("../README.md")]

pub mod math;

pub mod channels;
pub mod circuit;
pub mod error;
pub mod gates;
pub mod io;
pub mod measurements;
pub mod sim;
pub mod state;

#[cfg(test)]
mod tests;

#[doc(hidden)]
pub mod prelude {
    pub use crate::channels::{
        apply_multi_qubit_kraus_channel, apply_one_qubit_kraus_channel, apply_pauli_channel,
        MultiQubitKrausChannel, OneQubitKrausChannel, PauliChannel, PauliOp,
    };
    pub use crate::circuit::{
        compare::almost_eq as circuits_almost_eq,
        ops::{
            append_circuits, extend_circuit, make_binary_controlled_circuit,
            make_controlled_circuit, make_multiplicity_controlled_circuit, transpile_to_primitive,
        },
        CircuitLogger, ClassicalRegister, ControlFlowPredicate, PredicateKind, QuantumCircuit,
    };
    pub use crate::error::{Error, Result};
    pub use crate::gates::{
        compose::{
            apply_control_swap, apply_doubly_controlled_gate, apply_forward_fourier_transform,
            apply_inverse_fourier_transform, apply_multiplicity_controlled_u_gate, apply_swap,
            apply_toffoli,
        },
        matrices, Gate, GateInfo,
    };
    pub use crate::io::{
        read_tangelo_circuit, read_tangelo_file, write_tangelo_circuit, write_tangelo_file,
    };
    pub use crate::math::{matrix::Matrix2X2, C, N, R};
    pub use crate::measurements::{
        calculate_probabilities_raw, memory_to_counts, memory_to_fractions,
        perform_measurements_as_counts, perform_measurements_as_counts_marginal,
        perform_measurements_as_counts_raw, perform_measurements_as_memory, ProbabilitySampler,
    };
    pub use crate::sim::{
        simulate, simulate_density_matrix, DensityMatrixSimulator, StatevectorSimulator,
    };
    pub use crate::state::{
        density_matrix::{partial_trace, statevector_to_density_matrix},
        project::{project_statevector, project_statevector_default},
        DensityMatrix, Endian, Statevector,
    };
}
