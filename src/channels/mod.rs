//! Quantum channels: completely-positive trace-preserving maps applied to a
//! density matrix as `rho -> sum_i K_i rho K_i^dagger`.
//!
//! One-qubit channels run through the same row/column kernel passes as the
//! gate engine; multi-qubit channels multiply the dense matrices directly.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::gates::matrices::{i_gate, x_gate, y_gate, z_gate};
use crate::math::{is_power_of_2, matrix::Matrix2X2, tolerance::*, C, N, R};
use crate::sim::density_matrix::{single_qubit_column_pass, single_qubit_row_pass};
use crate::sim::kernels::{Mat, PairKernel};
use crate::sim::{number_of_single_qubit_gate_pairs, FlatIndexPair};
use crate::state::DensityMatrix;

fn one_qubit_kraus_sum(kraus_matrices: &[Matrix2X2]) -> Matrix2X2 {
    kraus_matrices
        .iter()
        .fold(Matrix2X2::default(), |total, mat| total + mat.adjoint() * *mat)
}

/// A Kraus channel over a single target qubit.
#[derive(Clone, Debug, PartialEq)]
pub struct OneQubitKrausChannel {
    kraus_matrices: Vec<Matrix2X2>,
    target_index: N,
}

impl OneQubitKrausChannel {
    pub fn new(kraus_matrices: Vec<Matrix2X2>, target_index: N) -> Result<Self> {
        Self::with_tolerance(kraus_matrices, target_index, COMPLEX_ALMOST_EQ_TOLERANCE_SQ)
    }

    pub fn with_tolerance(
        kraus_matrices: Vec<Matrix2X2>,
        target_index: N,
        tolerance: R,
    ) -> Result<Self> {
        if kraus_matrices.is_empty() {
            return Err(Error::InvalidKrausChannel(
                "a Kraus channel needs at least one matrix".to_string(),
            ));
        }

        if !one_qubit_kraus_sum(&kraus_matrices).almost_eq(&i_gate(), tolerance) {
            return Err(Error::InvalidKrausChannel(
                "the Kraus matrices do not sum to the identity".to_string(),
            ));
        }

        Ok(Self { kraus_matrices, target_index })
    }

    /// Skip the completeness check; the matrices are trusted to form a CPTP
    /// map.
    pub fn new_unchecked(kraus_matrices: Vec<Matrix2X2>, target_index: N) -> Result<Self> {
        if kraus_matrices.is_empty() {
            return Err(Error::InvalidKrausChannel(
                "a Kraus channel needs at least one matrix".to_string(),
            ));
        }

        Ok(Self { kraus_matrices, target_index })
    }

    pub fn kraus_matrices(&self) -> &[Matrix2X2] {
        &self.kraus_matrices
    }

    pub fn target_index(&self) -> N {
        self.target_index
    }
}

/// Apply a one-qubit Kraus channel to `state` in place.
pub fn apply_one_qubit_kraus_channel(
    state: &mut DensityMatrix,
    channel: &OneQubitKrausChannel,
) -> Result<()> {
    let n_qubits = state.n_qubits();
    let target_index = channel.target_index();

    if target_index >= n_qubits {
        return Err(Error::OutOfRangeQubit { index: target_index, n_qubits });
    }

    let pair = FlatIndexPair { i_lower: 0, i_upper: number_of_single_qubit_gate_pairs(n_qubits) };
    let n_states = state.n_states();

    let mut accumulator = Array2::<C>::zeros((n_states, n_states));
    let mut left_mul_buffer = Array2::<C>::zeros((n_states, n_states));
    let mut right_mul_buffer = Array2::<C>::zeros((n_states, n_states));

    for kraus_matrix in channel.kraus_matrices() {
        let kernel = crate::sim::kernels::KernelDispatch::from(Mat::new(*kraus_matrix));

        single_qubit_row_pass(
            &kernel,
            state.matrix(),
            &mut left_mul_buffer,
            target_index,
            n_qubits,
            &pair,
        );
        single_qubit_column_pass(
            &kernel.conj_kernel(),
            &left_mul_buffer,
            &mut right_mul_buffer,
            target_index,
            n_qubits,
            &pair,
        );

        accumulator += &right_mul_buffer;
    }

    state.matrix_mut().assign(&accumulator);
    Ok(())
}

fn adjoint(matrix: &Array2<C>) -> Array2<C> {
    matrix.t().mapv(|entry| entry.conj())
}

/// A Kraus channel over the whole state, stored as dense matrices. The
/// matrices may be rectangular: `cols` is the input dimension and `rows` the
/// output dimension, both powers of two.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiQubitKrausChannel {
    kraus_matrices: Vec<Array2<C>>,
}

impl MultiQubitKrausChannel {
    pub fn new(kraus_matrices: Vec<Array2<C>>) -> Result<Self> {
        Self::with_tolerance(kraus_matrices, COMPLEX_ALMOST_EQ_TOLERANCE_SQ)
    }

    pub fn with_tolerance(kraus_matrices: Vec<Array2<C>>, tolerance: R) -> Result<Self> {
        let channel = Self::new_unchecked(kraus_matrices)?;

        let n_input_states = channel.kraus_matrices[0].ncols();
        let mut total = Array2::<C>::zeros((n_input_states, n_input_states));
        for matrix in &channel.kraus_matrices {
            total += &adjoint(matrix).dot(matrix);
        }

        let identity = Array2::<C>::eye(n_input_states);
        let completeness_holds = total
            .iter()
            .zip(identity.iter())
            .all(|(left, right)| crate::math::almost_eq(*left, *right, tolerance));

        if !completeness_holds {
            return Err(Error::InvalidKrausChannel(
                "the Kraus matrices do not sum to the identity".to_string(),
            ));
        }

        Ok(channel)
    }

    pub fn new_unchecked(kraus_matrices: Vec<Array2<C>>) -> Result<Self> {
        if kraus_matrices.is_empty() {
            return Err(Error::InvalidKrausChannel(
                "a Kraus channel needs at least one matrix".to_string(),
            ));
        }

        let (rows, cols) = kraus_matrices[0].dim();

        if kraus_matrices.iter().any(|matrix| matrix.dim() != (rows, cols)) {
            return Err(Error::InvalidKrausChannel(
                "all Kraus matrices must have the same shape".to_string(),
            ));
        }

        if !is_power_of_2(rows) || !is_power_of_2(cols) {
            return Err(Error::InvalidKrausChannel(
                "Kraus matrix dimensions must be powers of two".to_string(),
            ));
        }

        Ok(Self { kraus_matrices })
    }

    pub fn kraus_matrices(&self) -> &[Array2<C>] {
        &self.kraus_matrices
    }
}

/// Apply a multi-qubit Kraus channel; a rectangular channel changes the
/// number of qubits of the state.
pub fn apply_multi_qubit_kraus_channel(
    state: &mut DensityMatrix,
    channel: &MultiQubitKrausChannel,
) -> Result<()> {
    let (rows, cols) = channel.kraus_matrices()[0].dim();

    if cols != state.n_states() {
        return Err(Error::InvalidKrausChannel(format!(
            "channel expects {} input states but the state has {}",
            cols,
            state.n_states()
        )));
    }

    let mut accumulator = Array2::<C>::zeros((rows, rows));
    for kraus_matrix in channel.kraus_matrices() {
        let left = kraus_matrix.dot(state.matrix());
        accumulator += &left.dot(&adjoint(kraus_matrix));
    }

    *state = DensityMatrix::from_matrix_unchecked(accumulator)?;
    Ok(())
}

/// The four single-qubit Pauli operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauliOp {
    I,
    X,
    Y,
    Z,
}

fn pauli_matrix(op: PauliOp) -> Matrix2X2 {
    match op {
        PauliOp::I => i_gate(),
        PauliOp::X => x_gate(),
        PauliOp::Y => y_gate(),
        PauliOp::Z => z_gate(),
    }
}

/// A probability-weighted mixture of Pauli conjugations on one qubit:
/// `rho -> sum_i p_i P_i rho P_i`.
#[derive(Clone, Debug, PartialEq)]
pub struct PauliChannel {
    weighted_paulis: Vec<(R, PauliOp)>,
    target_index: N,
}

impl PauliChannel {
    pub fn new(weighted_paulis: Vec<(R, PauliOp)>, target_index: N) -> Result<Self> {
        Self::with_tolerance(weighted_paulis, target_index, COMPLEX_ALMOST_EQ_TOLERANCE_SQ)
    }

    pub fn with_tolerance(
        weighted_paulis: Vec<(R, PauliOp)>,
        target_index: N,
        tolerance: R,
    ) -> Result<Self> {
        if weighted_paulis.is_empty() {
            return Err(Error::InvalidKrausChannel(
                "a Pauli channel needs at least one term".to_string(),
            ));
        }

        if weighted_paulis.iter().any(|&(probability, _)| probability < 0.0) {
            return Err(Error::InvalidKrausChannel(
                "Pauli channel probabilities must be non-negative".to_string(),
            ));
        }

        let total: R = weighted_paulis.iter().map(|&(probability, _)| probability).sum();
        if (total - 1.0).abs() > tolerance {
            return Err(Error::InvalidKrausChannel(format!(
                "Pauli channel probabilities sum to {} instead of 1",
                total
            )));
        }

        Ok(Self { weighted_paulis, target_index })
    }

    pub fn weighted_paulis(&self) -> &[(R, PauliOp)] {
        &self.weighted_paulis
    }

    pub fn target_index(&self) -> N {
        self.target_index
    }

    /// The equivalent Kraus channel with `K_i = sqrt(p_i) P_i`.
    pub fn to_kraus_channel(&self) -> OneQubitKrausChannel {
        let kraus_matrices = self
            .weighted_paulis
            .iter()
            .map(|&(probability, op)| pauli_matrix(op) * probability.sqrt())
            .collect();

        OneQubitKrausChannel::new_unchecked(kraus_matrices, self.target_index)
            .expect("a validated Pauli channel has at least one term")
    }
}

/// Apply a Pauli channel to `state` as the convex sum of conjugations.
pub fn apply_pauli_channel(state: &mut DensityMatrix, channel: &PauliChannel) -> Result<()> {
    apply_one_qubit_kraus_channel(state, &channel.to_kraus_channel())
}
