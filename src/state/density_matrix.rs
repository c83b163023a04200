use ndarray::Array2;

use crate::error::{Error, Result};
use crate::math::{is_power_of_2, log_2_int, pow_2_int, tolerance::*, C, C_ONE, C_ZERO, N, R};
use crate::sim::pairs::SingleQubitGatePairGenerator;

use super::{bitstring_to_state_index, Endian, Statevector};

/// A possibly-mixed quantum state: a dense Hermitian, positive-semidefinite,
/// trace-one matrix over the little-endian basis layout.
///
/// The validating constructor checks all of those invariants; the unchecked
/// constructor is for intermediate products the engines have just computed
/// and only verifies the shape.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityMatrix {
    n_qubits: N,
    matrix: Array2<C>,
}

fn check_shape(matrix: &Array2<C>) -> Result<N> {
    let (rows, cols) = matrix.dim();

    if rows == 0 {
        return Err(Error::InvalidDensityMatrix("matrix has size 0 x 0".to_string()));
    }

    if rows != cols {
        return Err(Error::InvalidDensityMatrix(format!(
            "matrix is not square: {} x {}",
            rows, cols
        )));
    }

    if !is_power_of_2(rows) || rows < 2 {
        return Err(Error::InvalidDensityMatrix(format!(
            "matrix size {} is not a power of two with at least one qubit",
            rows
        )));
    }

    Ok(log_2_int(rows))
}

fn check_trace_of_one(matrix: &Array2<C>, tolerance: R) -> Result<()> {
    let trace: C = matrix.diag().sum();

    if (trace - C_ONE).norm_sqr() > tolerance {
        return Err(Error::InvalidDensityMatrix(format!("trace is {} instead of 1", trace)));
    }

    Ok(())
}

fn check_hermitian(matrix: &Array2<C>, tolerance: R) -> Result<()> {
    let size = matrix.nrows();

    for row in 0..size {
        for col in row..size {
            if (matrix[(row, col)] - matrix[(col, row)].conj()).norm_sqr() > tolerance {
                return Err(Error::InvalidDensityMatrix("matrix is not Hermitian".to_string()));
            }
        }
    }

    Ok(())
}

/// LDL^T decomposition of a Hermitian matrix; positive semidefinite iff every
/// pivot is non-negative (to tolerance) and zero pivots have empty columns.
fn check_positive_semi_definite(matrix: &Array2<C>, tolerance: R) -> Result<()> {
    let size = matrix.nrows();

    let mut lower = Array2::<C>::zeros((size, size));
    let mut diagonal = vec![0.0; size];

    for j in 0..size {
        let mut pivot = matrix[(j, j)].re;
        for k in 0..j {
            pivot -= lower[(j, k)].norm_sqr() * diagonal[k];
        }

        if pivot < -tolerance {
            return Err(Error::InvalidDensityMatrix(
                "matrix is not positive semidefinite".to_string(),
            ));
        }

        diagonal[j] = pivot;
        lower[(j, j)] = C_ONE;

        for i in (j + 1)..size {
            let mut entry = matrix[(i, j)];
            for k in 0..j {
                entry -= lower[(i, k)] * lower[(j, k)].conj() * diagonal[k];
            }

            if pivot.abs() <= tolerance {
                // a zero pivot only stays positive semidefinite if the rest
                // of its column vanishes as well
                if entry.norm_sqr() > tolerance {
                    return Err(Error::InvalidDensityMatrix(
                        "matrix is not positive semidefinite".to_string(),
                    ));
                }
                lower[(i, j)] = C_ZERO;
            } else {
                lower[(i, j)] = entry / pivot;
            }
        }
    }

    Ok(())
}

impl DensityMatrix {
    /// The projector onto |00...0>.
    pub fn new(n_qubits: N) -> Result<Self> {
        if n_qubits == 0 {
            return Err(Error::InvalidDensityMatrix(
                "a density matrix needs at least one qubit".to_string(),
            ));
        }

        let n_states = pow_2_int(n_qubits);
        let mut matrix = Array2::<C>::zeros((n_states, n_states));
        matrix[(0, 0)] = C_ONE;

        Ok(Self { n_qubits, matrix })
    }

    /// A fully validated density matrix, with the default tolerances.
    pub fn from_matrix(matrix: Array2<C>) -> Result<Self> {
        Self::from_matrix_with_tolerances(
            matrix,
            DENSITY_MATRIX_TRACE_TOLERANCE,
            MATRIX_HERMITIAN_TOLERANCE,
        )
    }

    pub fn from_matrix_with_tolerances(
        matrix: Array2<C>,
        trace_tolerance: R,
        hermitian_tolerance: R,
    ) -> Result<Self> {
        let n_qubits = check_shape(&matrix)?;
        check_trace_of_one(&matrix, trace_tolerance)?;
        check_hermitian(&matrix, hermitian_tolerance)?;
        check_positive_semi_definite(&matrix, hermitian_tolerance)?;

        Ok(Self { n_qubits, matrix })
    }

    /// Store the matrix without validating the density-matrix invariants;
    /// only the shape is checked so the qubit count is well defined.
    pub fn from_matrix_unchecked(matrix: Array2<C>) -> Result<Self> {
        let n_qubits = check_shape(&matrix)?;
        Ok(Self { n_qubits, matrix })
    }

    /// The diagonal projector onto the basis state named by `bitstring`.
    pub fn from_bitstring(bitstring: &str, input_endian: Endian) -> Result<Self> {
        let n_qubits = bitstring.len();
        let index = bitstring_to_state_index(bitstring, input_endian)?;

        let n_states = pow_2_int(n_qubits);
        let mut matrix = Array2::<C>::zeros((n_states, n_states));
        matrix[(index, index)] = C_ONE;

        Ok(Self { n_qubits, matrix })
    }

    pub fn n_qubits(&self) -> N {
        self.n_qubits
    }

    pub fn n_states(&self) -> N {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Array2<C> {
        &self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Array2<C> {
        &mut self.matrix
    }

    pub fn trace(&self) -> C {
        self.matrix.diag().sum()
    }

    pub fn trace_of_square(&self) -> C {
        // Tr(rho^2) without forming the product: rho is Hermitian, so the
        // trace is the squared Frobenius norm
        self.matrix.iter().map(|entry| entry.norm_sqr()).sum::<R>().into()
    }

    /// A state is pure iff Tr(rho^2) = 1.
    pub fn is_pure(&self, tolerance: R) -> bool {
        (self.trace_of_square() - C_ONE).norm_sqr() <= tolerance
    }

    pub fn almost_eq(&self, other: &Self, tolerance_sq: R) -> bool {
        self.n_qubits == other.n_qubits
            && self
                .matrix
                .iter()
                .zip(other.matrix.iter())
                .all(|(left, right)| crate::math::almost_eq(*left, *right, tolerance_sq))
    }
}

/// The rank-one density matrix `rho_ij = psi_i * conj(psi_j)`.
pub fn statevector_to_density_matrix(statevector: &Statevector) -> DensityMatrix {
    let n_states = statevector.n_states();

    let matrix = Array2::from_shape_fn((n_states, n_states), |(row, col)| {
        statevector[row] * statevector[col].conj()
    });

    DensityMatrix { n_qubits: statevector.n_qubits(), matrix }
}

/// Kronecker product in the little-endian layout: the left state occupies the
/// low bits of the combined indices.
pub fn tensor_product(left: &DensityMatrix, right: &DensityMatrix) -> DensityMatrix {
    let n_qubits = left.n_qubits() + right.n_qubits();
    let left_states = left.n_states();
    let n_states = pow_2_int(n_qubits);

    let matrix = Array2::from_shape_fn((n_states, n_states), |(row, col)| {
        let left_entry = left.matrix()[(row % left_states, col % left_states)];
        let right_entry = right.matrix()[(row / left_states, col / left_states)];
        left_entry * right_entry
    });

    DensityMatrix { n_qubits, matrix }
}

/// Trace out the given qubits, one at a time in descending index order, using
/// the single-qubit pair generator to walk the surviving submatrix.
pub fn partial_trace(density_matrix: &DensityMatrix, qubit_indices: &[N]) -> Result<DensityMatrix> {
    let n_qubits = density_matrix.n_qubits();

    for &index in qubit_indices {
        if index >= n_qubits {
            return Err(Error::OutOfRangeQubit { index, n_qubits });
        }
    }

    if qubit_indices.len() >= n_qubits {
        return Err(Error::InvalidDensityMatrix(
            "cannot trace out every qubit of a density matrix".to_string(),
        ));
    }

    let mut sorted_indices = qubit_indices.to_vec();
    sorted_indices.sort_unstable_by(|a, b| b.cmp(a));
    sorted_indices.dedup();

    let mut current = density_matrix.matrix().clone();

    for (i, &i_qubit) in sorted_indices.iter().enumerate() {
        let n_qubits_current = n_qubits - i;
        let new_size = pow_2_int(n_qubits_current - 1);

        let mut col_pair_iter = SingleQubitGatePairGenerator::new(i_qubit, n_qubits_current);
        let mut reduced = Array2::<C>::zeros((new_size, new_size));

        col_pair_iter.set_state(0);
        for i_col in 0..new_size {
            let (i_col0, i_col1) = col_pair_iter.next();

            let mut row_pair_iter = SingleQubitGatePairGenerator::new(i_qubit, n_qubits_current);
            row_pair_iter.set_state(0);
            for i_row in 0..new_size {
                let (i_row0, i_row1) = row_pair_iter.next();

                reduced[(i_row, i_col)] = current[(i_row0, i_col0)] + current[(i_row1, i_col1)];
            }
        }

        current = reduced;
    }

    DensityMatrix::from_matrix(current)
}
