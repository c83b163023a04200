use crate::error::{Error, Result};
use crate::math::{tolerance::PROJECTION_NORMALIZATION_TOLERANCE, C, N, R};

use super::Statevector;

fn is_index_set(index: N, value: N) -> bool {
    value & (1 << index) != 0
}

fn all_indices_match(qubit_indices: &[N], expected_measurements: &[u8], value: N) -> bool {
    qubit_indices
        .iter()
        .zip(expected_measurements)
        .all(|(&index, &expected)| u8::from(is_index_set(index, value)) == expected)
}

/// Project `statevector` onto the subspace where the qubits at
/// `qubit_indices` hold the bit values in `expected_measurements`, dropping
/// the projected qubits and renormalising the survivors.
///
/// Fails with `DegenerateProjection` if the surviving norm is below
/// `minimum_norm_tolerance`.
pub fn project_statevector(
    statevector: &Statevector,
    qubit_indices: &[N],
    expected_measurements: &[u8],
    minimum_norm_tolerance: R,
) -> Result<Statevector> {
    if qubit_indices.len() != expected_measurements.len() {
        return Err(Error::InvalidCircuitState(
            "mismatch between the number of qubit indices and expected measurements".to_string(),
        ));
    }

    if !expected_measurements.iter().all(|&bit| bit == 0 || bit == 1) {
        return Err(Error::InvalidCircuitState(
            "expected measurements must all be 0 or 1".to_string(),
        ));
    }

    let n_qubits = statevector.n_qubits();
    for &index in qubit_indices {
        if index >= n_qubits {
            return Err(Error::OutOfRangeQubit { index, n_qubits });
        }
    }

    if qubit_indices.len() >= n_qubits {
        return Err(Error::InvalidCircuitState(
            "cannot project away every qubit of a statevector".to_string(),
        ));
    }

    let mut projected: Vec<C> = Vec::with_capacity(1 << (n_qubits - qubit_indices.len()));
    for value in 0..statevector.n_states() {
        if all_indices_match(qubit_indices, expected_measurements, value) {
            projected.push(statevector[value]);
        }
    }

    let norm_sqr: R = projected.iter().map(|c| c.norm_sqr()).sum();
    if norm_sqr < minimum_norm_tolerance {
        return Err(Error::DegenerateProjection);
    }

    let norm = norm_sqr.sqrt();
    for amplitude in &mut projected {
        *amplitude /= norm;
    }

    Ok(Statevector::from_parts_unchecked(
        n_qubits - qubit_indices.len(),
        projected,
    ))
}

/// Projection with the default minimum-norm tolerance.
pub fn project_statevector_default(
    statevector: &Statevector,
    qubit_indices: &[N],
    expected_measurements: &[u8],
) -> Result<Statevector> {
    project_statevector(
        statevector,
        qubit_indices,
        expected_measurements,
        PROJECTION_NORMALIZATION_TOLERANCE,
    )
}
