use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::math::{is_power_of_2, log_2_int, pow_2_int, tolerance::*, C, C_ONE, C_ZERO, N, R};

use super::{bitstring_to_state_index, Endian};

/// A pure quantum state: `2^n` complex amplitudes over the little-endian
/// basis layout, unit norm on validated construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Statevector {
    n_qubits: N,
    coefficients: Vec<C>,
}

impl Statevector {
    /// The all-zeros computational state |00...0>.
    pub fn new(n_qubits: N) -> Result<Self> {
        if n_qubits == 0 {
            return Err(Error::InvalidCircuitState(
                "a statevector needs at least one qubit".to_string(),
            ));
        }

        let mut coefficients = vec![C_ZERO; pow_2_int(n_qubits)];
        coefficients[0] = C_ONE;

        Ok(Self { n_qubits, coefficients })
    }

    /// A validated statevector from raw coefficients, with the default
    /// normalization tolerance.
    pub fn from_coefficients(coefficients: Vec<C>, input_endian: Endian) -> Result<Self> {
        Self::from_coefficients_with_tolerance(
            coefficients,
            input_endian,
            CONSTRUCTION_NORMALIZATION_TOLERANCE,
        )
    }

    pub fn from_coefficients_with_tolerance(
        coefficients: Vec<C>,
        input_endian: Endian,
        normalization_tolerance: R,
    ) -> Result<Self> {
        let n_states = coefficients.len();
        if !is_power_of_2(n_states) || n_states < 2 {
            return Err(Error::InvalidCircuitState(format!(
                "a statevector needs a power-of-two number of coefficients, got {}",
                n_states
            )));
        }

        let norm_sqr: R = coefficients.iter().map(|c| c.norm_sqr()).sum();
        if (norm_sqr - 1.0).abs() > normalization_tolerance {
            return Err(Error::NonNormalisedCoefficients(norm_sqr.sqrt()));
        }

        let n_qubits = log_2_int(n_states);
        let mut state = Self { n_qubits, coefficients };

        if input_endian == Endian::Big {
            state.perform_endian_flip_on_coefficients();
        }

        Ok(state)
    }

    /// The computational basis state named by `bitstring`.
    pub fn from_bitstring(bitstring: &str, input_endian: Endian) -> Result<Self> {
        let n_qubits = bitstring.len();
        let index = bitstring_to_state_index(bitstring, input_endian)?;

        let mut coefficients = vec![C_ZERO; pow_2_int(n_qubits)];
        coefficients[index] = C_ONE;

        Ok(Self { n_qubits, coefficients })
    }

    pub(crate) fn from_parts_unchecked(n_qubits: N, coefficients: Vec<C>) -> Self {
        Self { n_qubits, coefficients }
    }

    pub fn n_qubits(&self) -> N {
        self.n_qubits
    }

    pub fn n_states(&self) -> N {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[C] {
        &self.coefficients
    }

    /// The amplitude at the basis state named by `bitstring`.
    pub fn at(&self, bitstring: &str, endian: Endian) -> Result<C> {
        if bitstring.len() != self.n_qubits {
            return Err(Error::InvalidBitstring(bitstring.to_string()));
        }

        let index = bitstring_to_state_index(bitstring, endian)?;
        Ok(self.coefficients[index])
    }

    pub fn almost_eq(&self, other: &Self, tolerance_sq: R) -> bool {
        self.n_qubits == other.n_qubits
            && self
                .coefficients
                .iter()
                .zip(&other.coefficients)
                .all(|(left, right)| crate::math::almost_eq(*left, *right, tolerance_sq))
    }

    fn perform_endian_flip_on_coefficients(&mut self) {
        let n_qubits = self.n_qubits;
        for index in 0..self.n_states() {
            let flipped = crate::math::endian_flip(index, n_qubits);
            if index < flipped {
                self.coefficients.swap(index, flipped);
            }
        }
    }
}

impl Index<N> for Statevector {
    type Output = C;

    fn index(&self, index: N) -> &C {
        &self.coefficients[index]
    }
}

impl IndexMut<N> for Statevector {
    fn index_mut(&mut self, index: N) -> &mut C {
        &mut self.coefficients[index]
    }
}

/// Kronecker product in the little-endian layout: the left state occupies the
/// low bits of the combined index.
pub fn tensor_product(left: &Statevector, right: &Statevector) -> Statevector {
    let n_qubits = left.n_qubits() + right.n_qubits();
    let left_states = left.n_states();

    let coefficients = (0..pow_2_int(n_qubits))
        .map(|index| {
            let left_index = index % left_states;
            let right_index = index / left_states;
            left[left_index] * right[right_index]
        })
        .collect();

    Statevector::from_parts_unchecked(n_qubits, coefficients)
}

pub fn inner_product(bra_state: &Statevector, ket_state: &Statevector) -> Result<C> {
    if bra_state.n_qubits() != ket_state.n_qubits() {
        return Err(Error::InvalidCircuitState(
            "inner product requires states with matching qubit counts".to_string(),
        ));
    }

    Ok(bra_state
        .coefficients()
        .iter()
        .zip(ket_state.coefficients())
        .map(|(bra, ket)| bra.conj() * ket)
        .sum())
}

pub fn inner_product_norm_squared(left: &Statevector, right: &Statevector) -> Result<R> {
    Ok(inner_product(left, right)?.norm_sqr())
}
