//! Mid-circuit measurement: Born probabilities, a seeded coin flip, and the
//! collapse-and-renormalise updates for both state representations.

use rand::{prelude::Distribution, rngs::StdRng};
use rand_distr::WeightedIndex;

use crate::error::{Error, Result};
use crate::math::{N, R};
use crate::state::{DensityMatrix, Statevector};

use super::pairs::SingleQubitGatePairGenerator;

pub(crate) fn probabilities_of_collapsed_states(state: &Statevector, target_index: N) -> (R, R) {
    let mut pair_iterator = SingleQubitGatePairGenerator::new(target_index, state.n_qubits());
    pair_iterator.set_state(0);

    let mut prob_of_0_states = 0.0;
    let mut prob_of_1_states = 0.0;

    for _ in 0..pair_iterator.size() {
        let (state0_index, state1_index) = pair_iterator.next();

        prob_of_0_states += state[state0_index].norm_sqr();
        prob_of_1_states += state[state1_index].norm_sqr();
    }

    (prob_of_0_states, prob_of_1_states)
}

fn collapse_and_renormalize(
    state: &mut Statevector,
    target_index: N,
    collapsed_state: u8,
    norm_of_surviving_state: R,
) {
    let mut pair_iterator = SingleQubitGatePairGenerator::new(target_index, state.n_qubits());
    pair_iterator.set_state(0);

    for _ in 0..pair_iterator.size() {
        let (state0_index, state1_index) = pair_iterator.next();

        if collapsed_state == 0 {
            state[state0_index] = state[state0_index].scale(norm_of_surviving_state);
            state[state1_index] = crate::math::C_ZERO;
        } else {
            state[state0_index] = crate::math::C_ZERO;
            state[state1_index] = state[state1_index].scale(norm_of_surviving_state);
        }
    }
}

/// Measure `target_index`, collapse the statevector, and return the outcome.
///
/// The survivors are rescaled by `1/sqrt(P)` so the state stays normalised.
pub(crate) fn simulate_measurement(
    state: &mut Statevector,
    target_index: N,
    prng: &mut StdRng,
) -> Result<u8> {
    let (prob_of_0_states, prob_of_1_states) =
        probabilities_of_collapsed_states(state, target_index);

    let coin_flipper = WeightedIndex::new([prob_of_0_states, prob_of_1_states])
        .map_err(|_| Error::InvalidCircuitState("measured a state with zero norm".to_string()))?;
    let collapsed_state = coin_flipper.sample(prng) as u8;

    let surviving_probability = if collapsed_state == 0 {
        prob_of_0_states
    } else {
        prob_of_1_states
    };
    let norm = (1.0 / surviving_probability).sqrt();

    collapse_and_renormalize(state, target_index, collapsed_state, norm);

    Ok(collapsed_state)
}

pub(crate) fn probabilities_of_collapsed_states_dm(
    state: &DensityMatrix,
    target_index: N,
) -> (R, R) {
    let mut pair_iterator = SingleQubitGatePairGenerator::new(target_index, state.n_qubits());
    pair_iterator.set_state(0);

    let mut prob_of_0_states = 0.0;
    let mut prob_of_1_states = 0.0;

    // the Born probabilities live on the diagonal
    for _ in 0..pair_iterator.size() {
        let (state0_index, state1_index) = pair_iterator.next();

        prob_of_0_states += state.matrix()[(state0_index, state0_index)].re;
        prob_of_1_states += state.matrix()[(state1_index, state1_index)].re;
    }

    (prob_of_0_states, prob_of_1_states)
}

fn collapse_and_renormalize_dm(
    state: &mut DensityMatrix,
    target_index: N,
    collapsed_state: u8,
    survivor_scale: R,
) {
    let n_qubits = state.n_qubits();
    let matrix = state.matrix_mut();

    let mut col_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
    col_iterator.set_state(0);

    for _ in 0..col_iterator.size() {
        let (i_col0, i_col1) = col_iterator.next();

        let mut row_iterator = SingleQubitGatePairGenerator::new(target_index, n_qubits);
        row_iterator.set_state(0);

        for _ in 0..row_iterator.size() {
            let (i_row0, i_row1) = row_iterator.next();

            matrix[(i_row1, i_col0)] = crate::math::C_ZERO;
            matrix[(i_row0, i_col1)] = crate::math::C_ZERO;

            if collapsed_state == 0 {
                matrix[(i_row0, i_col0)] = matrix[(i_row0, i_col0)].scale(survivor_scale);
                matrix[(i_row1, i_col1)] = crate::math::C_ZERO;
            } else {
                matrix[(i_row0, i_col0)] = crate::math::C_ZERO;
                matrix[(i_row1, i_col1)] = matrix[(i_row1, i_col1)].scale(survivor_scale);
            }
        }
    }
}

/// Measure `target_index` on a density matrix: project onto the outcome's
/// block and rescale it by `1/P` so the trace stays one.
pub(crate) fn simulate_measurement_dm(
    state: &mut DensityMatrix,
    target_index: N,
    prng: &mut StdRng,
) -> Result<u8> {
    let (prob_of_0_states, prob_of_1_states) =
        probabilities_of_collapsed_states_dm(state, target_index);

    let coin_flipper = WeightedIndex::new([prob_of_0_states, prob_of_1_states])
        .map_err(|_| Error::InvalidCircuitState("measured a state with zero trace".to_string()))?;
    let collapsed_state = coin_flipper.sample(prng) as u8;

    let surviving_probability = if collapsed_state == 0 {
        prob_of_0_states
    } else {
        prob_of_1_states
    };

    collapse_and_renormalize_dm(state, target_index, collapsed_state, 1.0 / surviving_probability);

    Ok(collapsed_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{C, C_ONE, FRAC_1_SQRT_2};
    use crate::sim::build_prng;
    use crate::state::{statevector_to_density_matrix, Endian};

    fn plus_zero_state() -> Statevector {
        let rt = C::new(FRAC_1_SQRT_2, 0.0);
        Statevector::from_coefficients(vec![rt, rt, crate::math::C_ZERO, crate::math::C_ZERO], Endian::Little)
            .unwrap()
    }

    #[test]
    fn probabilities_of_a_plus_state() {
        let state = plus_zero_state();

        let (p0, p1) = probabilities_of_collapsed_states(&state, 0);
        assert!((p0 - 0.5).abs() < 1e-12);
        assert!((p1 - 0.5).abs() < 1e-12);

        let (p0, p1) = probabilities_of_collapsed_states(&state, 1);
        assert!((p0 - 1.0).abs() < 1e-12);
        assert!(p1.abs() < 1e-12);
    }

    #[test]
    fn collapse_renormalises_the_survivors() {
        let mut prng = build_prng(Some(1234));
        let mut state = plus_zero_state();

        let outcome = simulate_measurement(&mut state, 0, &mut prng).unwrap();

        let survivor = state[outcome as usize];
        assert!((survivor - C_ONE).norm() < 1e-12);
        assert!(state[1 - outcome as usize].norm() < 1e-12);
    }

    #[test]
    fn deterministic_measurement_on_a_basis_state() {
        let mut prng = build_prng(None);
        let mut state = Statevector::from_bitstring("1", Endian::Little).unwrap();

        let outcome = simulate_measurement(&mut state, 0, &mut prng).unwrap();
        assert_eq!(outcome, 1);
        assert!((state[1] - C_ONE).norm() < 1e-12);
    }

    #[test]
    fn density_matrix_measurement_keeps_unit_trace() {
        let mut prng = build_prng(Some(77));
        let mut rho = statevector_to_density_matrix(&plus_zero_state());

        let (p0, p1) = probabilities_of_collapsed_states_dm(&rho, 0);
        assert!((p0 - 0.5).abs() < 1e-12);
        assert!((p1 - 0.5).abs() < 1e-12);

        let outcome = simulate_measurement_dm(&mut rho, 0, &mut prng).unwrap();

        assert!((rho.trace() - C_ONE).norm() < 1e-12);
        let survivor_index = outcome as usize;
        assert!((rho.matrix()[(survivor_index, survivor_index)] - C_ONE).norm() < 1e-12);
    }
}
