//! Shot measurements over a finished state: raw probabilities, a
//! cumulative-sum sampler, and counts in several shapes.

use std::collections::BTreeMap;

use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng};

use crate::error::Result;
use crate::math::approx_cmp::approx_cmp;
use crate::math::{is_power_of_2, log_2_int, N, R};
use crate::sim::build_prng;
use crate::state::{
    build_marginal_bitmask, state_index_to_bitstring_marginal, Endian, Statevector,
};

/// The fraction of the final cumulative gap subtracted from the sampler's
/// upper bound, so a draw can never land past the last valid state.
const CUMULATIVE_END_OFFSET_FRACTION: R = 1e-8;

/// `|a_i|^2` for every basis index.
pub fn calculate_probabilities_raw(state: &Statevector) -> Vec<R> {
    state.coefficients().iter().map(|amplitude| amplitude.norm_sqr()).collect()
}

fn calculate_cumulative_sum(probabilities: &[R]) -> Vec<R> {
    let mut cumulative = Vec::with_capacity(probabilities.len());
    let mut running_total = 0.0;

    for probability in probabilities {
        running_total += probability;
        cumulative.push(running_total);
    }

    cumulative
}

/// The offset keeping draws strictly inside the distribution: a fraction of
/// the gap between the last cumulative value and the largest strictly
/// smaller one.
fn cumulative_end_offset(cumulative_probabilities: &[R]) -> R {
    let last = *cumulative_probabilities.last().expect("cumulative sums are never empty");

    let second_last = cumulative_probabilities
        .iter()
        .rev()
        .find(|&&value| !approx_cmp(value, last))
        .copied()
        .unwrap_or(0.0);

    (last - second_last) * CUMULATIVE_END_OFFSET_FRACTION
}

/// Samples basis-state indices from a probability distribution: O(N) build,
/// O(log N) per draw via a lower-bound search on the cumulative sums.
pub struct ProbabilitySampler {
    cumulative: Vec<R>,
    uniform: Uniform<R>,
    prng: StdRng,
}

impl ProbabilitySampler {
    pub fn new(probabilities: &[R], seed: Option<u64>) -> Self {
        let cumulative = calculate_cumulative_sum(probabilities);

        let max_probability = *cumulative.last().expect("cumulative sums are never empty");
        let offset = cumulative_end_offset(&cumulative);
        let uniform = Uniform::new(0.0, max_probability - offset);

        Self { cumulative, uniform, prng: build_prng(seed) }
    }

    pub fn sample(&mut self) -> N {
        let probability = self.uniform.sample(&mut self.prng);

        // lower bound: the first cumulative entry >= the draw
        self.cumulative.partition_point(|&value| value < probability)
    }
}

/// Sample `n_shots` collapsed basis-state indices.
pub fn perform_measurements_as_memory(
    probabilities_raw: &[R],
    n_shots: N,
    seed: Option<u64>,
) -> Vec<N> {
    let mut sampler = ProbabilitySampler::new(probabilities_raw, seed);
    (0..n_shots).map(|_| sampler.sample()).collect()
}

pub fn memory_to_counts(measurements: &[N]) -> BTreeMap<N, N> {
    let mut counts = BTreeMap::new();
    for &i_state in measurements {
        *counts.entry(i_state).or_insert(0) += 1;
    }

    counts
}

pub fn memory_to_fractions(measurements: &[N]) -> BTreeMap<N, R> {
    let n_measurements = measurements.len() as R;

    let mut fractions = BTreeMap::new();
    for &i_state in measurements {
        *fractions.entry(i_state).or_insert(0.0) += 1.0;
    }
    for fraction in fractions.values_mut() {
        *fraction /= n_measurements;
    }

    fractions
}

/// Shot counts keyed by basis-state index.
pub fn perform_measurements_as_counts_raw(
    probabilities_raw: &[R],
    n_shots: N,
    seed: Option<u64>,
) -> BTreeMap<N, N> {
    let mut sampler = ProbabilitySampler::new(probabilities_raw, seed);

    let mut counts = BTreeMap::new();
    for _ in 0..n_shots {
        *counts.entry(sampler.sample()).or_insert(0) += 1;
    }

    counts
}

/// Shot counts keyed by bitstring, with the qubits in `marginal_qubits`
/// marginalised out and rendered as `'x'`.
pub fn perform_measurements_as_counts_marginal(
    probabilities_raw: &[R],
    n_shots: N,
    marginal_qubits: &[N],
    seed: Option<u64>,
) -> Result<BTreeMap<String, N>> {
    if !is_power_of_2(probabilities_raw.len()) {
        return Err(crate::error::Error::InvalidCircuitState(
            "the number of probabilities must be a power of two".to_string(),
        ));
    }

    let n_qubits = log_2_int(probabilities_raw.len());
    let marginal_bitmask = build_marginal_bitmask(marginal_qubits, n_qubits)?;

    let mut sampler = ProbabilitySampler::new(probabilities_raw, seed);
    let mut counts = BTreeMap::new();

    // the internal layout of the state is little endian, so the
    // probabilities are as well
    for _ in 0..n_shots {
        let i_state = sampler.sample();
        let bitstring =
            state_index_to_bitstring_marginal(i_state, &marginal_bitmask, Endian::Little);
        *counts.entry(bitstring).or_insert(0) += 1;
    }

    Ok(counts)
}

/// Shot counts keyed by full bitstring.
pub fn perform_measurements_as_counts(
    state: &Statevector,
    n_shots: N,
    seed: Option<u64>,
) -> Result<BTreeMap<String, N>> {
    let probabilities_raw = calculate_probabilities_raw(state);
    perform_measurements_as_counts_marginal(&probabilities_raw, n_shots, &[], seed)
}
