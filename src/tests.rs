//! End-to-end scenarios exercising the builders, the decompositions and both
//! engines together.

use crate::math::{C_ONE, C_ZERO, FRAC_1_SQRT_2, PI};
use crate::prelude::*;
use crate::state::Endian::Little;

const TOL: R = 1e-12;

fn assert_amplitudes(state: &Statevector, expected: &[C]) {
    assert_eq!(state.n_states(), expected.len());
    for (index, &amplitude) in expected.iter().enumerate() {
        assert!(
            (state[index] - amplitude).norm() < 1e-9,
            "amplitude {} is {} but {} was expected",
            index,
            state[index],
            amplitude
        );
    }
}

fn norm_sqr_sum(state: &Statevector) -> R {
    state.coefficients().iter().map(|amplitude| amplitude.norm_sqr()).sum()
}

#[test]
fn hadamard_on_the_zero_state() {
    let mut circuit = QuantumCircuit::new(1);
    circuit.add_h_gate(0).unwrap();

    let mut state = Statevector::new(1).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    assert_amplitudes(&state, &[rt, rt]);
}

#[test]
fn bell_pair() {
    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();

    let mut state = Statevector::new(2).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    assert_amplitudes(&state, &[rt, C_ZERO, C_ZERO, rt]);
}

#[test]
fn ghz_state() {
    let mut circuit = QuantumCircuit::new(3);
    circuit.add_h_gate(0).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();
    circuit.add_cx_gate(0, 2).unwrap();

    let mut state = Statevector::new(3).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    let mut expected = vec![C_ZERO; 8];
    expected[0] = rt;
    expected[7] = rt;
    assert_amplitudes(&state, &expected);
}

#[test]
fn controlled_rotation_after_hadamard() {
    let theta = PI / 2.0;

    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_crx_gate(0, 1, theta).unwrap();

    let mut state = Statevector::new(2).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let rt = FRAC_1_SQRT_2;
    let cos = (theta / 2.0).cos();
    let sin = (theta / 2.0).sin();
    assert_amplitudes(
        &state,
        &[
            C::new(rt, 0.0),
            C::new(cos * rt, 0.0),
            C_ZERO,
            C::new(0.0, -sin * rt),
        ],
    );
}

#[test]
fn fourier_transform_of_the_zero_state_is_uniform() {
    let mut circuit = QuantumCircuit::new(3);
    apply_forward_fourier_transform(&mut circuit, &[0, 1, 2]).unwrap();

    let mut state = Statevector::new(3).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let amplitude = C::new(1.0 / (8.0f64).sqrt(), 0.0);
    assert_amplitudes(&state, &vec![amplitude; 8]);

    let mut inverse = QuantumCircuit::new(3);
    apply_inverse_fourier_transform(&mut inverse, &[0, 1, 2]).unwrap();
    simulate(&inverse, &mut state, None).unwrap();

    let mut expected = vec![C_ZERO; 8];
    expected[0] = C_ONE;
    assert_amplitudes(&state, &expected);
}

#[test]
fn fourier_transform_locates_a_phase_gradient() {
    // QFT of |100> (little endian index 1) is a phase gradient over the
    // uniform superposition
    let mut circuit = QuantumCircuit::new(3);
    apply_forward_fourier_transform(&mut circuit, &[0, 1, 2]).unwrap();

    let mut state = Statevector::from_bitstring("100", Little).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    for index in 0..8 {
        assert!((state[index].norm() - 1.0 / (8.0f64).sqrt()).abs() < 1e-9);
    }

    assert!((norm_sqr_sum(&state) - 1.0).abs() < TOL);
}

#[test]
fn classically_conditioned_x_gate() {
    let mut subcircuit = QuantumCircuit::new(2);
    subcircuit.add_x_gate(1).unwrap();

    let mut circuit = QuantumCircuit::with_bits(2, 2);
    circuit.add_x_gate(0).unwrap();
    circuit.add_m_gate(0).unwrap();
    circuit.add_if_statement_on_bit(0, subcircuit).unwrap();

    let mut state = Statevector::new(2).unwrap();
    let mut simulator = StatevectorSimulator::new();
    simulator.run(&circuit, &mut state, None).unwrap();

    // both qubits end up set, the second bit is never measured
    let mut expected = vec![C_ZERO; 4];
    expected[0b11] = C_ONE;
    assert_amplitudes(&state, &expected);

    let register = simulator.classical_register().unwrap();
    assert_eq!(register.get(0), Some(1));
    assert_eq!(register.get(1), None);
}

#[test]
fn inverted_condition_leaves_the_partner_alone() {
    let mut subcircuit = QuantumCircuit::new(2);
    subcircuit.add_x_gate(1).unwrap();

    let mut circuit = QuantumCircuit::with_bits(2, 2);
    circuit.add_x_gate(0).unwrap();
    circuit.add_m_gate(0).unwrap();
    circuit.add_if_not_statement_on_bit(0, subcircuit).unwrap();

    let mut state = Statevector::new(2).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let mut expected = vec![C_ZERO; 4];
    expected[0b01] = C_ONE;
    assert_amplitudes(&state, &expected);
}

#[test]
fn if_else_executes_exactly_one_branch() {
    let mut if_branch = QuantumCircuit::new(1);
    if_branch.add_x_gate(0).unwrap();

    let mut else_branch = QuantumCircuit::new(1);
    else_branch.add_h_gate(0).unwrap();

    let mut circuit = QuantumCircuit::new(1);
    circuit.add_m_gate(0).unwrap();
    circuit.add_if_else_statement_on_bit(0, if_branch, else_branch).unwrap();

    // measuring |0> takes the else branch
    let mut state = Statevector::new(1).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    assert_amplitudes(&state, &[rt, rt]);
}

#[test]
fn every_unitary_gate_preserves_the_norm() {
    let mut circuit = QuantumCircuit::new(3);
    circuit.add_h_gate(0).unwrap();
    circuit.add_x_gate(1).unwrap();
    circuit.add_y_gate(2).unwrap();
    circuit.add_z_gate(0).unwrap();
    circuit.add_s_gate(1).unwrap();
    circuit.add_sdag_gate(2).unwrap();
    circuit.add_t_gate(0).unwrap();
    circuit.add_tdag_gate(1).unwrap();
    circuit.add_sx_gate(2).unwrap();
    circuit.add_sxdag_gate(0).unwrap();
    circuit.add_rx_gate(1, 0.3).unwrap();
    circuit.add_ry_gate(2, 1.1).unwrap();
    circuit.add_rz_gate(0, -0.6).unwrap();
    circuit.add_p_gate(1, 2.2).unwrap();
    circuit.add_ch_gate(0, 1).unwrap();
    circuit.add_cx_gate(1, 2).unwrap();
    circuit.add_cy_gate(2, 0).unwrap();
    circuit.add_cz_gate(0, 2).unwrap();
    circuit.add_cs_gate(1, 0).unwrap();
    circuit.add_csdag_gate(2, 1).unwrap();
    circuit.add_ct_gate(0, 1).unwrap();
    circuit.add_ctdag_gate(1, 2).unwrap();
    circuit.add_csx_gate(2, 0).unwrap();
    circuit.add_csxdag_gate(0, 1).unwrap();
    circuit.add_crx_gate(1, 2, 0.9).unwrap();
    circuit.add_cry_gate(2, 0, -1.4).unwrap();
    circuit.add_crz_gate(0, 1, 0.2).unwrap();
    circuit.add_cp_gate(1, 0, 2.8).unwrap();
    circuit.add_u_gate(matrices::t_gate(), 2).unwrap();
    circuit.add_cu_gate(matrices::sx_gate(), 2, 1).unwrap();

    let mut state = Statevector::new(3).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    assert!((norm_sqr_sum(&state) - 1.0).abs() < TOL);
}

#[test]
fn every_gate_composed_with_its_adjoint_is_identity() {
    // prepare a state with weight everywhere, then undo each gate with its
    // adjoint in reverse order
    let mut preparation = QuantumCircuit::new(2);
    preparation.add_h_gate(0).unwrap();
    preparation.add_ry_gate(1, 0.83).unwrap();
    preparation.add_crz_gate(0, 1, 0.31).unwrap();

    let mut prepared = Statevector::new(2).unwrap();
    simulate(&preparation, &mut prepared, None).unwrap();

    let theta = 1.234;
    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_h_gate(0).unwrap();
    circuit.add_s_gate(1).unwrap();
    circuit.add_sdag_gate(1).unwrap();
    circuit.add_t_gate(0).unwrap();
    circuit.add_tdag_gate(0).unwrap();
    circuit.add_sx_gate(1).unwrap();
    circuit.add_sxdag_gate(1).unwrap();
    circuit.add_rx_gate(0, theta).unwrap();
    circuit.add_rx_gate(0, -theta).unwrap();
    circuit.add_ry_gate(1, theta).unwrap();
    circuit.add_ry_gate(1, -theta).unwrap();
    circuit.add_rz_gate(0, theta).unwrap();
    circuit.add_rz_gate(0, -theta).unwrap();
    circuit.add_p_gate(1, theta).unwrap();
    circuit.add_p_gate(1, -theta).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();
    circuit.add_crx_gate(1, 0, theta).unwrap();
    circuit.add_crx_gate(1, 0, -theta).unwrap();

    let mut state = prepared.clone();
    simulate(&circuit, &mut state, None).unwrap();

    assert!(state.almost_eq(&prepared, TOL));
}

#[test]
fn toffoli_truth_table() {
    for input in 0..8usize {
        let mut circuit = QuantumCircuit::new(3);
        apply_toffoli(&mut circuit, (0, 1), 2).unwrap();

        let bitstring: String = (0..3).map(|k| if input >> k & 1 == 1 { '1' } else { '0' }).collect();
        let mut state = Statevector::from_bitstring(&bitstring, Little).unwrap();
        simulate(&circuit, &mut state, None).unwrap();

        let both_controls_set = input & 0b011 == 0b011;
        let expected_output = if both_controls_set { input ^ 0b100 } else { input };

        assert!(
            (state[expected_output] - C_ONE).norm() < 1e-9,
            "toffoli on input {:#05b} should give {:#05b}",
            input,
            expected_output
        );
    }
}

#[test]
fn control_swap_truth_table() {
    for input in 0..8usize {
        let mut circuit = QuantumCircuit::new(3);
        apply_control_swap(&mut circuit, 0, 1, 2).unwrap();

        let bitstring: String = (0..3).map(|k| if input >> k & 1 == 1 { '1' } else { '0' }).collect();
        let mut state = Statevector::from_bitstring(&bitstring, Little).unwrap();
        simulate(&circuit, &mut state, None).unwrap();

        let expected_output = if input & 1 == 1 {
            let bit1 = input >> 1 & 1;
            let bit2 = input >> 2 & 1;
            (input & 1) | (bit2 << 1) | (bit1 << 2)
        } else {
            input
        };

        assert!(
            (state[expected_output] - C_ONE).norm() < 1e-9,
            "control swap on input {:#05b} should give {:#05b}",
            input,
            expected_output
        );
    }
}

#[test]
fn multiplicity_controlled_x_acts_like_a_toffoli() {
    for input in 0..8usize {
        let mut toffoli = QuantumCircuit::new(3);
        apply_toffoli(&mut toffoli, (0, 1), 2).unwrap();

        let mut ladder = QuantumCircuit::new(3);
        apply_multiplicity_controlled_u_gate(&mut ladder, &matrices::x_gate(), 2, &[0, 1])
            .unwrap();

        let bitstring: String = (0..3).map(|k| if input >> k & 1 == 1 { '1' } else { '0' }).collect();

        let mut expected = Statevector::from_bitstring(&bitstring, Little).unwrap();
        simulate(&toffoli, &mut expected, None).unwrap();

        let mut state = Statevector::from_bitstring(&bitstring, Little).unwrap();
        simulate(&ladder, &mut state, None).unwrap();

        assert!(state.almost_eq(&expected, 1e-9));
    }
}

#[test]
fn three_control_ladder_flips_only_the_full_input() {
    for input in 0..16usize {
        let mut circuit = QuantumCircuit::new(4);
        apply_multiplicity_controlled_u_gate(&mut circuit, &matrices::x_gate(), 3, &[0, 1, 2])
            .unwrap();

        let bitstring: String = (0..4).map(|k| if input >> k & 1 == 1 { '1' } else { '0' }).collect();
        let mut state = Statevector::from_bitstring(&bitstring, Little).unwrap();
        simulate(&circuit, &mut state, None).unwrap();

        let expected_output = if input & 0b0111 == 0b0111 { input ^ 0b1000 } else { input };
        assert!(
            (state[expected_output] - C_ONE).norm() < 1e-9,
            "mcx on input {:#06b} should give {:#06b}",
            input,
            expected_output
        );
    }
}

#[test]
fn transpiled_circuits_evolve_states_identically() {
    let unitary = matrices::p_gate(0.6) * matrices::ry_gate(0.8) * matrices::rz_gate(1.3);

    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_u_gate(unitary, 1).unwrap();
    circuit.add_cu_gate(unitary, 0, 1).unwrap();

    let transpiled = transpile_to_primitive(&circuit, 1e-6).unwrap();

    let mut expected = Statevector::new(2).unwrap();
    simulate(&circuit, &mut expected, None).unwrap();

    let mut state = Statevector::new(2).unwrap();
    simulate(&transpiled, &mut state, None).unwrap();

    assert!(state.almost_eq(&expected, 1e-9));
}

#[test]
fn controlled_circuit_behaves_like_its_gate() {
    let mut subcircuit = QuantumCircuit::new(1);
    subcircuit.add_h_gate(0).unwrap();

    let controlled = make_controlled_circuit(&subcircuit, 2, 0, &[1]).unwrap();

    // control clear: nothing happens
    let mut state = Statevector::from_bitstring("00", Little).unwrap();
    simulate(&controlled, &mut state, None).unwrap();
    assert!((state[0b00] - C_ONE).norm() < 1e-9);

    // control set: the target picks up the Hadamard
    let mut state = Statevector::from_bitstring("10", Little).unwrap();
    simulate(&controlled, &mut state, None).unwrap();

    let rt = C::new(FRAC_1_SQRT_2, 0.0);
    assert!((state[0b01] - rt).norm() < 1e-9);
    assert!((state[0b11] - rt).norm() < 1e-9);
}

#[test]
fn measurement_outcomes_are_reproducible_for_a_seed() {
    let mut circuit = QuantumCircuit::new(4);
    circuit.add_h_gates([0, 1, 2, 3]).unwrap();
    circuit.add_m_gates([0, 1, 2, 3]).unwrap();

    let run = |seed| {
        let mut state = Statevector::new(4).unwrap();
        let mut simulator = StatevectorSimulator::new();
        simulator.run(&circuit, &mut state, Some(seed)).unwrap();
        simulator.classical_register().unwrap().bits().to_vec()
    };

    assert_eq!(run(2024), run(2024));
}

#[test]
fn density_matrix_simulation_of_a_channelled_bell_pair() {
    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();

    let mut rho = DensityMatrix::new(2).unwrap();
    simulate_density_matrix(&circuit, &mut rho, None).unwrap();

    // fully dephase qubit 0; the coherences die but the populations stay
    let channel = PauliChannel::new(vec![(0.5, PauliOp::I), (0.5, PauliOp::Z)], 0).unwrap();
    apply_pauli_channel(&mut rho, &channel).unwrap();

    assert!((rho.matrix()[(0, 0)].re - 0.5).abs() < 1e-9);
    assert!((rho.matrix()[(3, 3)].re - 0.5).abs() < 1e-9);
    assert!(rho.matrix()[(0, 3)].norm() < 1e-9);
    assert!(!rho.is_pure(1e-6));

    // tracing out either qubit leaves the maximally mixed state
    let reduced = partial_trace(&rho, &[1]).unwrap();
    assert!((reduced.matrix()[(0, 0)].re - 0.5).abs() < 1e-9);
    assert!((reduced.matrix()[(1, 1)].re - 0.5).abs() < 1e-9);
}

#[test]
fn sampled_counts_follow_the_bell_distribution() {
    let mut circuit = QuantumCircuit::new(2);
    circuit.add_h_gate(0).unwrap();
    circuit.add_cx_gate(0, 1).unwrap();

    let mut state = Statevector::new(2).unwrap();
    simulate(&circuit, &mut state, None).unwrap();

    let counts = perform_measurements_as_counts(&state, 4096, Some(17)).unwrap();

    assert_eq!(counts.keys().len(), 2);
    assert!(counts.contains_key("00"));
    assert!(counts.contains_key("11"));
    assert_eq!(counts.values().sum::<usize>(), 4096);

    // both outcomes should be comfortably populated
    assert!(counts["00"] > 1500);
    assert!(counts["11"] > 1500);
}

#[test]
fn tensor_product_is_linear_in_a_global_phase() {
    use crate::state::statevector::tensor_product;

    let phase = C::from_polar(1.0, 0.9);
    let rt = C::new(FRAC_1_SQRT_2, 0.0);

    let psi = Statevector::from_coefficients(vec![rt, rt * C::new(0.0, 1.0)], Little).unwrap();
    let phased_psi =
        Statevector::from_coefficients(vec![rt * phase, rt * C::new(0.0, 1.0) * phase], Little)
            .unwrap();
    let phi = Statevector::from_bitstring("10", Little).unwrap();

    let left = tensor_product(&phased_psi, &phi);
    let right = tensor_product(&psi, &phi);

    for index in 0..left.n_states() {
        assert!((left[index] - phase * right[index]).norm() < TOL);
    }
}

#[test]
fn serialised_circuits_survive_a_round_trip_through_text() {
    let mut body = QuantumCircuit::new(3);
    body.add_z_gate(2).unwrap();

    let mut circuit = QuantumCircuit::new(3);
    circuit.add_h_gate(0).unwrap();
    apply_swap(&mut circuit, 0, 2).unwrap();
    circuit.add_u_gate(matrices::sx_gate(), 1).unwrap();
    circuit.add_m_gate(0).unwrap();
    circuit.add_if_statement_on_bit(0, body).unwrap();

    let text = write_tangelo_circuit(&circuit).unwrap();
    let parsed = read_tangelo_circuit(3, &text, 0).unwrap();

    assert!(circuits_almost_eq(&circuit, &parsed, 1e-6));

    let mut expected = Statevector::new(3).unwrap();
    simulate(&circuit, &mut expected, Some(1)).unwrap();

    let mut state = Statevector::new(3).unwrap();
    simulate(&parsed, &mut state, Some(1)).unwrap();

    assert!(state.almost_eq(&expected, 1e-9));
}
