//! Tangelo-compatible text serialisation of circuits.
//!
//! One gate per line: the gate name left-justified to ten columns, then
//! `target : [t]`, optionally `control : [c]`, `parameter : <float>` and
//! `bit : [b]` fields. `U`/`CU` gates emit their 2x2 matrix on the two
//! following lines. Classical control flow serialises as
//! `IF BITS[i, ...] == [b, ...]` with the body indented four spaces,
//! optionally followed by `ELSE` and the else body; the serialiser does not
//! support nested control flow. On read, the tangelo gate names `CNOT`,
//! `CPHASE` and `PHASE` map to `CX`, `CP` and `P`, and a `SWAP` line expands
//! into its three-CX identity.

use std::iter::Peekable;
use std::path::Path;

use crate::circuit::{
    CircuitElement, ControlFlowInstruction, ControlFlowPredicate, PredicateKind, QuantumCircuit,
};
use crate::error::{Error, Result};
use crate::gates::{compose::apply_swap, Gate, GateInfo};
use crate::math::{matrix::Matrix2X2, C, N, R};

const CONTROL_FLOW_INDENT: usize = 4;

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedSerializedCircuit(msg.into())
}

// ---------------------------------------------------------------------------
// writing
// ---------------------------------------------------------------------------

fn format_double(value: R) -> String {
    format!("{:.16}", value)
}

fn format_matrix(mat: &Matrix2X2) -> String {
    format!(
        "    [{}, {}]   [{}, {}]\n    [{}, {}]   [{}, {}]\n",
        format_double(mat.m00.re),
        format_double(mat.m00.im),
        format_double(mat.m01.re),
        format_double(mat.m01.im),
        format_double(mat.m10.re),
        format_double(mat.m10.im),
        format_double(mat.m11.re),
        format_double(mat.m11.im),
    )
}

fn format_gate(info: &GateInfo) -> String {
    let name = info.gate.name();

    match info.gate {
        Gate::M => {
            let (qubit, bit) = info.qubit_bit();
            format!("{:<10}target : [{}]   bit : [{}]\n", name, qubit, bit)
        }
        Gate::U => {
            let mut output = format!("{:<10}target : [{}]\n", name, info.target());
            output.push_str(&format_matrix(info.unitary()));
            output
        }
        Gate::Cu => {
            let (control, target) = info.control_target();
            let mut output =
                format!("{:<10}target : [{}]   control : [{}]\n", name, target, control);
            output.push_str(&format_matrix(info.unitary()));
            output
        }
        gate if gate.is_one_target() => {
            format!("{:<10}target : [{}]\n", name, info.target())
        }
        gate if gate.is_one_target_one_angle() => {
            format!(
                "{:<10}target : [{}]   parameter : {}\n",
                name,
                info.target(),
                format_double(info.angle())
            )
        }
        gate if gate.is_one_control_one_target() => {
            let (control, target) = info.control_target();
            format!("{:<10}target : [{}]   control : [{}]\n", name, target, control)
        }
        _ => {
            let (control, target) = info.control_target();
            format!(
                "{:<10}target : [{}]   control : [{}]   parameter : {}\n",
                name,
                target,
                control,
                format_double(info.angle())
            )
        }
    }
}

fn format_csv_integers(values: &[N]) -> String {
    let rendered: Vec<String> = values.iter().map(N::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn format_predicate(predicate: &ControlFlowPredicate) -> String {
    let comparison = match predicate.kind() {
        PredicateKind::If => "==",
        PredicateKind::IfNot => "!=",
    };

    let expected: Vec<N> = predicate.expected_bits().iter().map(|&bit| bit as N).collect();

    format!(
        "BITS{} {} {}",
        format_csv_integers(predicate.bit_indices()),
        comparison,
        format_csv_integers(&expected)
    )
}

fn write_subcircuit_body(subcircuit: &QuantumCircuit, output: &mut String) -> Result<()> {
    let indent = " ".repeat(CONTROL_FLOW_INDENT);

    for element in subcircuit {
        match element {
            CircuitElement::Logger(_) => continue,
            CircuitElement::ControlFlow(_) => {
                return Err(Error::InvalidCircuitState(
                    "nested classical control flow cannot be serialised".to_string(),
                ));
            }
            CircuitElement::Gate(info) => {
                for line in format_gate(info).lines() {
                    output.push_str(&indent);
                    output.push_str(line);
                    output.push('\n');
                }
            }
        }
    }

    Ok(())
}

/// Render `circuit` in the tangelo text format.
pub fn write_tangelo_circuit(circuit: &QuantumCircuit) -> Result<String> {
    let mut output = String::new();

    for element in circuit {
        match element {
            CircuitElement::Logger(_) => continue,
            CircuitElement::Gate(info) => output.push_str(&format_gate(info)),
            CircuitElement::ControlFlow(ControlFlowInstruction::If(statement)) => {
                output.push_str(&format!("IF {}\n", format_predicate(statement.predicate())));
                write_subcircuit_body(statement.circuit(), &mut output)?;
            }
            CircuitElement::ControlFlow(ControlFlowInstruction::IfElse(statement)) => {
                output.push_str(&format!("IF {}\n", format_predicate(statement.predicate())));
                write_subcircuit_body(statement.if_circuit(), &mut output)?;
                output.push_str("ELSE\n");
                write_subcircuit_body(statement.else_circuit(), &mut output)?;
            }
            CircuitElement::ControlFlow(ControlFlowInstruction::While(_)) => {
                return Err(Error::InvalidCircuitState(
                    "while statements cannot be serialised".to_string(),
                ));
            }
        }
    }

    Ok(output)
}

pub fn write_tangelo_file(circuit: &QuantumCircuit, filepath: impl AsRef<Path>) -> Result<()> {
    let contents = write_tangelo_circuit(circuit)?;
    std::fs::write(filepath.as_ref(), contents)
        .map_err(|io_error| Error::Io(io_error.to_string()))
}

// ---------------------------------------------------------------------------
// reading
// ---------------------------------------------------------------------------

fn tangelo_to_local_name(name: &str) -> &str {
    match name {
        "CPHASE" => "CP",
        "CNOT" => "CX",
        "PHASE" => "P",
        other => other,
    }
}

/// Parse the first `[a, b, ...]` group at or after `from`, returning the
/// values and the position just past the closing bracket.
fn parse_bracketed_integers(line: &str, from: usize) -> Result<(Vec<N>, usize)> {
    let open = line[from..]
        .find('[')
        .map(|offset| from + offset)
        .ok_or_else(|| malformed(format!("expected '[' in line: '{}'", line)))?;
    let close = line[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(|| malformed(format!("expected ']' in line: '{}'", line)))?;

    let inner = line[open + 1..close].trim();
    if inner.is_empty() {
        return Ok((Vec::new(), close + 1));
    }

    let mut values = Vec::new();
    for piece in inner.split(',') {
        let value = piece
            .trim()
            .parse::<N>()
            .map_err(|_| malformed(format!("expected an integer in line: '{}'", line)))?;
        values.push(value);
    }

    Ok((values, close + 1))
}

fn parse_single_bracketed_integer(line: &str, key: &str) -> Result<N> {
    let key_position = line
        .find(key)
        .ok_or_else(|| malformed(format!("expected '{}' field in line: '{}'", key, line)))?;

    let (values, _) = parse_bracketed_integers(line, key_position)?;
    if values.len() != 1 {
        return Err(malformed(format!("expected a single index in line: '{}'", line)));
    }

    Ok(values[0])
}

fn parse_parameter(line: &str) -> Result<R> {
    let key_position = line
        .find("parameter")
        .ok_or_else(|| malformed(format!("expected 'parameter' field in line: '{}'", line)))?;
    let colon = line[key_position..]
        .find(':')
        .map(|offset| key_position + offset)
        .ok_or_else(|| malformed(format!("expected ':' after 'parameter' in line: '{}'", line)))?;

    line[colon + 1..]
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<R>().ok())
        .ok_or_else(|| malformed(format!("expected an angle in line: '{}'", line)))
}

/// Parse one `[re, im]` group, returning the value and the position just
/// past the closing bracket.
fn parse_complex(line: &str, from: usize) -> Result<(C, usize)> {
    let open = line[from..]
        .find('[')
        .map(|offset| from + offset)
        .ok_or_else(|| malformed(format!("expected '[' in matrix row: '{}'", line)))?;
    let close = line[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(|| malformed(format!("expected ']' in matrix row: '{}'", line)))?;

    let mut pieces = line[open + 1..close].split(',');
    let real = pieces
        .next()
        .and_then(|token| token.trim().parse::<R>().ok())
        .ok_or_else(|| malformed(format!("expected a real component in row: '{}'", line)))?;
    let imag = pieces
        .next()
        .and_then(|token| token.trim().parse::<R>().ok())
        .ok_or_else(|| malformed(format!("expected an imaginary component in row: '{}'", line)))?;

    Ok((C::new(real, imag), close + 1))
}

fn parse_matrix<'a>(lines: &mut Peekable<impl Iterator<Item = &'a str>>) -> Result<Matrix2X2> {
    let first_line = lines.next().ok_or_else(|| malformed("missing first matrix row"))?;
    let second_line = lines.next().ok_or_else(|| malformed("missing second matrix row"))?;

    let (m00, after) = parse_complex(first_line, 0)?;
    let (m01, _) = parse_complex(first_line, after)?;
    let (m10, after) = parse_complex(second_line, 0)?;
    let (m11, _) = parse_complex(second_line, after)?;

    Ok(Matrix2X2::new(m00, m01, m10, m11))
}

fn parse_predicate(line: &str) -> Result<ControlFlowPredicate> {
    let bits_position = line
        .find("BITS")
        .ok_or_else(|| malformed(format!("expected 'BITS' in line: '{}'", line)))?;

    let (bit_indices, after) = parse_bracketed_integers(line, bits_position)?;

    let comparison = line[after..].trim_start();
    let kind = if comparison.starts_with("==") {
        PredicateKind::If
    } else if comparison.starts_with("!=") {
        PredicateKind::IfNot
    } else {
        return Err(malformed(format!("expected '==' or '!=' in line: '{}'", line)));
    };

    let (expected, _) = parse_bracketed_integers(line, after)?;
    let expected_bits: Vec<u8> = expected.iter().map(|&bit| bit as u8).collect();

    ControlFlowPredicate::new(bit_indices, expected_bits, kind)
        .map_err(|error| malformed(error.to_string()))
}

fn parse_gate_line<'a>(
    circuit: &mut QuantumCircuit,
    line: &str,
    lines: &mut Peekable<impl Iterator<Item = &'a str>>,
) -> Result<()> {
    let name = line.split_whitespace().next().expect("blank lines are filtered by the caller");
    let local_name = tangelo_to_local_name(name);

    if local_name == "SWAP" {
        let (targets, _) = parse_bracketed_integers(line, 0)?;
        if targets.len() != 2 {
            return Err(malformed(format!("SWAP needs two target qubits: '{}'", line)));
        }
        return apply_swap(circuit, targets[0], targets[1]);
    }

    let gate = Gate::from_name(local_name)
        .ok_or_else(|| malformed(format!("unknown gate '{}'", name)))?;

    if gate == Gate::M {
        let qubit = parse_single_bracketed_integer(line, "target")?;
        let bit = parse_single_bracketed_integer(line, "bit")?;
        return circuit.add_m_gate_to(qubit, bit);
    }

    if gate == Gate::U {
        let target = parse_single_bracketed_integer(line, "target")?;
        let unitary = parse_matrix(lines)?;
        return circuit.add_u_gate(unitary, target);
    }

    if gate == Gate::Cu {
        let target = parse_single_bracketed_integer(line, "target")?;
        let control = parse_single_bracketed_integer(line, "control")?;
        let unitary = parse_matrix(lines)?;
        return circuit.add_cu_gate(unitary, control, target);
    }

    if gate.is_one_target() {
        let target = parse_single_bracketed_integer(line, "target")?;
        return circuit.push_checked_one_target(gate, target);
    }

    if gate.is_one_target_one_angle() {
        let target = parse_single_bracketed_integer(line, "target")?;
        let angle = parse_parameter(line)?;
        return circuit.push_checked_one_target_one_angle(gate, target, angle);
    }

    if gate.is_one_control_one_target() {
        let target = parse_single_bracketed_integer(line, "target")?;
        let control = parse_single_bracketed_integer(line, "control")?;
        return circuit.push_checked_one_control_one_target(gate, control, target);
    }

    // controlled with an angle
    let target = parse_single_bracketed_integer(line, "target")?;
    let control = parse_single_bracketed_integer(line, "control")?;
    let angle = parse_parameter(line)?;
    circuit.push_checked_one_control_one_target_one_angle(gate, control, target, angle)
}

fn is_indented(line: &str) -> bool {
    line.starts_with(&" ".repeat(CONTROL_FLOW_INDENT))
}

fn parse_indented_block<'a>(
    n_qubits: N,
    lines: &mut Peekable<impl Iterator<Item = &'a str>>,
) -> Result<QuantumCircuit> {
    let mut circuit = QuantumCircuit::new(n_qubits);

    while let Some(&line) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
            continue;
        }

        if !is_indented(line) {
            break;
        }

        let line = lines.next().expect("peeked line is present");
        parse_gate_line(&mut circuit, line.trim_start(), lines)?;
    }

    Ok(circuit)
}

/// Parse a circuit over `n_qubits` qubits from the tangelo text format,
/// skipping `n_skip_lines` leading lines.
pub fn read_tangelo_circuit(
    n_qubits: N,
    text: &str,
    n_skip_lines: N,
) -> Result<QuantumCircuit> {
    let mut circuit = QuantumCircuit::new(n_qubits);
    let mut lines = text.lines().skip(n_skip_lines).peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let name = trimmed.split_whitespace().next().expect("non-empty line has a token");

        if name == "IF" {
            let predicate = parse_predicate(trimmed)?;
            let if_circuit = parse_indented_block(n_qubits, &mut lines)?;
            circuit.add_if_statement(predicate, if_circuit)?;
            continue;
        }

        if name == "ELSE" {
            let top_element = circuit.pop_element().ok_or_else(|| {
                malformed("encountered an 'ELSE' with no previous matching 'IF'")
            })?;

            let Some(ControlFlowInstruction::If(if_statement)) = top_element.control_flow().cloned()
            else {
                return Err(malformed("encountered an 'ELSE' with no previous matching 'IF'"));
            };

            let else_circuit = parse_indented_block(n_qubits, &mut lines)?;
            circuit.add_if_else_statement(
                if_statement.predicate().clone(),
                if_statement.circuit().clone(),
                else_circuit,
            )?;
            continue;
        }

        parse_gate_line(&mut circuit, trimmed, &mut lines)?;
    }

    Ok(circuit)
}

pub fn read_tangelo_file(
    n_qubits: N,
    filepath: impl AsRef<Path>,
    n_skip_lines: N,
) -> Result<QuantumCircuit> {
    let contents = std::fs::read_to_string(filepath.as_ref())
        .map_err(|io_error| Error::Io(io_error.to_string()))?;

    read_tangelo_circuit(n_qubits, &contents, n_skip_lines)
}
