use std::fmt;

use crate::math::{N, R};

/// Every failure the crate can report. Invariant violations are raised at the
/// boundary of the offending operation and propagate to the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    OutOfRangeQubit { index: N, n_qubits: N },
    OutOfRangeBit { index: N, n_bits: N },
    InvalidCircuitState(String),
    InvalidBitstring(String),
    InvalidPredicate(String),
    NonNormalisedCoefficients(R),
    InvalidDensityMatrix(String),
    InvalidKrausChannel(String),
    InvalidQubitMapping(String),
    UnreadClassicalBit(N),
    DegenerateProjection,
    NonControllableElement(&'static str),
    MalformedSerializedCircuit(String),
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRangeQubit { index, n_qubits } => {
                write!(f, "qubit index {} is out of range for a circuit with {} qubits", index, n_qubits)
            }
            Error::OutOfRangeBit { index, n_bits } => {
                write!(f, "bit index {} is out of range for a register with {} bits", index, n_bits)
            }
            Error::InvalidCircuitState(msg) => write!(f, "invalid circuit or state: {}", msg),
            Error::InvalidBitstring(bitstring) => {
                write!(f, "invalid bitstring: '{}'", bitstring)
            }
            Error::InvalidPredicate(msg) => write!(f, "invalid control flow predicate: {}", msg),
            Error::NonNormalisedCoefficients(norm) => {
                write!(f, "statevector coefficients have norm {} instead of 1", norm)
            }
            Error::InvalidDensityMatrix(msg) => write!(f, "invalid density matrix: {}", msg),
            Error::InvalidKrausChannel(msg) => write!(f, "invalid Kraus channel: {}", msg),
            Error::InvalidQubitMapping(msg) => write!(f, "invalid qubit mapping: {}", msg),
            Error::UnreadClassicalBit(index) => {
                write!(f, "no measured bit at classical register index {}", index)
            }
            Error::DegenerateProjection => {
                write!(f, "projection would renormalise a state with zero norm")
            }
            Error::NonControllableElement(what) => {
                write!(f, "{} cannot be promoted to a controlled element", what)
            }
            Error::MalformedSerializedCircuit(msg) => {
                write!(f, "malformed serialized circuit: {}", msg)
            }
            Error::Io(msg) => write!(f, "i/o failure: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
