//! Circuit loggers: snapshot points placed in the IR.
//!
//! A logger sits in the element stream empty; when an engine walks past it,
//! the logger is cloned, filled with a deep copy of the current register or
//! state, and appended to the simulator's logger output. Snapshots never
//! alias live simulation state.

use crate::state::{DensityMatrix, Statevector};

use super::register::ClassicalRegister;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassicalRegisterLogger {
    register: Option<Box<ClassicalRegister>>,
}

impl ClassicalRegisterLogger {
    pub(crate) fn capture(&mut self, register: &ClassicalRegister) {
        self.register = Some(Box::new(register.clone()));
    }

    /// The captured register; `None` until an engine has passed the logger.
    pub fn register(&self) -> Option<&ClassicalRegister> {
        self.register.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatevectorLogger {
    state: Option<Box<Statevector>>,
}

impl StatevectorLogger {
    pub(crate) fn capture(&mut self, state: &Statevector) {
        self.state = Some(Box::new(state.clone()));
    }

    pub fn statevector(&self) -> Option<&Statevector> {
        self.state.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensityMatrixLogger {
    state: Option<Box<DensityMatrix>>,
}

impl DensityMatrixLogger {
    pub(crate) fn capture(&mut self, state: &DensityMatrix) {
        self.state = Some(Box::new(state.clone()));
    }

    pub fn density_matrix(&self) -> Option<&DensityMatrix> {
        self.state.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CircuitLogger {
    ClassicalRegister(ClassicalRegisterLogger),
    Statevector(StatevectorLogger),
    DensityMatrix(DensityMatrixLogger),
}

impl CircuitLogger {
    pub fn is_classical_register_logger(&self) -> bool {
        matches!(self, CircuitLogger::ClassicalRegister(_))
    }

    pub fn is_statevector_logger(&self) -> bool {
        matches!(self, CircuitLogger::Statevector(_))
    }

    pub fn is_density_matrix_logger(&self) -> bool {
        matches!(self, CircuitLogger::DensityMatrix(_))
    }

    pub fn classical_register_logger(&self) -> Option<&ClassicalRegisterLogger> {
        match self {
            CircuitLogger::ClassicalRegister(logger) => Some(logger),
            _ => None,
        }
    }

    pub fn statevector_logger(&self) -> Option<&StatevectorLogger> {
        match self {
            CircuitLogger::Statevector(logger) => Some(logger),
            _ => None,
        }
    }

    pub fn density_matrix_logger(&self) -> Option<&DensityMatrixLogger> {
        match self {
            CircuitLogger::DensityMatrix(logger) => Some(logger),
            _ => None,
        }
    }
}
