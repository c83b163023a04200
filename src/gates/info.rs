use crate::math::{matrix::Matrix2X2, N, R};

use super::Gate;

/// Uniform record for a single circuit operation.
///
/// The meaning of the argument slots depends on the tag:
///
/// | category                 | `arg0`  | `arg1` | `arg2` | `unitary` |
/// |--------------------------|---------|--------|--------|-----------|
/// | one target               | target  | -      | -      | -         |
/// | one target, one angle    | target  | -      | angle  | -         |
/// | control + target         | control | target | -      | -         |
/// | control + target + angle | control | target | angle  | -         |
/// | `U`                      | target  | -      | -      | matrix    |
/// | `CU`                     | control | target | -      | matrix    |
/// | `M`                      | qubit   | bit    | -      | -         |
///
/// Unused slots are zero-initialised. The constructors and unpackers below
/// are the only code that should touch the slots directly; unpacking a record
/// through the wrong category is a developer error and panics.
#[derive(Clone, Debug, PartialEq)]
pub struct GateInfo {
    pub gate: Gate,
    arg0: N,
    arg1: N,
    arg2: R,
    unitary: Option<Box<Matrix2X2>>,
}

impl GateInfo {
    pub(crate) fn one_target(gate: Gate, target: N) -> Self {
        assert!(gate.is_one_target(), "{:?} is not a one-target gate", gate);
        Self { gate, arg0: target, arg1: 0, arg2: 0.0, unitary: None }
    }

    pub(crate) fn one_target_one_angle(gate: Gate, target: N, angle: R) -> Self {
        assert!(
            gate.is_one_target_one_angle(),
            "{:?} is not a one-target-one-angle gate",
            gate
        );
        Self { gate, arg0: target, arg1: 0, arg2: angle, unitary: None }
    }

    pub(crate) fn one_control_one_target(gate: Gate, control: N, target: N) -> Self {
        assert!(
            gate.is_one_control_one_target(),
            "{:?} is not a one-control-one-target gate",
            gate
        );
        Self { gate, arg0: control, arg1: target, arg2: 0.0, unitary: None }
    }

    pub(crate) fn one_control_one_target_one_angle(
        gate: Gate,
        control: N,
        target: N,
        angle: R,
    ) -> Self {
        assert!(
            gate.is_one_control_one_target_one_angle(),
            "{:?} is not a one-control-one-target-one-angle gate",
            gate
        );
        Self { gate, arg0: control, arg1: target, arg2: angle, unitary: None }
    }

    pub(crate) fn u(target: N, unitary: Matrix2X2) -> Self {
        Self {
            gate: Gate::U,
            arg0: target,
            arg1: 0,
            arg2: 0.0,
            unitary: Some(Box::new(unitary)),
        }
    }

    pub(crate) fn cu(control: N, target: N, unitary: Matrix2X2) -> Self {
        Self {
            gate: Gate::Cu,
            arg0: control,
            arg1: target,
            arg2: 0.0,
            unitary: Some(Box::new(unitary)),
        }
    }

    pub(crate) fn m(qubit: N, bit: N) -> Self {
        Self { gate: Gate::M, arg0: qubit, arg1: bit, arg2: 0.0, unitary: None }
    }

    /// Target of a one-target gate (with or without an angle), or of a `U` gate.
    pub fn target(&self) -> N {
        assert!(
            self.gate.is_single_qubit_transform(),
            "{:?} has no single target qubit",
            self.gate
        );
        self.arg0
    }

    /// `(control, target)` of any controlled transform gate.
    pub fn control_target(&self) -> (N, N) {
        assert!(
            self.gate.is_double_qubit_transform(),
            "{:?} has no control/target pair",
            self.gate
        );
        (self.arg0, self.arg1)
    }

    /// Angle of a rotation or phase gate, controlled or not.
    pub fn angle(&self) -> R {
        assert!(self.gate.is_angle_transform(), "{:?} carries no angle", self.gate);
        self.arg2
    }

    /// The attached 2x2 matrix of a `U` or `CU` gate.
    pub fn unitary(&self) -> &Matrix2X2 {
        assert!(
            matches!(self.gate, Gate::U | Gate::Cu),
            "{:?} carries no unitary matrix",
            self.gate
        );
        self.unitary.as_deref().expect("U/CU gates always carry a matrix")
    }

    /// `(qubit, bit)` of a measurement gate.
    pub fn qubit_bit(&self) -> (N, N) {
        assert!(self.gate == Gate::M, "{:?} is not a measurement", self.gate);
        (self.arg0, self.arg1)
    }
}
