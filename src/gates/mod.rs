//! Primitive gate tags and their uniform metadata record.
//!
//! Every operation a circuit can hold is identified by a [`Gate`] tag; the
//! tag fixes the arity (how many qubits, whether an angle or a 2x2 unitary is
//! attached). A [`GateInfo`] packs the tag together with its arguments into a
//! single uniform record, which is what the circuit container stores and the
//! simulation engines dispatch on.

pub use self::info::GateInfo;

pub mod compose;
pub mod decompose;
pub mod info;
pub mod matrices;

/// Tag for every primitive operation the simulators can execute directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    H,
    X,
    Y,
    Z,
    S,
    Sdag,
    T,
    Tdag,
    Sx,
    Sxdag,
    Rx,
    Ry,
    Rz,
    P,
    Ch,
    Cx,
    Cy,
    Cz,
    Cs,
    Csdag,
    Ct,
    Ctdag,
    Csx,
    Csxdag,
    Crx,
    Cry,
    Crz,
    Cp,
    U,
    Cu,
    M,
}

/// Uncontrolled-to-controlled tag pairs; small enough for a linear scan.
const UNCONTROLLED_TO_CONTROLLED: [(Gate, Gate); 15] = [
    (Gate::H, Gate::Ch),
    (Gate::X, Gate::Cx),
    (Gate::Y, Gate::Cy),
    (Gate::Z, Gate::Cz),
    (Gate::S, Gate::Cs),
    (Gate::Sdag, Gate::Csdag),
    (Gate::T, Gate::Ct),
    (Gate::Tdag, Gate::Ctdag),
    (Gate::Sx, Gate::Csx),
    (Gate::Sxdag, Gate::Csxdag),
    (Gate::Rx, Gate::Crx),
    (Gate::Ry, Gate::Cry),
    (Gate::Rz, Gate::Crz),
    (Gate::P, Gate::Cp),
    (Gate::U, Gate::Cu),
];

const GATE_NAMES: [(Gate, &str); 31] = [
    (Gate::H, "H"),
    (Gate::X, "X"),
    (Gate::Y, "Y"),
    (Gate::Z, "Z"),
    (Gate::S, "S"),
    (Gate::Sdag, "SDAG"),
    (Gate::T, "T"),
    (Gate::Tdag, "TDAG"),
    (Gate::Sx, "SX"),
    (Gate::Sxdag, "SXDAG"),
    (Gate::Rx, "RX"),
    (Gate::Ry, "RY"),
    (Gate::Rz, "RZ"),
    (Gate::P, "P"),
    (Gate::Ch, "CH"),
    (Gate::Cx, "CX"),
    (Gate::Cy, "CY"),
    (Gate::Cz, "CZ"),
    (Gate::Cs, "CS"),
    (Gate::Csdag, "CSDAG"),
    (Gate::Ct, "CT"),
    (Gate::Ctdag, "CTDAG"),
    (Gate::Csx, "CSX"),
    (Gate::Csxdag, "CSXDAG"),
    (Gate::Crx, "CRX"),
    (Gate::Cry, "CRY"),
    (Gate::Crz, "CRZ"),
    (Gate::Cp, "CP"),
    (Gate::U, "U"),
    (Gate::Cu, "CU"),
    (Gate::M, "M"),
];

impl Gate {
    /// One target qubit, no angle, no unitary.
    pub fn is_one_target(self) -> bool {
        matches!(
            self,
            Gate::H
                | Gate::X
                | Gate::Y
                | Gate::Z
                | Gate::S
                | Gate::Sdag
                | Gate::T
                | Gate::Tdag
                | Gate::Sx
                | Gate::Sxdag
        )
    }

    /// One target qubit plus one rotation/phase angle.
    pub fn is_one_target_one_angle(self) -> bool {
        matches!(self, Gate::Rx | Gate::Ry | Gate::Rz | Gate::P)
    }

    /// One control and one target qubit, no angle.
    pub fn is_one_control_one_target(self) -> bool {
        matches!(
            self,
            Gate::Ch
                | Gate::Cx
                | Gate::Cy
                | Gate::Cz
                | Gate::Cs
                | Gate::Csdag
                | Gate::Ct
                | Gate::Ctdag
                | Gate::Csx
                | Gate::Csxdag
        )
    }

    /// One control and one target qubit plus one angle.
    pub fn is_one_control_one_target_one_angle(self) -> bool {
        matches!(self, Gate::Crx | Gate::Cry | Gate::Crz | Gate::Cp)
    }

    /// A unitary transform acting on a single qubit.
    pub fn is_single_qubit_transform(self) -> bool {
        self.is_one_target() || self.is_one_target_one_angle() || self == Gate::U
    }

    /// A unitary transform acting on a control/target pair.
    pub fn is_double_qubit_transform(self) -> bool {
        self.is_one_control_one_target()
            || self.is_one_control_one_target_one_angle()
            || self == Gate::Cu
    }

    /// A transform whose matrix is fixed (no angle, no attached unitary).
    pub fn is_non_angle_transform(self) -> bool {
        self.is_one_target() || self.is_one_control_one_target()
    }

    /// A transform whose matrix is parameterised by a single angle.
    pub fn is_angle_transform(self) -> bool {
        self.is_one_target_one_angle() || self.is_one_control_one_target_one_angle()
    }

    /// The controlled counterpart of an uncontrolled transform gate.
    pub fn controlled(self) -> Option<Gate> {
        UNCONTROLLED_TO_CONTROLLED
            .iter()
            .find(|(uncontrolled, _)| *uncontrolled == self)
            .map(|(_, controlled)| *controlled)
    }

    pub fn name(self) -> &'static str {
        GATE_NAMES
            .iter()
            .find(|(gate, _)| *gate == self)
            .map(|(_, name)| *name)
            .expect("every gate tag has a name")
    }

    pub fn from_name(name: &str) -> Option<Gate> {
        GATE_NAMES
            .iter()
            .find(|(_, gate_name)| *gate_name == name)
            .map(|(gate, _)| *gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controlled_counterparts() {
        assert_eq!(Gate::H.controlled(), Some(Gate::Ch));
        assert_eq!(Gate::Rz.controlled(), Some(Gate::Crz));
        assert_eq!(Gate::U.controlled(), Some(Gate::Cu));
        assert_eq!(Gate::Cx.controlled(), None);
        assert_eq!(Gate::M.controlled(), None);
    }

    #[test]
    fn names_round_trip() {
        for (gate, name) in GATE_NAMES {
            assert_eq!(gate.name(), name);
            assert_eq!(Gate::from_name(name), Some(gate));
        }

        assert_eq!(Gate::from_name("BOGUS"), None);
    }

    #[test]
    fn arity_predicates_partition_the_tags() {
        for (gate, _) in GATE_NAMES {
            let categories = [
                gate.is_one_target(),
                gate.is_one_target_one_angle(),
                gate.is_one_control_one_target(),
                gate.is_one_control_one_target_one_angle(),
                gate == Gate::U,
                gate == Gate::Cu,
                gate == Gate::M,
            ];
            assert_eq!(categories.iter().filter(|&&hit| hit).count(), 1);
        }
    }
}
