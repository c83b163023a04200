//! Per-gate amplitude-pair kernels.
//!
//! A kernel is the 2x2 action of a gate on one `(target = 0, target = 1)`
//! amplitude pair, with the gate's coefficients pre-computed at construction
//! so the pair loop does no trigonometry and no matrix indexing. Dispatch is
//! static through [`KernelDispatch`].
//!
//! `conj_kernel` returns the kernel of the element-wise conjugated matrix.
//! That is exactly what the second pass of the density-matrix update applies:
//! for the column pair `(c0, c1)` of `rho * M^dagger`, the new entries are
//! `conj(m00) x0 + conj(m01) x1` and `conj(m10) x0 + conj(m11) x1`.

use enum_dispatch::enum_dispatch;

use crate::gates::{Gate, GateInfo};
use crate::math::{matrix::Matrix2X2, C, C_IMAG, FRAC_1_SQRT_2, R};

#[enum_dispatch]
pub(crate) trait PairKernel {
    /// New values for one amplitude pair.
    fn apply(&self, a0: C, a1: C) -> (C, C);

    /// The kernel of the element-wise conjugated matrix.
    fn conj_kernel(&self) -> KernelDispatch;
}

#[enum_dispatch(PairKernel)]
#[derive(Clone, Copy, Debug)]
pub(crate) enum KernelDispatch {
    Hadamard,
    PauliX,
    PauliY,
    Phase,
    SqrtX,
    RotX,
    RotY,
    RotZ,
    Mat,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Hadamard;

impl PairKernel for Hadamard {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        ((a0 + a1).scale(FRAC_1_SQRT_2), (a0 - a1).scale(FRAC_1_SQRT_2))
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::Hadamard(*self)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PauliX;

impl PairKernel for PauliX {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (a1, a0)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::PauliX(*self)
    }
}

/// `[[0, -i], [i, 0]]` with `i` stored, so the conjugate is the same kernel
/// with `i` negated.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PauliY {
    i: C,
}

impl PairKernel for PauliY {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (-self.i * a1, self.i * a0)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::PauliY(PauliY { i: -self.i })
    }
}

/// `diag(1, phase)`: covers Z, S, S^dagger, T, T^dagger and P.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Phase {
    phase: C,
}

impl PairKernel for Phase {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (a0, self.phase * a1)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::Phase(Phase { phase: self.phase.conj() })
    }
}

/// `[[diag, off], [off, diag]]`: SX and SX^dagger.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SqrtX {
    diag: C,
    off: C,
}

impl PairKernel for SqrtX {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (self.diag * a0 + self.off * a1, self.off * a0 + self.diag * a1)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::SqrtX(SqrtX { diag: self.diag.conj(), off: self.off.conj() })
    }
}

/// `[[c, -is], [-is, c]]` with `c = cos(theta/2)`, `s = sin(theta/2)`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RotX {
    cos: R,
    sin: R,
}

impl PairKernel for RotX {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        let out0 = C::new(
            a0.re * self.cos + a1.im * self.sin,
            a0.im * self.cos - a1.re * self.sin,
        );
        let out1 = C::new(
            a1.re * self.cos + a0.im * self.sin,
            a1.im * self.cos - a0.re * self.sin,
        );
        (out0, out1)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::RotX(RotX { cos: self.cos, sin: -self.sin })
    }
}

/// `[[c, -s], [s, c]]`; real, so it is its own conjugate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RotY {
    cos: R,
    sin: R,
}

impl PairKernel for RotY {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (
            a0.scale(self.cos) - a1.scale(self.sin),
            a1.scale(self.cos) + a0.scale(self.sin),
        )
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::RotY(*self)
    }
}

/// `diag(e^{-i theta/2}, e^{i theta/2})`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RotZ {
    e0: C,
    e1: C,
}

impl PairKernel for RotZ {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (self.e0 * a0, self.e1 * a1)
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::RotZ(RotZ { e0: self.e0.conj(), e1: self.e1.conj() })
    }
}

/// The generic 2x2 kernel carried by `U` and `CU` gates.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Mat {
    mat: Matrix2X2,
}

impl Mat {
    pub(crate) fn new(mat: Matrix2X2) -> Self {
        Self { mat }
    }
}

impl PairKernel for Mat {
    #[inline(always)]
    fn apply(&self, a0: C, a1: C) -> (C, C) {
        (
            self.mat.m00 * a0 + self.mat.m01 * a1,
            self.mat.m10 * a0 + self.mat.m11 * a1,
        )
    }

    fn conj_kernel(&self) -> KernelDispatch {
        KernelDispatch::Mat(Mat { mat: self.mat.conj() })
    }
}

/// Build the kernel for a transform gate, controlled or not; the control is
/// handled by the pair generator, not the kernel.
pub(crate) fn kernel_for_gate(info: &GateInfo) -> KernelDispatch {
    match info.gate {
        Gate::H | Gate::Ch => Hadamard.into(),
        Gate::X | Gate::Cx => PauliX.into(),
        Gate::Y | Gate::Cy => PauliY { i: C_IMAG }.into(),
        Gate::Z | Gate::Cz => Phase { phase: C::new(-1.0, 0.0) }.into(),
        Gate::S | Gate::Cs => Phase { phase: C_IMAG }.into(),
        Gate::Sdag | Gate::Csdag => Phase { phase: -C_IMAG }.into(),
        Gate::T | Gate::Ct => Phase { phase: C::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2) }.into(),
        Gate::Tdag | Gate::Ctdag => Phase { phase: C::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2) }.into(),
        Gate::Sx | Gate::Csx => SqrtX { diag: C::new(0.5, 0.5), off: C::new(0.5, -0.5) }.into(),
        Gate::Sxdag | Gate::Csxdag => {
            SqrtX { diag: C::new(0.5, -0.5), off: C::new(0.5, 0.5) }.into()
        }
        Gate::Rx | Gate::Crx => {
            let half = info.angle() / 2.0;
            RotX { cos: half.cos(), sin: half.sin() }.into()
        }
        Gate::Ry | Gate::Cry => {
            let half = info.angle() / 2.0;
            RotY { cos: half.cos(), sin: half.sin() }.into()
        }
        Gate::Rz | Gate::Crz => {
            let half = info.angle() / 2.0;
            RotZ {
                e0: C::new(half.cos(), -half.sin()),
                e1: C::new(half.cos(), half.sin()),
            }
            .into()
        }
        Gate::P | Gate::Cp => {
            let angle = info.angle();
            Phase { phase: C::new(angle.cos(), angle.sin()) }.into()
        }
        Gate::U | Gate::Cu => Mat::new(*info.unitary()).into(),
        Gate::M => panic!("measurement has no unitary kernel"),
    }
}
