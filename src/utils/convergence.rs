//! Convergence tracking & tolerance checks for the CG iteration.

/// Stopping criteria: relative residual tolerance and iteration cap.
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

/// Why a solve stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// ⟨b, b⟩ = 0, so x = 0 is exact; no iteration ran.
    ZeroRhs,
    /// √(rr / bb) fell below the tolerance, or the residual vanished exactly.
    Converged,
    /// `max_iters` iterations ran without meeting the tolerance.
    Exhausted,
    /// p·Ap ≤ 0 or a non-finite scalar appeared.
    Breakdown,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    /// Final relative residual √(rr / bb); NaN after a breakdown.
    pub final_residual: T,
    pub converged: bool,
    pub reason: StopReason,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// √(rr / bb), with a slightly negative `rr` from rounding clamped to zero.
    pub fn relative_residual(rr: T, bb: T) -> T {
        let rr = if rr < T::zero() { T::zero() } else { rr };
        (rr / bb).sqrt()
    }

    /// True when the relative residual is strictly below `tol`. NaN never converges.
    pub fn is_converged(&self, rr: T, bb: T) -> bool {
        Self::relative_residual(rr, bb) < self.tol
    }
}

impl<T: Copy + num_traits::Float> SolveStats<T> {
    pub fn zero_rhs() -> Self {
        Self {
            iterations: 0,
            final_residual: T::zero(),
            converged: true,
            reason: StopReason::ZeroRhs,
        }
    }

    pub fn converged(iterations: usize, final_residual: T) -> Self {
        Self { iterations, final_residual, converged: true, reason: StopReason::Converged }
    }

    pub fn exhausted(iterations: usize, final_residual: T) -> Self {
        Self { iterations, final_residual, converged: false, reason: StopReason::Exhausted }
    }

    pub fn breakdown(iterations: usize) -> Self {
        Self {
            iterations,
            final_residual: T::nan(),
            converged: false,
            reason: StopReason::Breakdown,
        }
    }
}
