//! Distributed Conjugate Gradient for dense SPD systems.
//!
//! Every participant holds replicated copies of A, b and the working vectors
//! x, r, p, Ap. Per iteration:
//!
//! 1. Ap ← A·p: each rank computes its row band, `all_gather_segments`
//!    restores the full vector everywhere.
//! 2. α ← rr / ⟨p, Ap⟩ with a distributed dot (segment dot + `all_sum`).
//! 3. x ← x + α·p and r ← r − α·Ap, computed redundantly on every rank.
//! 4. rr ← ⟨r, r⟩ and β ← rr_new / rr_old.
//! 5. Stop if √(rr / bb) < tol, otherwise p ← r + β·p.
//!
//! All branching is driven by scalars that came out of `all_sum`, so every
//! participant takes the same path and no control broadcast is needed.

use crate::config::SolverOptions;
use crate::context::ParticipantContext;
use crate::core::kernels::axpby;
use crate::error::{CgError, Result};
use crate::matrix::DenseMatrix;
use crate::parallel::Comm;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats, StopReason};

/// Replicated solver state at an iteration boundary, handed to the monitor.
pub struct IterationSnapshot<'s> {
    pub iteration: usize,
    pub rr: f64,
    pub bb: f64,
    pub alpha: f64,
    pub beta: f64,
    pub x: &'s [f64],
    pub r: &'s [f64],
    pub p: &'s [f64],
}

impl IterationSnapshot<'_> {
    pub fn relative_residual(&self) -> f64 {
        Convergence::relative_residual(self.rr, self.bb)
    }
}

type Monitor<'a> = Box<dyn FnMut(&IterationSnapshot<'_>) + 'a>;

pub struct CgSolver<'a, C: Comm> {
    pub conv: Convergence<f64>,
    pub breakdown_guard: bool,
    ctx: ParticipantContext<'a, C>,
    monitor: Option<Monitor<'a>>,
    residual_history: Vec<f64>,
}

// Scoped working vectors; dropped on every exit path.
struct Workspace {
    r: Vec<f64>,
    p: Vec<f64>,
    ap: Vec<f64>,
    band: Vec<f64>,
}

impl<'a, C: Comm> CgSolver<'a, C> {
    pub fn new(ctx: ParticipantContext<'a, C>, tol: f64, max_iters: usize) -> Self {
        Self {
            conv: Convergence { tol, max_iters },
            breakdown_guard: true,
            ctx,
            monitor: None,
            residual_history: Vec::new(),
        }
    }

    pub fn from_options(ctx: ParticipantContext<'a, C>, opts: &SolverOptions) -> Self {
        Self::new(ctx, opts.rel_tol, opts.max_iters).with_breakdown_guard(opts.breakdown_guard)
    }

    pub fn with_breakdown_guard(mut self, flag: bool) -> Self {
        self.breakdown_guard = flag;
        self
    }

    /// Called at every iteration boundary, on every participant.
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(&IterationSnapshot<'_>) + 'a,
    {
        self.monitor = Some(Box::new(f));
        self
    }

    /// Relative residual after each iteration of the last solve.
    pub fn residual_history(&self) -> &[f64] {
        &self.residual_history
    }

    /// Solve A·x = b into `x`. Collective: every participant must call it with
    /// identical `a` and `b`.
    ///
    /// Shapes and the divisibility of N by the group size are checked before
    /// any collective runs, so a bad call fails the same way on every rank.
    pub fn solve_slice(
        &mut self,
        a: &DenseMatrix,
        b: &[f64],
        x: &mut [f64],
    ) -> Result<SolveStats<f64>> {
        let n = b.len();
        if !a.is_square() {
            return Err(CgError::NotSquare { rows: a.nrows(), cols: a.ncols() });
        }
        if a.nrows() != n {
            return Err(CgError::DimensionMismatch {
                what: "right hand side",
                expected: a.nrows(),
                found: n,
            });
        }
        if x.len() != n {
            return Err(CgError::DimensionMismatch {
                what: "solution vector",
                expected: n,
                found: x.len(),
            });
        }
        let plan = self.ctx.check_gatherable(n)?;

        let _span = tracing::debug_span!(
            "cg_solve",
            n,
            rank = self.ctx.rank(),
            participants = self.ctx.size()
        )
        .entered();

        let mut ws = Workspace {
            r: b.to_vec(),
            p: b.to_vec(),
            ap: vec![0.0; n],
            band: vec![0.0; plan.chunk()],
        };
        x.fill(0.0);
        self.residual_history.clear();

        let bb = self.ctx.dot(b, b);
        let stats = if bb == 0.0 {
            SolveStats::zero_rhs()
        } else {
            self.iterate(a, x, &mut ws, bb)
        };
        self.report(&stats);
        Ok(stats)
    }

    fn iterate(
        &mut self,
        a: &DenseMatrix,
        x: &mut [f64],
        ws: &mut Workspace,
        bb: f64,
    ) -> SolveStats<f64> {
        let pool = self.ctx.pool();
        let mut rr = bb;

        for k in 1..=self.conv.max_iters {
            self.ctx.matvec(a, &ws.p, &mut ws.ap, &mut ws.band);
            let p_ap = self.ctx.dot(&ws.p, &ws.ap);
            if self.breakdown_guard && !(p_ap > 0.0 && p_ap.is_finite()) {
                return SolveStats::breakdown(k);
            }
            let alpha = rr / p_ap;

            axpby(pool, alpha, &ws.p, 1.0, x);
            axpby(pool, -alpha, &ws.ap, 1.0, &mut ws.r);

            let rr_new = self.ctx.dot(&ws.r, &ws.r);
            if self.breakdown_guard && !rr_new.is_finite() {
                return SolveStats::breakdown(k);
            }
            let beta = rr_new / rr;
            rr = rr_new;

            let rel = Convergence::relative_residual(rr, bb);
            self.residual_history.push(rel);
            tracing::trace!(iteration = k, rel_residual = rel);

            // An exactly vanished residual is a solution even when tol = 0.
            let done = rr <= 0.0 || self.conv.is_converged(rr, bb);
            if !done {
                axpby(pool, 1.0, &ws.r, beta, &mut ws.p);
            }
            if let Some(monitor) = self.monitor.as_mut() {
                monitor(&IterationSnapshot {
                    iteration: k,
                    rr,
                    bb,
                    alpha,
                    beta,
                    x,
                    r: &ws.r,
                    p: &ws.p,
                });
            }
            if done {
                return SolveStats::converged(k, rel);
            }
        }

        SolveStats::exhausted(self.conv.max_iters, Convergence::relative_residual(rr, bb))
    }

    fn report(&self, stats: &SolveStats<f64>) {
        if !self.ctx.is_root() {
            return;
        }
        match stats.reason {
            StopReason::ZeroRhs => {
                tracing::info!("right hand side is zero, x = 0 is exact")
            }
            StopReason::Converged => tracing::info!(
                "Converged in {} iterations, relative error is {:e}",
                stats.iterations,
                stats.final_residual
            ),
            StopReason::Exhausted => tracing::warn!(
                "Did not converge in {} iterations, relative error is {:e}",
                stats.iterations,
                stats.final_residual
            ),
            StopReason::Breakdown => tracing::warn!(
                "Numeric breakdown in iteration {} (p·Ap <= 0 or non-finite residual); is A SPD?",
                stats.iterations
            ),
        }
    }
}

impl<'a, C: Comm> LinearSolver<DenseMatrix, Vec<f64>> for CgSolver<'a, C> {
    type Error = CgError;
    type Scalar = f64;

    fn solve(
        &mut self,
        a: &DenseMatrix,
        b: &Vec<f64>,
        x: &mut Vec<f64>,
    ) -> Result<SolveStats<f64>> {
        x.resize(b.len(), 0.0);
        self.solve_slice(a, b, x)
    }
}
