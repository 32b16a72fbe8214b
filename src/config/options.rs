//! Solver options.
//!
//! This module provides the `SolverOptions` struct, which collects the knobs
//! of a CG solve: iteration cap, relative residual tolerance, kernel threads
//! per participant, and whether numeric breakdown is detected. Defaults match
//! the command-line driver; `with_env_overrides` lets a job script adjust
//! them without touching the command line.

use std::str::FromStr;

use crate::error::{CgError, Result};

pub const ENV_MAX_ITERS: &str = "PARCG_MAX_ITERS";
pub const ENV_REL_TOL: &str = "PARCG_REL_TOL";
pub const ENV_NUM_THREADS: &str = "PARCG_NUM_THREADS";

#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Maximum number of CG iterations.
    pub max_iters: usize,

    /// Stop once √(⟨r,r⟩ / ⟨b,b⟩) drops below this.
    pub rel_tol: f64,

    /// Kernel worker threads per participant.
    pub threads: usize,

    /// Stop with a breakdown report on p·Ap ≤ 0 or non-finite scalars.
    pub breakdown_guard: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            rel_tol: 1e-9,
            threads: num_cpus::get(),
            breakdown_guard: true,
        }
    }
}

impl SolverOptions {
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }
    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
    pub fn with_breakdown_guard(mut self, flag: bool) -> Self {
        self.breakdown_guard = flag;
        self
    }

    /// Apply `PARCG_MAX_ITERS`, `PARCG_REL_TOL` and `PARCG_NUM_THREADS` when set.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = parse_var::<usize>(&lookup, ENV_MAX_ITERS)? {
            self.max_iters = v;
        }
        if let Some(v) = parse_var::<f64>(&lookup, ENV_REL_TOL)? {
            if !(v >= 0.0) {
                return Err(CgError::InvalidOption { name: ENV_REL_TOL, value: v.to_string() });
            }
            self.rel_tol = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, ENV_NUM_THREADS)? {
            if v == 0 {
                return Err(CgError::InvalidOption { name: ENV_NUM_THREADS, value: v.to_string() });
            }
            self.threads = v;
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CgError::InvalidOption { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_driver() {
        let opts = SolverOptions::default();
        assert_eq!(opts.max_iters, 1000);
        assert_eq!(opts.rel_tol, 1e-9);
        assert!(opts.threads >= 1);
        assert!(opts.breakdown_guard);
    }

    #[test]
    fn overrides_apply() {
        let opts = SolverOptions::default()
            .with_overrides(lookup(&[
                (ENV_MAX_ITERS, "25"),
                (ENV_REL_TOL, "1e-6"),
                (ENV_NUM_THREADS, " 3 "),
            ]))
            .unwrap();
        assert_eq!(opts.max_iters, 25);
        assert_eq!(opts.rel_tol, 1e-6);
        assert_eq!(opts.threads, 3);
    }

    #[test]
    fn blank_values_are_ignored() {
        let opts = SolverOptions::default()
            .with_max_iters(7)
            .with_overrides(lookup(&[(ENV_MAX_ITERS, "")]))
            .unwrap();
        assert_eq!(opts.max_iters, 7);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = SolverOptions::default()
            .with_overrides(lookup(&[(ENV_NUM_THREADS, "many")]))
            .unwrap_err();
        assert!(matches!(err, CgError::InvalidOption { name: ENV_NUM_THREADS, .. }));
        let err = SolverOptions::default()
            .with_overrides(lookup(&[(ENV_REL_TOL, "-1")]))
            .unwrap_err();
        assert!(matches!(err, CgError::InvalidOption { name: ENV_REL_TOL, .. }));
    }
}
