//! Per-participant worker pool for the local kernels.
//!
//! `KernelPool` wraps a private rayon thread pool with a fixed thread count and
//! exposes `parallel_for`-style loops over a *static* contiguous partition:
//! the index range is split with [`PartitionPlan`] into one part per thread
//! and each part runs as a single task. The end of every call is a join, so
//! outside these loops execution is single-threaded.

use std::ops::Range;

use crate::error::Result;
use crate::utils::partition::PartitionPlan;

pub struct KernelPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl KernelPool {
    /// Build a pool with exactly `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("parcg-kernel-{i}"))
            .build()?;
        Ok(KernelPool { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Static contiguous split of `range`, one non-empty part per thread at most.
    pub fn static_chunks(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let offset = range.start;
        PartitionPlan::new(range.len(), self.threads)
            .ranges()
            .filter(|r| !r.is_empty())
            .map(|r| r.start + offset..r.end + offset)
            .collect()
    }

    /// Run `body` once per static part of `range`.
    pub fn parallel_for<F>(&self, range: Range<usize>, body: F)
    where
        F: Fn(Range<usize>) + Sync,
    {
        let chunks = self.static_chunks(range);
        if chunks.len() <= 1 {
            chunks.into_iter().for_each(body);
            return;
        }
        self.pool.scope(|s| {
            for chunk in chunks {
                let body = &body;
                s.spawn(move |_| body(chunk));
            }
        });
    }

    /// Sum of `body` over the static parts of `range`. Partials are combined in
    /// part order, so the result is deterministic for a fixed thread count.
    pub fn parallel_sum<F>(&self, range: Range<usize>, body: F) -> f64
    where
        F: Fn(Range<usize>) -> f64 + Sync,
    {
        let chunks = self.static_chunks(range);
        if chunks.len() <= 1 {
            return chunks.into_iter().map(body).sum();
        }
        let mut partials = vec![0.0; chunks.len()];
        self.pool.scope(|s| {
            for (chunk, slot) in chunks.into_iter().zip(partials.iter_mut()) {
                let body = &body;
                s.spawn(move |_| *slot = body(chunk));
            }
        });
        partials.iter().sum()
    }

    /// Hand each thread a disjoint mutable sub-slice of `data` together with
    /// the offset of its first element.
    pub fn parallel_chunks_mut<F>(&self, data: &mut [f64], body: F)
    where
        F: Fn(usize, &mut [f64]) + Sync,
    {
        let chunks = self.static_chunks(0..data.len());
        if chunks.len() <= 1 {
            if !data.is_empty() {
                body(0, data);
            }
            return;
        }
        self.pool.scope(|s| {
            let mut rest = data;
            for chunk in chunks {
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(chunk.len());
                rest = tail;
                let body = &body;
                s.spawn(move |_| body(chunk.start, head));
            }
        });
    }
}
