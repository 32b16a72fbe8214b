//! Block partitioning of an index range across ranks or threads.
//!
//! Every part but the last receives `⌊len / parts⌋` indices; the last part
//! absorbs the remainder. The same rule bands matrix rows across
//! participants, segments vectors for distributed dot products, and splits
//! kernel loops across worker threads.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionPlan {
    len: usize,
    parts: usize,
}

impl PartitionPlan {
    /// Plan `len` indices over `parts` owners. A zero part count is treated as one.
    pub fn new(len: usize, parts: usize) -> Self {
        Self { len, parts: parts.max(1) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Uniform chunk size `⌊len / parts⌋`.
    pub fn chunk(&self) -> usize {
        self.len / self.parts
    }

    /// True when every part has the same count, which equal-segment gathers require.
    pub fn is_uniform(&self) -> bool {
        self.len % self.parts == 0
    }

    pub fn start(&self, part: usize) -> usize {
        debug_assert!(part < self.parts);
        part * self.chunk()
    }

    pub fn count(&self, part: usize) -> usize {
        debug_assert!(part < self.parts);
        if part + 1 == self.parts {
            self.len - (self.parts - 1) * self.chunk()
        } else {
            self.chunk()
        }
    }

    pub fn range(&self, part: usize) -> Range<usize> {
        let start = self.start(part);
        start..start + self.count(part)
    }

    /// All part ranges in order; they tile `0..len` exactly.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.parts).map(move |p| self.range(p))
    }
}
