// In-process participants: one OS thread per rank, shared-memory collectives.

use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use super::Comm;

struct Shared {
    size: usize,
    barrier: Barrier,
    scalars: Mutex<Vec<f64>>,
    exchange: Mutex<Vec<f64>>,
}

impl Shared {
    // Slots hold plain f64 data, so a poisoned lock is still usable.
    fn scalars(&self) -> MutexGuard<'_, Vec<f64>> {
        self.scalars.lock().unwrap_or_else(|e| e.into_inner())
    }
    fn exchange(&self) -> MutexGuard<'_, Vec<f64>> {
        self.exchange.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One participant's handle into a group of in-process participants.
///
/// Collectives are two-phase: each participant publishes into shared slots,
/// waits on the group barrier, reads, then waits again so no slot is reused
/// before everyone has read it.
pub struct LocalComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl LocalComm {
    /// Handles for a group of `size` participants (at least one), in rank order.
    pub fn group(size: usize) -> Vec<LocalComm> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            scalars: Mutex::new(vec![0.0; size]),
            exchange: Mutex::new(Vec::new()),
        });
        (0..size)
            .map(|rank| LocalComm { rank, shared: Arc::clone(&shared) })
            .collect()
    }

    /// A group of one; every collective is the identity.
    pub fn solo() -> LocalComm {
        LocalComm::group(1).remove(0)
    }
}

impl Comm for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.shared.size
    }
    fn barrier(&self) {
        self.shared.barrier.wait();
    }

    fn all_sum(&self, local: f64) -> f64 {
        if self.shared.size == 1 {
            return local;
        }
        self.shared.scalars()[self.rank] = local;
        self.barrier();
        // Rank order, so every participant produces the identical sum.
        let total = self.shared.scalars().iter().sum();
        self.barrier();
        total
    }

    fn all_gather_segments(&self, local: &[f64], out: &mut [f64]) {
        let count = local.len();
        assert_eq!(out.len(), count * self.shared.size, "gather output has incorrect length");
        if self.shared.size == 1 {
            out.copy_from_slice(local);
            return;
        }
        {
            let mut exchange = self.shared.exchange();
            if exchange.len() != out.len() {
                exchange.resize(out.len(), 0.0);
            }
            exchange[self.rank * count..(self.rank + 1) * count].copy_from_slice(local);
        }
        self.barrier();
        out.copy_from_slice(&self.shared.exchange());
        self.barrier();
    }

    fn broadcast(&self, buf: &mut Vec<f64>, root: usize) {
        if self.shared.size == 1 {
            return;
        }
        if self.rank == root {
            let mut exchange = self.shared.exchange();
            exchange.clear();
            exchange.extend_from_slice(buf);
        }
        self.barrier();
        if self.rank != root {
            buf.clear();
            buf.extend_from_slice(&self.shared.exchange());
        }
        self.barrier();
    }
}

/// Run `f` on `size` participants, each on its own scoped thread with its own
/// [`LocalComm`]. Results come back in rank order. A panic on any participant
/// is re-raised on the caller, but only after every participant has returned:
/// participants still blocked in a collective are never released, so a panic
/// on one rank while the others wait in a collective hangs the whole group.
pub fn run_participants<R, F>(size: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(LocalComm) -> R + Sync,
{
    let comms = LocalComm::group(size);
    std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_collectives_are_identity() {
        let comm = LocalComm::solo();
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.all_sum(42.0), 42.0);
        let mut out = vec![0.0; 2];
        comm.all_gather_segments(&[1.0, 2.0], &mut out);
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn all_sum_is_replicated() {
        let sums = run_participants(4, |comm| comm.all_sum(comm.rank() as f64 + 1.0));
        assert_eq!(sums, vec![10.0; 4]);
    }

    #[test]
    fn repeated_all_sums_do_not_interfere() {
        let sums = run_participants(3, |comm| {
            (0..50).map(|k| comm.all_sum((k * comm.rank()) as f64)).collect::<Vec<_>>()
        });
        let expected: Vec<f64> = (0..50).map(|k| (3 * k) as f64).collect();
        for s in sums {
            assert_eq!(s, expected);
        }
    }

    #[test]
    fn gather_concatenates_in_rank_order() {
        let outs = run_participants(3, |comm| {
            let r = comm.rank() as f64;
            let mut out = vec![0.0; 6];
            comm.all_gather_segments(&[r, r + 0.5], &mut out);
            out
        });
        for out in outs {
            assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
        }
    }

    #[test]
    fn broadcast_from_root_resizes_receivers() {
        let bufs = run_participants(3, |comm| {
            let mut buf = if comm.rank() == 1 { vec![7.0, 8.0, 9.0] } else { Vec::new() };
            comm.broadcast(&mut buf, 1);
            buf
        });
        for buf in bufs {
            assert_eq!(buf, vec![7.0, 8.0, 9.0]);
        }
    }
}
