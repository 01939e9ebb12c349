//! Global scalar reductions across cooperating ranks.
//!
//! Thread-level folds use explicit reduction values (`MaxReduction`,
//! `SumReduction`) with an identity and a merge; the rank-level step goes
//! through an [`AllReduce`] implementation. Every `AllReduce` call is a
//! collective: all ranks of a group must make the same calls in the same order.

use std::sync::{Arc, Barrier, Mutex};

use nf_core::Real;

/// Associative fold with an identity element.
pub trait Reduction: Copy + Send + Sync {
    const IDENTITY: Self;

    fn merge(self, other: Self) -> Self;

    fn value(self) -> Real;
}

/// Running maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxReduction(pub Real);

impl Reduction for MaxReduction {
    const IDENTITY: Self = Self(Real::NEG_INFINITY);

    fn merge(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    fn value(self) -> Real {
        self.0
    }
}

/// Running sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SumReduction(pub Real);

impl Reduction for SumReduction {
    const IDENTITY: Self = Self(0.0);

    fn merge(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    fn value(self) -> Real {
        self.0
    }
}

/// Cross-rank reduction of scalars.
pub trait AllReduce: Send + Sync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn reduce_max(&self, value: Real) -> Real;

    fn reduce_sum(&self, value: Real) -> Real;

    /// Element-wise sum, in place.
    fn reduce_sum_slice(&self, values: &mut [Real]);
}

/// Single rank; every reduction is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialReducer;

impl AllReduce for SerialReducer {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn reduce_max(&self, value: Real) -> Real {
        value
    }

    fn reduce_sum(&self, value: Real) -> Real {
        value
    }

    fn reduce_sum_slice(&self, _values: &mut [Real]) {}
}

struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<Option<Vec<Real>>>>,
}

/// In-process ranks that reduce through a shared barrier.
///
/// Each rank posts its contribution, waits for the others, folds all slots in
/// rank order and waits again before returning, so every rank sees the same
/// bit-identical result.
#[derive(Clone)]
pub struct ThreadCommunicator {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ThreadCommunicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadCommunicator")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

impl ThreadCommunicator {
    /// One communicator per rank; hand each to its own thread.
    pub fn group(size: usize) -> Vec<Self> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![None; size]),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    fn all_reduce(&self, values: &mut [Real], op: fn(Real, Real) -> Real) {
        {
            let mut slots = self.shared.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots[self.rank] = Some(values.to_vec());
        }
        self.shared.barrier.wait();
        {
            let slots = self.shared.slots.lock().unwrap_or_else(|e| e.into_inner());
            let mut posted = slots.iter().flatten();
            if let Some(first) = posted.next() {
                let mut acc = first.clone();
                for other in posted {
                    for (a, b) in acc.iter_mut().zip(other) {
                        *a = op(*a, *b);
                    }
                }
                for (v, a) in values.iter_mut().zip(&acc) {
                    *v = *a;
                }
            }
        }
        self.shared.barrier.wait();
    }
}

impl AllReduce for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce_max(&self, value: Real) -> Real {
        let mut v = [value];
        self.all_reduce(&mut v, Real::max);
        v[0]
    }

    fn reduce_sum(&self, value: Real) -> Real {
        let mut v = [value];
        self.all_reduce(&mut v, |a, b| a + b);
        v[0]
    }

    fn reduce_sum_slice(&self, values: &mut [Real]) {
        self.all_reduce(values, |a, b| a + b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_neutral() {
        assert_eq!(MaxReduction::IDENTITY.merge(MaxReduction(-3.0)).value(), -3.0);
        assert_eq!(SumReduction::IDENTITY.merge(SumReduction(2.5)).value(), 2.5);
    }

    #[test]
    fn serial_reducer_is_identity() {
        let r = SerialReducer;
        assert_eq!(r.reduce_max(4.0), 4.0);
        assert_eq!(r.reduce_sum(4.0), 4.0);
        let mut v = [1.0, 2.0];
        r.reduce_sum_slice(&mut v);
        assert_eq!(v, [1.0, 2.0]);
    }

    #[test]
    fn thread_ranks_agree() {
        let comms = ThreadCommunicator::group(4);
        let results: Vec<(Real, Real, [Real; 2])> = std::thread::scope(|s| {
            let handles: Vec<_> = comms
                .iter()
                .map(|c| {
                    s.spawn(move || {
                        let r = c.rank() as Real;
                        let max = c.reduce_max(r);
                        let sum = c.reduce_sum(r);
                        let mut slice = [1.0, r];
                        c.reduce_sum_slice(&mut slice);
                        (max, sum, slice)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (max, sum, slice) in results {
            assert_eq!(max, 3.0);
            assert_eq!(sum, 6.0);
            assert_eq!(slice, [4.0, 6.0]);
        }
    }
}
