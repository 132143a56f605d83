use std::sync::atomic::{AtomicU64, Ordering};
use rayon::prelude::*;
use crate::error::Result;
use crate::message::comm::Communicator;




/**
 * A 64-bit float stored in an atomic cell, supporting lock-free extremum
 * updates. A value is only ever replaced by one that compares strictly
 * greater (`fetch_max`) or strictly less (`fetch_min`), so every successful
 * swap makes progress and the retry loops terminate. NaN never compares
 * greater or less, so it is never stored by either update.
 */
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);




// ============================================================================
impl AtomicF64 {

    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release)
    }

    /// Store `value` if it exceeds the current value. Returns the value held
    /// before the call.
    pub fn fetch_max(&self, value: f64) -> f64 {
        self.fetch_update_if(value, |new, old| new > old)
    }

    /// Store `value` if it is below the current value. Returns the value
    /// held before the call.
    pub fn fetch_min(&self, value: f64) -> f64 {
        self.fetch_update_if(value, |new, old| new < old)
    }

    fn fetch_update_if<F: Fn(f64, f64) -> bool>(&self, value: f64, improves: F) -> f64 {
        let mut current = self.0.load(Ordering::Acquire);

        loop {
            let old = f64::from_bits(current);

            if !improves(value, old) {
                return old;
            }
            match self.0.compare_exchange_weak(current, value.to_bits(), Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return old,
                Err(actual) => current = actual,
            }
        }
    }
}




/**
 * The two extrema gathered by one pass of the update operator: the largest
 * edge wavespeed and the smallest admissible step size over nodes.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrema {
    pub max_wavespeed: f64,
    pub min_tau: f64,
}

impl Extrema {
    pub fn identity() -> Self {
        Self { max_wavespeed: f64::NEG_INFINITY, min_tau: f64::INFINITY }
    }

    pub fn wavespeed(lambda: f64) -> Self {
        Self { max_wavespeed: lambda, ..Self::identity() }
    }

    pub fn tau(tau: f64) -> Self {
        Self { min_tau: tau, ..Self::identity() }
    }

    /// Combine two partial results. NaN entries are ignored.
    pub fn combine(self, other: Self) -> Self {
        Self {
            max_wavespeed: self.max_wavespeed.max(other.max_wavespeed),
            min_tau: self.min_tau.min(other.min_tau),
        }
    }
}

impl Default for Extrema {
    fn default() -> Self {
        Self::identity()
    }
}




/**
 * Shared-memory reduction of per-item extrema, followed by a collective
 * reduction across the ranks of a communicator. Rayon folds the items of a
 * parallel iterator into one partial per split, and each partial is
 * published into the shared cells with a single atomic update per
 * quantity. Max and min are associative and commutative, so the result does
 * not depend on the number of threads, the scheduling, or the partitioning
 * of the items across ranks.
 */
#[derive(Debug)]
pub struct WavespeedReduction {
    max_wavespeed: AtomicF64,
    min_tau: AtomicF64,
}




// ============================================================================
impl WavespeedReduction {

    pub fn new() -> Self {
        let identity = Extrema::identity();

        Self {
            max_wavespeed: AtomicF64::new(identity.max_wavespeed),
            min_tau: AtomicF64::new(identity.min_tau),
        }
    }

    /// Fold a local partial result into the shared cells. This may be called
    /// concurrently from any number of threads.
    pub fn publish(&self, partial: Extrema) {
        self.max_wavespeed.fetch_max(partial.max_wavespeed);
        self.min_tau.fetch_min(partial.min_tau);
    }

    /// Reduce the extrema produced by a parallel iterator into the shared
    /// cells.
    pub fn reduce_par_iter<I>(&self, iter: I)
    where
        I: ParallelIterator<Item = Extrema>,
    {
        iter.fold(Extrema::identity, Extrema::combine)
            .for_each(|partial| self.publish(partial))
    }

    /// The result of the shared-memory reduction so far.
    pub fn local(&self) -> Extrema {
        Extrema {
            max_wavespeed: self.max_wavespeed.load(),
            min_tau: self.min_tau.load(),
        }
    }

    /// Complete the reduction across every rank of the communicator. This is
    /// a collective operation.
    pub fn global<C: Communicator>(&self, comm: &C) -> Result<Extrema> {
        let local = self.local();

        Ok(Extrema {
            max_wavespeed: comm.all_reduce_max(local.max_wavespeed)?,
            min_tau: comm.all_reduce_min(local.min_tau)?,
        })
    }
}

impl Default for WavespeedReduction {
    fn default() -> Self {
        Self::new()
    }
}
