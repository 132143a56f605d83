use crate::error::Result;
use super::util;

/// Interface for a group of processes that can exchange messages. The
/// underlying transport can be in-process channels, TCP, or a higher level
/// abstraction like MPI.
///
/// Collective operations (`broadcast`, `reduce`, `all_reduce` and the typed
/// extremum reductions) must be entered by every rank of the group, in the
/// same order.
///
pub trait Communicator {
    /// Must be implemented to return the rank of this process within the
    /// communicator.
    fn rank(&self) -> usize;

    /// Must be implemented to return the number of peer processes in this
    /// communicator.
    fn size(&self) -> usize;

    /// Must be implemented to send a message to a peer. This method must
    /// return immediately, in other words it is not allowed to block until a
    /// matching receive is posted.
    fn send(&self, rank: usize, message: Vec<u8>) -> Result<()>;

    /// Must be implemented to receive a message from any of the peers. This
    /// method is allowed to block until a message is ready to be received.
    fn recv(&self) -> Result<Vec<u8>>;

    /// Implements a binomial tree broadcast from the root node. The message
    /// buffer must be `Some` if this is the root node, and it must be `None`
    /// otherwise.
    ///
    fn broadcast(&self, value: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let r = self.rank();
        let p = self.size();

        let value = match value {
            Some(value) => value,
            None => self.recv()?,
        };
        for level in (0..util::ceil_log2(p)).rev() {
            let one = 1 << level;
            let two = 1 << (level + 1);

            if r % two == 0 && r + one < p {
                self.send(r + one, value.clone())?
            }
        }
        Ok(value)
    }

    /// Implements a binomial tree reduce. All ranks return `None` except for
    /// the root. At each level the surviving ranks absorb the partial result
    /// of the rank `2^level` above them, so every rank sends exactly once.
    ///
    fn reduce<F>(&self, f: F, mut value: Vec<u8>) -> Result<Option<Vec<u8>>>
    where
        F: Fn(Vec<u8>, Vec<u8>) -> Vec<u8>,
    {
        let r = self.rank();
        let p = self.size();

        for level in 0..util::ceil_log2(p) {
            let one = 1 << level;
            let two = 1 << (level + 1);

            if r % two == 0 {
                if r + one < p {
                    value = f(value, self.recv()?)
                }
            } else {
                self.send(r - one, value)?;
                return Ok(None);
            }
        }
        Ok(Some(value))
    }

    /// Implements an all-reduce (symmetric fold) operation over a commutative
    /// binary operator.
    ///
    fn all_reduce<F>(&self, f: F, value: Vec<u8>) -> Result<Vec<u8>>
    where
        F: Fn(Vec<u8>, Vec<u8>) -> Vec<u8>,
    {
        let reduced = self.reduce(f, value)?;
        self.broadcast(reduced)
    }

    /// The maximum of `value` over all ranks. NaN contributions are ignored
    /// unless every rank contributes NaN.
    ///
    fn all_reduce_max(&self, value: f64) -> Result<f64> {
        let combine = |a: Vec<u8>, b: Vec<u8>| util::f64_to_bytes(f64::max(util::f64_from_bytes(&a), util::f64_from_bytes(&b)));
        Ok(util::f64_from_bytes(&self.all_reduce(combine, util::f64_to_bytes(value))?))
    }

    /// The minimum of `value` over all ranks.
    ///
    fn all_reduce_min(&self, value: f64) -> Result<f64> {
        let combine = |a: Vec<u8>, b: Vec<u8>| util::f64_to_bytes(f64::min(util::f64_from_bytes(&a), util::f64_from_bytes(&b)));
        Ok(util::f64_from_bytes(&self.all_reduce(combine, util::f64_to_bytes(value))?))
    }
}
