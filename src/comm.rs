//! Message-passing substrate for the solver.
//!
//! The relaxation loop talks to its peers only through the [`Communicator`]
//! trait, so the same loop runs unchanged over OS threads (the `threaded`
//! module) or over MPI ranks (the `mpi` module, behind the `mpi` feature).

use crate::error::Result;
use crate::types::RealScalar;

pub mod threaded;

#[cfg(feature = "mpi")]
pub mod mpi;

/// A row travelling upward, from a worker to its predecessor.
pub(crate) const TAG_HALO_UP: i32 = 0;
/// A row travelling downward, from a worker to its successor.
pub(crate) const TAG_HALO_DOWN: i32 = 1;
/// The write-permission token of the ordered output ring.
pub(crate) const TAG_TOKEN: i32 = 2;
/// A partition block being gathered at rank 0.
pub(crate) const TAG_GATHER: i32 = 3;

/// One worker's endpoint into a fixed group of message-passing peers.
///
/// All workers must make the same sequence of collective calls
/// ([`Communicator::all_reduce_max`], [`Communicator::gather`],
/// [`Communicator::barrier`]) or the group deadlocks.
pub trait Communicator<T: RealScalar> {
    /// This worker's rank.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Swap boundary rows with the row-adjacent neighbours in one round.
    ///
    /// `up` names the predecessor and the row to send it; `down` names the
    /// successor and the row to send it. Returns the rows received from the
    /// predecessor and successor in the same order. All transfers of the
    /// round are in flight before any completion is awaited, so the exchange
    /// cannot deadlock regardless of rank order.
    fn exchange(
        &self,
        up: Option<(usize, &[T])>,
        down: Option<(usize, &[T])>,
    ) -> Result<(Option<Vec<T>>, Option<Vec<T>>)>;

    /// Reduce `local` over the whole group with `max` and hand every worker
    /// the result.
    fn all_reduce_max(&self, local: T) -> Result<T>;

    /// Collect every worker's block at rank 0, in rank order.
    ///
    /// `counts` gives the block length contributed by each rank; every worker
    /// must pass the same counts. Returns the concatenation on rank 0 and
    /// `None` elsewhere.
    fn gather(&self, block: &[T], counts: &[usize]) -> Result<Option<Vec<T>>>;

    /// Pass the output token to rank `to`.
    fn send_token(&self, to: usize) -> Result<()>;

    /// Block until rank `from` passes the output token.
    fn recv_token(&self, from: usize) -> Result<()>;

    /// Block until every worker in the group has arrived.
    fn barrier(&self);
}
