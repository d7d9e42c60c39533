//! In-process communicator backed by OS threads and channels.
//!
//! Every ordered pair of ranks gets its own mpsc channel, so a message can
//! only ever be received by the rank it was addressed to and messages between
//! a fixed pair arrive in send order. Reductions funnel through rank 0.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

use itertools::izip;

use crate::comm::{Communicator, TAG_GATHER, TAG_HALO_DOWN, TAG_HALO_UP, TAG_TOKEN};
use crate::error::{Error, Result};
use crate::types::RealScalar;

enum Message<T> {
    Row { tag: i32, data: Vec<T> },
    Scalar(T),
    Token,
}

/// One rank's endpoint of an in-process worker group.
pub struct ThreadedComm<T> {
    rank: usize,
    size: usize,
    txs: Vec<Sender<Message<T>>>,
    rxs: Vec<Receiver<Message<T>>>,
    barrier: Arc<Barrier>,
}

impl<T: RealScalar> ThreadedComm<T> {
    fn post(&self, to: usize, message: Message<T>) -> Result<()> {
        self.txs[to]
            .send(message)
            .map_err(|_| Error::comm(format!("rank {to} hung up")))
    }

    fn take_row(&self, from: usize, tag: i32) -> Result<Vec<T>> {
        match self.rxs[from].recv() {
            Ok(Message::Row { tag: got, data }) if got == tag => Ok(data),
            Ok(Message::Row { tag: got, .. }) => Err(Error::comm(format!(
                "rank {from} sent tag {got}, expected {tag}"
            ))),
            Ok(_) => Err(Error::comm(format!(
                "rank {from} sent a non-row message, expected tag {tag}"
            ))),
            Err(_) => Err(Error::comm(format!("rank {from} hung up"))),
        }
    }

    fn take_scalar(&self, from: usize) -> Result<T> {
        match self.rxs[from].recv() {
            Ok(Message::Scalar(value)) => Ok(value),
            Ok(_) => Err(Error::comm(format!(
                "rank {from} sent a non-scalar message during a reduction"
            ))),
            Err(_) => Err(Error::comm(format!("rank {from} hung up"))),
        }
    }
}

impl<T: RealScalar> Communicator<T> for ThreadedComm<T> {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn exchange(
        &self,
        up: Option<(usize, &[T])>,
        down: Option<(usize, &[T])>,
    ) -> Result<(Option<Vec<T>>, Option<Vec<T>>)> {
        // Channel sends never block, so both outgoing rows are in flight
        // before this rank waits on either incoming one.
        if let Some((to, row)) = up {
            self.post(
                to,
                Message::Row {
                    tag: TAG_HALO_UP,
                    data: row.to_vec(),
                },
            )?;
        }
        if let Some((to, row)) = down {
            self.post(
                to,
                Message::Row {
                    tag: TAG_HALO_DOWN,
                    data: row.to_vec(),
                },
            )?;
        }
        let from_up = up
            .map(|(from, _)| self.take_row(from, TAG_HALO_DOWN))
            .transpose()?;
        let from_down = down
            .map(|(from, _)| self.take_row(from, TAG_HALO_UP))
            .transpose()?;
        Ok((from_up, from_down))
    }

    fn all_reduce_max(&self, local: T) -> Result<T> {
        if self.size == 1 {
            return Ok(local);
        }
        if self.rank == 0 {
            let mut global = local;
            for from in 1..self.size {
                global = global.max(self.take_scalar(from)?);
            }
            for to in 1..self.size {
                self.post(to, Message::Scalar(global))?;
            }
            Ok(global)
        } else {
            self.post(0, Message::Scalar(local))?;
            self.take_scalar(0)
        }
    }

    fn gather(&self, block: &[T], counts: &[usize]) -> Result<Option<Vec<T>>> {
        if self.rank == 0 {
            let mut assembled = Vec::with_capacity(counts.iter().sum());
            assembled.extend_from_slice(block);
            for from in 1..self.size {
                let data = self.take_row(from, TAG_GATHER)?;
                if data.len() != counts[from] {
                    return Err(Error::comm(format!(
                        "rank {from} contributed {} values, expected {}",
                        data.len(),
                        counts[from]
                    )));
                }
                assembled.extend_from_slice(&data);
            }
            Ok(Some(assembled))
        } else {
            self.post(
                0,
                Message::Row {
                    tag: TAG_GATHER,
                    data: block.to_vec(),
                },
            )?;
            Ok(None)
        }
    }

    fn send_token(&self, to: usize) -> Result<()> {
        self.post(to, Message::Token)
    }

    fn recv_token(&self, from: usize) -> Result<()> {
        match self.rxs[from].recv() {
            Ok(Message::Token) => Ok(()),
            Ok(_) => Err(Error::comm(format!(
                "rank {from} sent a non-token message, expected tag {TAG_TOKEN}"
            ))),
            Err(_) => Err(Error::comm(format!("rank {from} hung up"))),
        }
    }

    fn barrier(&self) {
        self.barrier.wait();
    }
}

/// Build the endpoints of a `size`-rank in-process group.
pub fn create_group<T: RealScalar>(size: usize) -> Vec<ThreadedComm<T>> {
    let mut senders: Vec<Vec<Sender<Message<T>>>> = (0..size).map(|_| Vec::new()).collect();
    let mut receivers: Vec<Vec<Receiver<Message<T>>>> = (0..size).map(|_| Vec::new()).collect();
    for from in 0..size {
        for to in 0..size {
            let (tx, rx) = channel();
            senders[from].push(tx);
            receivers[to].push(rx);
        }
    }
    // receivers[to] was filled in `from` order, matching the sender indexing.
    let barrier = Arc::new(Barrier::new(size));
    izip!(0..size, senders, receivers)
        .map(|(rank, txs, rxs)| ThreadedComm {
            rank,
            size,
            txs,
            rxs,
            barrier: Arc::clone(&barrier),
        })
        .collect()
}

/// Run `f` once per rank on its own thread and return the results in rank
/// order.
pub fn run_group<T, R, F>(size: usize, f: F) -> Vec<R>
where
    T: RealScalar,
    R: Send,
    F: Fn(ThreadedComm<T>) -> R + Send + Sync,
{
    let group = create_group(size);
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = group
            .into_iter()
            .map(|comm| s.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::run_group;
    use crate::comm::Communicator;

    #[test]
    fn reduction_agrees_across_ranks() {
        let results = run_group::<f64, _, _>(4, |comm| {
            comm.all_reduce_max(comm.rank() as f64).unwrap()
        });
        assert_eq!(results, vec![3.0; 4]);
    }

    #[test]
    fn gather_assembles_in_rank_order() {
        let results = run_group::<f64, _, _>(3, |comm| {
            let block = vec![comm.rank() as f64; 2];
            comm.gather(&block, &[2, 2, 2]).unwrap()
        });
        assert_eq!(results[0], Some(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]));
        assert_eq!(results[1], None);
        assert_eq!(results[2], None);
    }

    #[test]
    fn barrier_releases_every_rank() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let arrived = AtomicUsize::new(0);
        run_group::<f64, _, _>(4, |comm| {
            arrived.fetch_add(1, Ordering::SeqCst);
            comm.barrier();
            // Nobody passes the barrier before everyone has arrived.
            assert_eq!(arrived.load(Ordering::SeqCst), 4);
        });
    }

    #[test]
    fn token_ring_orders_ranks() {
        let results = run_group::<f64, _, _>(3, |comm| {
            if comm.rank() > 0 {
                comm.recv_token(comm.rank() - 1).unwrap();
            }
            if comm.rank() + 1 < comm.size() {
                comm.send_token(comm.rank() + 1).unwrap();
            }
            comm.rank()
        });
        assert_eq!(results, vec![0, 1, 2]);
    }
}
