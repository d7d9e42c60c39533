//! MPI communicator for runs launched under `mpirun`.

use mpi::collective::SystemOperation;
use mpi::datatype::PartitionMut;
use mpi::traits::{
    Communicator as MpiCommunicator, CommunicatorCollectives, Destination, Equivalence, Root,
    Source,
};

use itertools::Itertools;

use crate::comm::{Communicator, TAG_HALO_DOWN, TAG_HALO_UP, TAG_TOKEN};
use crate::error::Result;
use crate::types::RealScalar;

/// Adapter that lets the solver run over any MPI communicator.
pub struct MpiComm<'a, C: MpiCommunicator> {
    comm: &'a C,
}

impl<'a, C: MpiCommunicator> MpiComm<'a, C> {
    /// Wrap an MPI communicator, typically the world.
    pub fn new(comm: &'a C) -> Self {
        Self { comm }
    }
}

impl<T, C> Communicator<T> for MpiComm<'_, C>
where
    T: RealScalar + Equivalence,
    C: MpiCommunicator,
{
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn exchange(
        &self,
        up: Option<(usize, &[T])>,
        down: Option<(usize, &[T])>,
    ) -> Result<(Option<Vec<T>>, Option<Vec<T>>)> {
        let mut from_up = up.map(|(_, row)| vec![T::zero(); row.len()]);
        let mut from_down = down.map(|(_, row)| vec![T::zero(); row.len()]);
        let nreqs = 2 * (usize::from(up.is_some()) + usize::from(down.is_some()));
        mpi::request::multiple_scope(nreqs, |scope, coll| {
            // All sends and receives are posted before anything is awaited,
            // so the round completes in any rank order.
            if let Some((to, row)) = up {
                coll.add(
                    self.comm
                        .process_at_rank(to as i32)
                        .immediate_send_with_tag(scope, row, TAG_HALO_UP),
                );
            }
            if let Some((to, row)) = down {
                coll.add(
                    self.comm
                        .process_at_rank(to as i32)
                        .immediate_send_with_tag(scope, row, TAG_HALO_DOWN),
                );
            }
            if let Some(buffer) = from_up.as_mut() {
                let from = up.expect("receive buffer implies a predecessor").0;
                coll.add(
                    self.comm
                        .process_at_rank(from as i32)
                        .immediate_receive_into_with_tag(scope, &mut buffer[..], TAG_HALO_DOWN),
                );
            }
            if let Some(buffer) = from_down.as_mut() {
                let from = down.expect("receive buffer implies a successor").0;
                coll.add(
                    self.comm
                        .process_at_rank(from as i32)
                        .immediate_receive_into_with_tag(scope, &mut buffer[..], TAG_HALO_UP),
                );
            }
            let mut statuses = Vec::with_capacity(nreqs);
            coll.wait_all(&mut statuses);
        });
        Ok((from_up, from_down))
    }

    fn all_reduce_max(&self, local: T) -> Result<T> {
        let mut global = local;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::max());
        Ok(global)
    }

    fn gather(&self, block: &[T], counts: &[usize]) -> Result<Option<Vec<T>>> {
        let root = self.comm.process_at_rank(0);
        if self.comm.rank() == 0 {
            let counts = counts.iter().map(|&c| c as i32).collect_vec();
            let displacements = counts
                .iter()
                .scan(0, |offset, &count| {
                    let start = *offset;
                    *offset += count;
                    Some(start)
                })
                .collect_vec();
            let mut assembled = vec![T::zero(); counts.iter().sum::<i32>() as usize];
            let mut partition =
                PartitionMut::new(&mut assembled[..], &counts[..], &displacements[..]);
            root.gather_varcount_into_root(block, &mut partition);
            Ok(Some(assembled))
        } else {
            root.gather_varcount_into(block);
            Ok(None)
        }
    }

    fn send_token(&self, to: usize) -> Result<()> {
        self.comm
            .process_at_rank(to as i32)
            .send_with_tag(&1i32, TAG_TOKEN);
        Ok(())
    }

    fn recv_token(&self, from: usize) -> Result<()> {
        let mut token = 0i32;
        self.comm
            .process_at_rank(from as i32)
            .receive_into_with_tag(&mut token, TAG_TOKEN);
        Ok(())
    }

    fn barrier(&self) {
        self.comm.barrier();
    }
}
