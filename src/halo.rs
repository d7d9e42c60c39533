//! Ghost-row exchange between row-adjacent partitions.

use crate::comm::Communicator;
use crate::error::{Error, Result};
use crate::partition::LocalPartition;
use crate::types::{ProcessTopology, RealScalar};

/// Refresh this partition's ghost rows from its neighbours.
///
/// The predecessor receives our topmost owned row and we receive its
/// bottommost one into our top ghost; symmetrically for the successor. After
/// this returns, both ghost rows hold their neighbours' values from the end
/// of the previous sweep.
pub fn exchange<T: RealScalar, C: Communicator<T>>(
    comm: &C,
    topology: &ProcessTopology,
    partition: &mut LocalPartition<T>,
) -> Result<()> {
    let up = topology.predecessor().map(|to| (to, partition.first_row()));
    let down = topology.successor().map(|to| (to, partition.last_row()));
    let (from_up, from_down) = comm.exchange(up, down)?;

    if let Some(row) = from_up {
        let ghost = partition
            .ghost_top_row_mut()
            .ok_or_else(|| Error::comm("received a top ghost row without a predecessor"))?;
        if row.len() != ghost.len() {
            return Err(Error::comm(format!(
                "top ghost row has {} values, expected {}",
                row.len(),
                ghost.len()
            )));
        }
        ghost.copy_from_slice(&row);
    }
    if let Some(row) = from_down {
        let ghost = partition
            .ghost_bottom_row_mut()
            .ok_or_else(|| Error::comm("received a bottom ghost row without a successor"))?;
        if row.len() != ghost.len() {
            return Err(Error::comm(format!(
                "bottom ghost row has {} values, expected {}",
                row.len(),
                ghost.len()
            )));
        }
        ghost.copy_from_slice(&row);
    }
    Ok(())
}
