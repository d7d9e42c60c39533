//! Assembly and output of the global grid after a run.

use std::io::Write;

use itertools::Itertools;

use crate::comm::Communicator;
use crate::config::Config;
use crate::error::Result;
use crate::partition::{self, LocalPartition};
use crate::types::{ProcessTopology, RealScalar};

/// Collect the full grid on rank 0, in ascending row order.
///
/// Collective: every worker must call this. Returns the assembled grid on
/// rank 0 and `None` elsewhere.
pub fn gather<T: RealScalar, C: Communicator<T>>(
    comm: &C,
    config: &Config<T>,
    partition: &LocalPartition<T>,
) -> Result<Option<Vec<T>>> {
    let counts = partition::layout(config.rows(), comm.size())
        .iter()
        .map(|range| range.count * config.cols())
        .collect_vec();
    comm.gather(partition.interior(), &counts)
}

fn write_row<T: RealScalar, W: Write>(row: &[T], out: &mut W) -> std::io::Result<()> {
    for (col, value) in row.iter().enumerate() {
        if col > 0 {
            write!(out, ";")?;
        }
        write!(out, "{value}")?;
    }
    writeln!(out)
}

/// Write an assembled grid of `cols`-wide rows, one line per row with fields
/// separated by `;`.
pub fn write_grid<T: RealScalar, W: Write>(
    grid: &[T],
    cols: usize,
    out: &mut W,
) -> std::io::Result<()> {
    for row in grid.chunks(cols) {
        write_row(row, out)?;
    }
    Ok(())
}

/// Write the grid without assembling it anywhere: a token circulates from
/// rank 0 upward and each worker appends its own rows while it holds it.
///
/// Collective: every worker must call this with a sink that shares the
/// underlying destination. The token ring serialises the writes, so the rows
/// come out in ascending order just as [`write_grid`] produces them. The sink
/// must not hold an exclusive lock across the call or the ring deadlocks.
pub fn write_ordered<T: RealScalar, C: Communicator<T>, W: Write>(
    comm: &C,
    topology: &ProcessTopology,
    partition: &LocalPartition<T>,
    out: &mut W,
) -> Result<()> {
    if let Some(from) = topology.predecessor() {
        comm.recv_token(from)?;
    }
    for local in 0..partition.local_rows() {
        write_row(partition.row(local), out)?;
    }
    out.flush()?;
    if let Some(to) = topology.successor() {
        comm.send_token(to)?;
    }
    Ok(())
}
