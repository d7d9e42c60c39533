//! The distributed relaxation loop.

use crate::boundary::apply_plates;
use crate::comm::Communicator;
use crate::config::Config;
use crate::error::Result;
use crate::halo;
use crate::kernel::RelaxationKernel;
use crate::partition::LocalPartition;
use crate::types::{ProcessTopology, RealScalar, SolveReport, SolveStatus, UpdateScheme};

/// A worker's share of a finished run: its partition and the group-wide
/// report.
pub struct Solution<T> {
    /// The converged (or partial, on divergence) local rows.
    pub partition: LocalPartition<T>,
    /// This worker's place in the group.
    pub topology: ProcessTopology,
    /// How the run ended. Identical on every worker.
    pub report: SolveReport<T>,
}

/// Run the relaxation to convergence on this worker's partition.
///
/// Every worker of the group must call this with the same configuration. The
/// loop alternates ghost-row exchange, one stencil sweep, and a max-reduction
/// of the per-worker deltas; the reduction doubles as the iteration barrier,
/// so all workers leave the loop on the same iteration. A global delta above
/// [`Config::divergence_guard`] aborts the run early with the partial grid
/// intact rather than iterating towards infinity.
pub fn solve<T: RealScalar, C: Communicator<T>>(
    comm: &C,
    config: &Config<T>,
    scheme: UpdateScheme,
) -> Result<Solution<T>> {
    config.validate()?;
    if comm.rank() == 0 {
        config.warn();
    }

    let topology = ProcessTopology::new(comm.rank(), comm.size());
    let mut partition = LocalPartition::new(config.rows(), config.cols(), &topology)?;
    apply_plates(config, &mut partition);

    let mut kernel = RelaxationKernel::new(config, scheme);
    let mut status = SolveStatus::Converged;
    let mut iterations = 0;
    let mut delta = T::one();
    while delta > config.tolerance {
        halo::exchange(comm, &topology, &mut partition)?;
        let local = kernel.sweep(config, &mut partition);
        delta = comm.all_reduce_max(local)?;
        iterations += 1;
        if delta > Config::divergence_guard() {
            if topology.is_root() {
                log::warn!(
                    "aborting after {iterations} iterations: delta {delta} exceeds the \
                     divergence guard; lower the relaxation parameter"
                );
            }
            status = SolveStatus::Diverged;
            break;
        }
    }

    Ok(Solution {
        partition,
        topology,
        report: SolveReport {
            status,
            iterations,
            global_delta: delta,
        },
    })
}
