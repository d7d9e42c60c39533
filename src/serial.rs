//! Single-process reference solver.

use crate::boundary::apply_plates;
use crate::config::Config;
use crate::error::Result;
use crate::kernel::RelaxationKernel;
use crate::partition::LocalPartition;
use crate::types::{ProcessTopology, RealScalar, SolveReport, SolveStatus, UpdateScheme};

/// Solve the whole grid in this process, no communicator involved.
///
/// Runs the same kernel as the distributed loop on a single ghost-free
/// partition, so a distributed run with one worker produces this grid
/// exactly. Returns the grid in row-major order together with the report.
pub fn solve_serial<T: RealScalar>(
    config: &Config<T>,
    scheme: UpdateScheme,
) -> Result<(Vec<T>, SolveReport<T>)> {
    config.validate()?;
    config.warn();

    let topology = ProcessTopology::new(0, 1);
    let mut partition = LocalPartition::new(config.rows(), config.cols(), &topology)?;
    apply_plates(config, &mut partition);

    let mut kernel = RelaxationKernel::new(config, scheme);
    let mut status = SolveStatus::Converged;
    let mut iterations = 0;
    let mut delta = T::one();
    while delta > config.tolerance {
        delta = kernel.sweep(config, &mut partition);
        iterations += 1;
        if delta > Config::divergence_guard() {
            log::warn!(
                "aborting after {iterations} iterations: delta {delta} exceeds the \
                 divergence guard; lower the relaxation parameter"
            );
            status = SolveStatus::Diverged;
            break;
        }
    }

    let report = SolveReport {
        status,
        iterations,
        global_delta: delta,
    };
    Ok((partition.interior().to_vec(), report))
}
