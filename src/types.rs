//! Types specific to the capacitor solver.

/// Scalar type that the relaxation loop is generic over.
pub trait RealScalar:
    num::Float + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static
{
}

impl<T: num::Float + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static> RealScalar for T {}

/// Placement of one worker inside a fixed SPMD group.
///
/// Rank 0 has no predecessor and rank `size - 1` has no successor; everything
/// that would otherwise special-case rank 0 goes through the two predicates
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTopology {
    rank: usize,
    size: usize,
}

impl ProcessTopology {
    /// Create the topology for `rank` in a group of `size` workers.
    pub fn new(rank: usize, size: usize) -> Self {
        debug_assert!(rank < size);
        Self { rank, size }
    }

    /// This worker's rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of workers in the group.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The rank owning the rows directly above this worker's range, if any.
    pub fn predecessor(&self) -> Option<usize> {
        (self.rank > 0).then(|| self.rank - 1)
    }

    /// The rank owning the rows directly below this worker's range, if any.
    pub fn successor(&self) -> Option<usize> {
        (self.rank + 1 < self.size).then(|| self.rank + 1)
    }

    /// Whether this worker is rank 0.
    pub fn is_root(&self) -> bool {
        self.rank == 0
    }
}

/// Update discipline applied by the relaxation kernel, chosen once at
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScheme {
    /// Write each new value immediately, so later cells in the same sweep see
    /// it (Gauss-Seidel within a partition; values from neighbouring
    /// partitions are one halo round stale).
    InPlace,
    /// Write new values to a back buffer and swap after the sweep (Jacobi).
    /// The result is independent of the worker count.
    Buffered,
}

/// How a relaxation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The global max delta dropped to the tolerance.
    Converged,
    /// The divergence guard tripped; the returned grid is partial.
    Diverged,
}

/// Summary of a finished relaxation run.
#[derive(Debug, Clone, Copy)]
pub struct SolveReport<T> {
    /// Whether the run converged or was aborted by the divergence guard.
    pub status: SolveStatus,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// The global max delta at exit.
    pub global_delta: T,
}

impl<T> SolveReport<T> {
    /// Whether the run reached the requested tolerance.
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessTopology;

    #[test]
    fn topology_neighbours() {
        let single = ProcessTopology::new(0, 1);
        assert_eq!(single.predecessor(), None);
        assert_eq!(single.successor(), None);

        let first = ProcessTopology::new(0, 3);
        let middle = ProcessTopology::new(1, 3);
        let last = ProcessTopology::new(2, 3);
        assert!(first.is_root());
        assert_eq!(first.predecessor(), None);
        assert_eq!(first.successor(), Some(1));
        assert_eq!(middle.predecessor(), Some(0));
        assert_eq!(middle.successor(), Some(2));
        assert_eq!(last.predecessor(), Some(1));
        assert_eq!(last.successor(), None);
    }
}
