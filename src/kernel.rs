//! The relaxation stencil applied to one partition.

use rayon::prelude::*;

use crate::config::Config;
use crate::partition::LocalPartition;
use crate::types::{RealScalar, UpdateScheme};

/// Applies one over-relaxed four-point stencil sweep to a partition and
/// reports the largest per-cell change.
///
/// The update of an interior cell is
/// `(1 + omega) / 4 * (up + down + left + right) - omega * old`; omega of 0
/// recovers the plain Jacobi/Gauss-Seidel average. Global edge rows and
/// columns and the plate cells are never written, which keeps them at their
/// initial values for the whole run.
pub struct RelaxationKernel<T> {
    omega: T,
    scheme: UpdateScheme,
    scratch: Vec<T>,
}

impl<T: RealScalar> RelaxationKernel<T> {
    /// Create a kernel for the given run parameters.
    pub fn new(config: &Config<T>, scheme: UpdateScheme) -> Self {
        Self {
            omega: config.omega,
            scheme,
            scratch: Vec::new(),
        }
    }

    /// Sweep the partition once and return the local max delta.
    pub fn sweep(&mut self, config: &Config<T>, partition: &mut LocalPartition<T>) -> T {
        match self.scheme {
            UpdateScheme::InPlace => self.sweep_in_place(config, partition),
            UpdateScheme::Buffered => self.sweep_buffered(config, partition),
        }
    }

    fn sweep_in_place(&mut self, config: &Config<T>, partition: &mut LocalPartition<T>) -> T {
        let rows = config.rows();
        let cols = partition.cols();
        let start = partition.range().start;
        let local_rows = partition.local_rows();
        let top_offset = usize::from(partition.has_ghost_top());
        let quarter = (T::one() + self.omega) * T::from(0.25).unwrap();
        let omega = self.omega;

        let values = partition.values_mut();
        let mut delta = T::zero();
        for local in 0..local_rows {
            let row = start + local;
            if row == 0 || row + 1 == rows {
                continue;
            }
            let base = (local + top_offset) * cols;
            for col in 1..cols - 1 {
                if config.is_fixed(row, col) {
                    continue;
                }
                let i = base + col;
                let old = values[i];
                let new = quarter
                    * (values[i - cols] + values[i + cols] + values[i - 1] + values[i + 1])
                    - omega * old;
                values[i] = new;
                delta = delta.max((new - old).abs());
            }
        }
        delta
    }

    fn sweep_buffered(&mut self, config: &Config<T>, partition: &mut LocalPartition<T>) -> T {
        let rows = config.rows();
        let cols = partition.cols();
        let start = partition.range().start;
        let local_rows = partition.local_rows();
        let top_offset = usize::from(partition.has_ghost_top());
        let quarter = (T::one() + self.omega) * T::from(0.25).unwrap();
        let omega = self.omega;

        self.scratch.clear();
        self.scratch.extend_from_slice(partition.values());
        let values = partition.values();

        let delta = self
            .scratch
            .par_chunks_mut(cols)
            .enumerate()
            .map(|(buffer_row, out)| {
                if buffer_row < top_offset || buffer_row >= top_offset + local_rows {
                    return T::zero();
                }
                let row = start + (buffer_row - top_offset);
                if row == 0 || row + 1 == rows {
                    return T::zero();
                }
                let base = buffer_row * cols;
                let mut row_delta = T::zero();
                for col in 1..cols - 1 {
                    if config.is_fixed(row, col) {
                        continue;
                    }
                    let i = base + col;
                    let old = values[i];
                    let new = quarter
                        * (values[i - cols] + values[i + cols] + values[i - 1] + values[i + 1])
                        - omega * old;
                    out[col] = new;
                    row_delta = row_delta.max((new - old).abs());
                }
                row_delta
            })
            .reduce(T::zero, T::max);

        std::mem::swap(partition.values_vec_mut(), &mut self.scratch);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::RelaxationKernel;
    use crate::boundary::apply_plates;
    use crate::config::Config;
    use crate::partition::LocalPartition;
    use crate::types::{ProcessTopology, UpdateScheme};

    fn single_partition(config: &Config<f64>) -> LocalPartition<f64> {
        let topology = ProcessTopology::new(0, 1);
        let mut partition = LocalPartition::new(config.rows(), config.cols(), &topology).unwrap();
        apply_plates(config, &mut partition);
        partition
    }

    #[test]
    fn plain_average_next_to_a_plate() {
        // With omega = 0 the update is the plain four-neighbour average, so
        // after one sweep of a zero grid the cell right of the left plate is
        // v1 / 4 under the buffered scheme.
        let config = Config::new(1, 8.0, 0.0, 0.0, 1e-4);
        let mut partition = single_partition(&config);
        let mut kernel = RelaxationKernel::new(&config, UpdateScheme::Buffered);
        let delta = kernel.sweep(&config, &mut partition);
        assert_eq!(partition.get(4, 3), 2.0);
        assert!(delta >= 2.0);
    }

    #[test]
    fn fixed_and_edge_cells_untouched() {
        let config = Config::new(1, 3.0, -3.0, 0.8, 1e-4);
        for scheme in [UpdateScheme::InPlace, UpdateScheme::Buffered] {
            let mut partition = single_partition(&config);
            let mut kernel = RelaxationKernel::new(&config, scheme);
            for _ in 0..5 {
                kernel.sweep(&config, &mut partition);
            }
            assert_eq!(partition.get(4, 2), 3.0);
            assert_eq!(partition.get(4, 8), -3.0);
            for col in 0..config.cols() {
                assert_eq!(partition.get(0, col), 0.0);
                assert_eq!(partition.get(config.rows() - 1, col), 0.0);
            }
            for row in 0..config.rows() {
                assert_eq!(partition.get(row, 0), 0.0);
                assert_eq!(partition.get(row, config.cols() - 1), 0.0);
            }
        }
    }

    #[test]
    fn in_place_sweep_sees_values_from_earlier_in_the_sweep() {
        // Gauss-Seidel: (1, 3) is computed after (1, 2) was already raised
        // to 2 by the plate below it, so it picks up a quarter of that.
        let config = Config::new(1, 8.0, 0.0, 0.0, 1e-4);
        let mut partition = single_partition(&config);
        let mut kernel = RelaxationKernel::new(&config, UpdateScheme::InPlace);
        kernel.sweep(&config, &mut partition);
        assert_eq!(partition.get(1, 2), 2.0);
        assert_eq!(partition.get(1, 3), 0.5);
    }
}
