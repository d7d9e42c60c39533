//! Fixed-potential boundary conditions.

use crate::config::Config;
use crate::partition::LocalPartition;
use crate::types::RealScalar;

/// Stamp the plate potentials into the rows this partition owns.
///
/// Runs once before the first sweep; the kernel then skips these cells, so
/// the stamped values persist for the whole run.
pub fn apply_plates<T: RealScalar>(config: &Config<T>, partition: &mut LocalPartition<T>) {
    let start = partition.range().start;
    for local in 0..partition.local_rows() {
        let row = start + local;
        for col in [2 * config.factor, 8 * config.factor] {
            if let Some(value) = config.fixed_value(row, col) {
                partition.set(local, col, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::apply_plates;
    use crate::config::Config;
    use crate::partition::LocalPartition;
    use crate::types::ProcessTopology;

    #[test]
    fn plates_stamped_into_owned_rows_only() {
        let config = Config::new(1, 2.0, -2.0, 0.8, 1e-4);
        // Rank 1 of 2 owns rows 5..10; the band is rows 2..8.
        let topology = ProcessTopology::new(1, 2);
        let mut partition = LocalPartition::new(config.rows(), config.cols(), &topology).unwrap();
        apply_plates(&config, &mut partition);

        for local in 0..partition.local_rows() {
            let row = partition.range().start + local;
            for col in 0..partition.cols() {
                let expected = config.fixed_value(row, col).unwrap_or(0.0);
                assert_eq!(partition.get(local, col), expected, "row {row} col {col}");
            }
        }
        // The ghost row stays untouched.
        assert!(partition.ghost_top_row().unwrap().iter().all(|&v| v == 0.0));
    }
}
