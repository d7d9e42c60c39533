//! Run configuration and the fixed-potential plate mask.

use crate::error::{Error, Result};
use crate::types::RealScalar;

/// Parameters of one relaxation run.
///
/// The grid is `10 * factor` rows by `10 * factor + 1` columns. The two
/// plates occupy columns `2 * factor` and `8 * factor` over the row band
/// `2 * factor..8 * factor`, at potentials `v1` and `v2` respectively.
#[derive(Debug, Clone, Copy)]
pub struct Config<T> {
    /// Grid scale factor.
    pub factor: usize,
    /// Potential of the left plate.
    pub v1: T,
    /// Potential of the right plate.
    pub v2: T,
    /// Relaxation parameter. 0 gives plain averaging; values in (0, 1) give
    /// over-relaxation; larger values destabilise convergence.
    pub omega: T,
    /// Stop once the global max delta drops to this value.
    pub tolerance: T,
}

impl<T: RealScalar> Config<T> {
    /// Create a configuration. Call [`Config::validate`] before use.
    pub fn new(factor: usize, v1: T, v2: T, omega: T, tolerance: T) -> Self {
        Self {
            factor,
            v1,
            v2,
            omega,
            tolerance,
        }
    }

    /// Number of rows of the global grid.
    pub fn rows(&self) -> usize {
        10 * self.factor
    }

    /// Number of columns of the global grid.
    pub fn cols(&self) -> usize {
        10 * self.factor + 1
    }

    /// Check the parameters. Every worker must run this before entering the
    /// loop so that a bad configuration fails the whole group identically
    /// instead of stranding peers in a collective call.
    pub fn validate(&self) -> Result<()> {
        if self.factor < 1 {
            return Err(Error::invalid_parameters(
                "scale factor must be a positive integer",
            ));
        }
        if !(self.tolerance > T::zero()) {
            return Err(Error::invalid_parameters("tolerance must be positive"));
        }
        if !self.omega.is_finite() {
            return Err(Error::invalid_parameters(
                "relaxation parameter must be finite",
            ));
        }
        Ok(())
    }

    /// Log warnings for parameter choices that are valid but suspect.
    pub fn warn(&self) {
        if self.omega >= T::one() {
            log::warn!(
                "relaxation parameter {} is at or above 1; the run is likely to diverge",
                self.omega
            );
        }
        if self.omega < T::zero() {
            log::warn!("negative relaxation parameter {} damps convergence", self.omega);
        }
    }

    /// The plate potential at `(row, col)`, if that cell is fixed.
    pub fn fixed_value(&self, row: usize, col: usize) -> Option<T> {
        if 2 * self.factor <= row && row < 8 * self.factor {
            if col == 2 * self.factor {
                return Some(self.v1);
            }
            if col == 8 * self.factor {
                return Some(self.v2);
            }
        }
        None
    }

    /// Whether `(row, col)` is a fixed-potential (Dirichlet) cell.
    pub fn is_fixed(&self, row: usize, col: usize) -> bool {
        self.fixed_value(row, col).is_some()
    }

    /// Abort threshold for the global max delta. A value above this signals a
    /// destabilising `omega`.
    pub fn divergence_guard() -> T {
        T::from(1e10).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn dimensions() {
        let config = Config::new(3, 1.0, -1.0, 0.8, 1e-4);
        assert_eq!(config.rows(), 30);
        assert_eq!(config.cols(), 31);
    }

    #[test]
    fn validation() {
        assert!(Config::new(2, 1.0, -1.0, 0.8, 1e-4).validate().is_ok());
        assert!(Config::new(0, 1.0, -1.0, 0.8, 1e-4).validate().is_err());
        assert!(Config::new(2, 1.0, -1.0, 0.8, 0.0).validate().is_err());
        assert!(Config::new(2, 1.0, -1.0, 0.8, -1e-4).validate().is_err());
        assert!(Config::new(2, 1.0, -1.0, f64::NAN, 1e-4).validate().is_err());
    }

    #[test]
    fn plate_mask() {
        let config = Config::new(2, 5.0, -5.0, 0.8, 1e-4);
        // Band is rows 4..16, plates at columns 4 and 16.
        assert_eq!(config.fixed_value(4, 4), Some(5.0));
        assert_eq!(config.fixed_value(15, 16), Some(-5.0));
        assert_eq!(config.fixed_value(3, 4), None);
        assert_eq!(config.fixed_value(16, 4), None);
        assert_eq!(config.fixed_value(8, 5), None);
        assert!(!config.is_fixed(0, 0));
    }
}
