//! Row-wise partitioning of the global grid.

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::types::{ProcessTopology, RealScalar};

/// The contiguous block of absolute row indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First owned row.
    pub start: usize,
    /// Number of owned rows.
    pub count: usize,
}

impl RowRange {
    /// One past the last owned row.
    pub fn end(&self) -> usize {
        self.start + self.count
    }
}

/// Compute the row range owned by `rank` in a group of `size` workers.
///
/// Each of the first `rows % size` ranks takes one extra row, so the ranges
/// tile `[0, rows)` exactly.
pub fn row_range(rows: usize, size: usize, rank: usize) -> RowRange {
    let base = rows / size;
    let rest = rows % size;
    let count = base + usize::from(rank < rest);
    let start = base * rank + rank.min(rest);
    RowRange { start, count }
}

/// The row ranges of every rank in the group, in rank order.
pub fn layout(rows: usize, size: usize) -> Vec<RowRange> {
    (0..size).map(|rank| row_range(rows, size, rank)).collect_vec()
}

/// One worker's slice of the grid: its owned rows plus up to two ghost rows
/// holding copies of the adjacent rows of neighbouring partitions.
///
/// The backing store is a single flat buffer; the top ghost row (present
/// whenever the worker has a predecessor) occupies buffer row 0, the bottom
/// ghost row (present whenever it has a successor) the last buffer row.
#[derive(Debug, Clone)]
pub struct LocalPartition<T> {
    values: Vec<T>,
    cols: usize,
    range: RowRange,
    ghost_top: bool,
    ghost_bottom: bool,
}

impl<T: RealScalar> LocalPartition<T> {
    /// Allocate the partition for one worker, zero-filled.
    ///
    /// Fails if the group has more workers than the grid has rows, since that
    /// would leave some workers with degenerate empty partitions.
    pub fn new(rows: usize, cols: usize, topology: &ProcessTopology) -> Result<Self> {
        if topology.size() > rows {
            return Err(Error::InvalidPartition {
                rows,
                workers: topology.size(),
                msg: "worker count exceeds the grid row count".to_string(),
            });
        }
        let range = row_range(rows, topology.size(), topology.rank());
        let ghost_top = topology.predecessor().is_some();
        let ghost_bottom = topology.successor().is_some();
        let buffer_rows = range.count + usize::from(ghost_top) + usize::from(ghost_bottom);
        Ok(Self {
            values: vec![T::zero(); buffer_rows * cols],
            cols,
            range,
            ghost_top,
            ghost_bottom,
        })
    }

    /// The absolute rows owned by this worker.
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of owned rows.
    pub fn local_rows(&self) -> usize {
        self.range.count
    }

    /// Whether this partition carries a top ghost row.
    pub fn has_ghost_top(&self) -> bool {
        self.ghost_top
    }

    /// Whether this partition carries a bottom ghost row.
    pub fn has_ghost_bottom(&self) -> bool {
        self.ghost_bottom
    }

    /// Index into the flat buffer of the cell at owned row `local`, column
    /// `col`.
    pub fn buffer_index(&self, local: usize, col: usize) -> usize {
        (local + usize::from(self.ghost_top)) * self.cols + col
    }

    /// The whole backing buffer, ghosts included.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub(crate) fn values_vec_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }

    /// Owned row `local` as a slice.
    pub fn row(&self, local: usize) -> &[T] {
        let start = self.buffer_index(local, 0);
        &self.values[start..start + self.cols]
    }

    /// The value at owned row `local`, column `col`.
    pub fn get(&self, local: usize, col: usize) -> T {
        self.values[self.buffer_index(local, col)]
    }

    /// Overwrite the value at owned row `local`, column `col`.
    pub fn set(&mut self, local: usize, col: usize, value: T) {
        let i = self.buffer_index(local, col);
        self.values[i] = value;
    }

    /// The topmost owned row.
    pub fn first_row(&self) -> &[T] {
        self.row(0)
    }

    /// The bottommost owned row.
    pub fn last_row(&self) -> &[T] {
        self.row(self.range.count - 1)
    }

    /// The top ghost row, if present.
    pub fn ghost_top_row(&self) -> Option<&[T]> {
        self.ghost_top.then(|| &self.values[..self.cols])
    }

    /// The bottom ghost row, if present.
    pub fn ghost_bottom_row(&self) -> Option<&[T]> {
        self.ghost_bottom
            .then(|| &self.values[self.values.len() - self.cols..])
    }

    pub(crate) fn ghost_top_row_mut(&mut self) -> Option<&mut [T]> {
        let cols = self.cols;
        self.ghost_top.then(move || &mut self.values[..cols])
    }

    pub(crate) fn ghost_bottom_row_mut(&mut self) -> Option<&mut [T]> {
        let len = self.values.len();
        let cols = self.cols;
        self.ghost_bottom.then(move || &mut self.values[len - cols..])
    }

    /// All owned rows as one contiguous slice, ghost rows excluded.
    pub fn interior(&self) -> &[T] {
        let start = self.buffer_index(0, 0);
        &self.values[start..start + self.range.count * self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::{layout, row_range, LocalPartition};
    use crate::types::ProcessTopology;

    #[test]
    fn remainder_rows_go_to_the_first_ranks() {
        // 10 rows over 3 workers: 4 + 3 + 3.
        assert_eq!(row_range(10, 3, 0).count, 4);
        assert_eq!(row_range(10, 3, 1).count, 3);
        assert_eq!(row_range(10, 3, 2).count, 3);
        assert_eq!(row_range(10, 3, 1).start, 4);
        assert_eq!(row_range(10, 3, 2).start, 7);
    }

    #[test]
    fn layouts_tile_the_grid() {
        for size in [1, 2, 3, 4, 6, 7, 10] {
            let ranges = layout(10, size);
            assert_eq!(ranges[0].start, 0);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end(), pair[1].start);
            }
            assert_eq!(ranges.last().unwrap().end(), 10);
        }
    }

    #[test]
    fn ghost_policy() {
        let single = LocalPartition::<f64>::new(10, 11, &ProcessTopology::new(0, 1)).unwrap();
        assert!(!single.has_ghost_top() && !single.has_ghost_bottom());
        assert_eq!(single.values().len(), 10 * 11);

        let first = LocalPartition::<f64>::new(10, 11, &ProcessTopology::new(0, 3)).unwrap();
        let middle = LocalPartition::<f64>::new(10, 11, &ProcessTopology::new(1, 3)).unwrap();
        let last = LocalPartition::<f64>::new(10, 11, &ProcessTopology::new(2, 3)).unwrap();
        assert!(!first.has_ghost_top() && first.has_ghost_bottom());
        assert!(middle.has_ghost_top() && middle.has_ghost_bottom());
        assert!(last.has_ghost_top() && !last.has_ghost_bottom());
        assert_eq!(first.values().len(), (4 + 1) * 11);
        assert_eq!(middle.values().len(), (3 + 2) * 11);
        assert_eq!(last.values().len(), (3 + 1) * 11);
    }

    #[test]
    fn too_many_workers_rejected() {
        assert!(LocalPartition::<f64>::new(10, 11, &ProcessTopology::new(0, 11)).is_err());
    }
}
