use crate::grid::Grid;
use eds_primitives::Axis;

/// Records which cells of a square hold a known chunk.
///
/// Cells can only ever be marked present, never cleared, so knowledge about
/// the square grows monotonically while it is being repaired. Indices out of
/// range panic.
#[derive(Debug, Clone, PartialEq)]
pub struct BitMatrix {
    grid: Grid<bool>,
}

impl BitMatrix {
    pub fn new(width: usize) -> Self {
        Self {
            grid: Grid::filled(width, false),
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width_length
    }

    pub fn set(&mut self, row: usize, column: usize) {
        self.grid.set(row, column, true);
    }

    /// Mark a cell given its row-major index
    pub fn set_flat(&mut self, index: usize) {
        let width = self.width();
        self.set(index / width, index % width);
    }

    /// Mark every cell of an axis
    pub fn set_axis(&mut self, axis: Axis, index: usize) {
        for position in 0..self.width() {
            let (r, c) = axis.cell(index, position);
            self.set(r, c);
        }
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        *self.grid.get(row, column)
    }

    pub fn row_is_one(&self, row: usize) -> bool {
        self.grid.row(row).all(|b| *b)
    }

    pub fn column_is_one(&self, column: usize) -> bool {
        self.grid.column(column).all(|b| *b)
    }

    /// Whether cells `[start, end)` of the row are all known
    pub fn row_range_is_one(&self, row: usize, start: usize, end: usize) -> bool {
        (start..end).all(|c| self.get(row, c))
    }

    /// Whether cells `[start, end)` of the column are all known
    pub fn column_range_is_one(&self, column: usize, start: usize, end: usize) -> bool {
        (start..end).all(|r| self.get(r, column))
    }

    pub fn is_one(&self, axis: Axis, index: usize) -> bool {
        match axis {
            Axis::Row => self.row_is_one(index),
            Axis::Column => self.column_is_one(index),
        }
    }

    pub fn range_is_one(&self, axis: Axis, index: usize, start: usize, end: usize) -> bool {
        match axis {
            Axis::Row => self.row_range_is_one(index, start, end),
            Axis::Column => self.column_range_is_one(index, start, end),
        }
    }

    /// Whether every cell of the axis other than `position` is known
    pub fn is_one_except(&self, axis: Axis, index: usize, position: usize) -> bool {
        (0..self.width())
            .filter(|p| *p != position)
            .all(|p| {
                let (r, c) = axis.cell(index, p);
                self.get(r, c)
            })
    }

    /// Number of known cells
    pub fn count(&self) -> usize {
        self.grid.inner.iter().filter(|b| **b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_flat() {
        let mut bits = BitMatrix::new(4);
        bits.set_flat(0);
        bits.set_flat(6);
        assert!(bits.get(0, 0));
        assert!(bits.get(1, 2));
        assert!(!bits.get(2, 1));
        assert_eq!(bits.count(), 2);
    }

    #[test]
    fn test_row_and_column() {
        let mut bits = BitMatrix::new(4);
        for c in 0..4 {
            bits.set(1, c);
        }
        assert!(bits.row_is_one(1));
        assert!(!bits.row_is_one(0));
        assert!(!bits.column_is_one(1));
        assert!(bits.is_one(Axis::Row, 1));

        for r in 0..4 {
            bits.set(r, 3);
        }
        assert!(bits.column_is_one(3));
        assert!(bits.is_one(Axis::Column, 3));
    }

    #[test]
    fn test_ranges() {
        let mut bits = BitMatrix::new(4);
        bits.set(0, 2);
        bits.set(0, 3);
        bits.set(2, 1);
        bits.set(3, 1);
        assert!(bits.row_range_is_one(0, 2, 4));
        assert!(!bits.row_range_is_one(0, 1, 4));
        assert!(bits.column_range_is_one(1, 2, 4));
        assert!(bits.range_is_one(Axis::Column, 1, 2, 4));
        assert!(!bits.range_is_one(Axis::Row, 1, 2, 4));
        // An empty range is trivially complete
        assert!(bits.row_range_is_one(1, 2, 2));
    }

    #[test]
    fn test_is_one_except() {
        let mut bits = BitMatrix::new(4);
        bits.set(0, 1);
        bits.set(2, 1);
        bits.set(3, 1);
        assert!(bits.is_one_except(Axis::Column, 1, 1));
        assert!(!bits.is_one_except(Axis::Column, 1, 0));
        bits.set(1, 1);
        assert!(bits.is_one_except(Axis::Column, 1, 0));
    }

    #[test]
    fn test_set_axis() {
        let mut bits = BitMatrix::new(4);
        bits.set_axis(Axis::Column, 2);
        assert!(bits.column_is_one(2));
        bits.set_axis(Axis::Row, 0);
        assert!(bits.row_is_one(0));
        assert_eq!(bits.count(), 7);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range() {
        BitMatrix::new(2).get(2, 0);
    }
}
