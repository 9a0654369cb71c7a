use crate::{
    erasure::Codec,
    error::RepairError,
    grid::Grid,
    scheme::TreeConstructorFn,
};
use eds_primitives::{Axis, Chunk, Root, SquareIndex, SquareRoots};
use log::debug;
use std::fmt;

/// An erasure coded square of chunks, twice as wide as the original data.
///
/// The top-left quadrant holds the original data. The top-right quadrant is
/// the row extension of it, and the bottom half is the column extension of
/// the top half.
pub struct ExtendedDataSquare {
    grid: Grid<Chunk>,
    original_data_width: usize,
    chunk_size: usize,
    pub(crate) codec: Box<dyn Codec>,
    create_tree: TreeConstructorFn,
}

/// Validate a flat list of chunks and return its width and chunk size.
fn square_shape(data: &[Chunk], max_chunks: usize) -> Result<(usize, usize), RepairError> {
    let chunk_size = data
        .first()
        .map(Vec::len)
        .ok_or_else(|| RepairError::InvalidInput("square has no chunks".into()))?;
    if chunk_size == 0 {
        return Err(RepairError::InvalidInput("chunks must not be empty".into()));
    }
    if let Some(i) = data.iter().position(|c| c.len() != chunk_size) {
        return Err(RepairError::InvalidInput(format!(
            "chunk {} has size {}, expected {}",
            i,
            data[i].len(),
            chunk_size
        )));
    }
    if data.len() > max_chunks {
        return Err(RepairError::InvalidInput(format!(
            "too many chunks: {} exceeds the codec limit of {}",
            data.len(),
            max_chunks
        )));
    }
    let width = Grid::<Chunk>::square_dimensions(data.len());
    if width * width != data.len() {
        return Err(RepairError::InvalidInput(format!(
            "number of chunks ({}) must be a square number",
            data.len()
        )));
    }
    Ok((width, chunk_size))
}

impl ExtendedDataSquare {
    /// Build a square from an already extended, row-major list of chunks.
    pub fn import(
        data: Vec<Chunk>,
        codec: Box<dyn Codec>,
        create_tree: TreeConstructorFn,
    ) -> Result<Self, RepairError> {
        let (width, chunk_size) = square_shape(&data, codec.max_chunks().saturating_mul(4))?;
        if width % 2 != 0 {
            return Err(RepairError::InvalidInput(format!(
                "square width {} is not even",
                width
            )));
        }
        let grid = Grid::from_rows(data).map_err(|e| RepairError::InvalidInput(e.to_string()))?;
        debug!("imported square: width({}), chunk_size({})", width, chunk_size);
        Ok(Self {
            grid,
            original_data_width: width / 2,
            chunk_size,
            codec,
            create_tree,
        })
    }

    /// Erasure code the original data, a row-major square of chunks, into an
    /// extended data square.
    pub fn compute(
        original: Vec<Chunk>,
        codec: Box<dyn Codec>,
        create_tree: TreeConstructorFn,
    ) -> Result<Self, RepairError> {
        let (original_data_width, chunk_size) = square_shape(&original, codec.max_chunks())?;
        let width = original_data_width * 2;

        let mut grid = Grid::filled(width, Chunk::new());
        for (i, chunk) in original.into_iter().enumerate() {
            grid.set(i / original_data_width, i % original_data_width, chunk);
        }

        let mut eds = Self {
            grid,
            original_data_width,
            chunk_size,
            codec,
            create_tree,
        };
        for r in 0..original_data_width {
            let parity = eds.codec.encode(&eds.row_slice(r, 0, original_data_width))?;
            for (j, chunk) in parity.into_iter().enumerate() {
                eds.set_cell(r, original_data_width + j, chunk);
            }
        }
        for c in 0..width {
            let parity = eds.codec.encode(&eds.column_slice(0, c, original_data_width))?;
            for (j, chunk) in parity.into_iter().enumerate() {
                eds.set_cell(original_data_width + j, c, chunk);
            }
        }
        debug!(
            "extended square: original({}), width({}), chunk_size({})",
            original_data_width,
            width,
            chunk_size
        );
        Ok(eds)
    }

    pub fn width(&self) -> usize {
        self.grid.width_length
    }

    pub fn original_data_width(&self) -> usize {
        self.original_data_width
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn cell(&self, row: usize, column: usize) -> &Chunk {
        self.grid.get(row, column)
    }

    pub(crate) fn set_cell(&mut self, row: usize, column: usize, chunk: Chunk) {
        self.grid.set(row, column, chunk);
    }

    pub fn row(&self, row: usize) -> Vec<Chunk> {
        self.grid.row(row).cloned().collect()
    }

    pub fn column(&self, column: usize) -> Vec<Chunk> {
        self.grid.column(column).cloned().collect()
    }

    pub fn axis(&self, axis: Axis, index: usize) -> Vec<Chunk> {
        match axis {
            Axis::Row => self.row(index),
            Axis::Column => self.column(index),
        }
    }

    /// `length` chunks of row `row`, starting at column `column`
    pub fn row_slice(&self, row: usize, column: usize, length: usize) -> Vec<Chunk> {
        (column..column + length)
            .map(|c| self.cell(row, c).clone())
            .collect()
    }

    /// `length` chunks of column `column`, starting at row `row`
    pub fn column_slice(&self, row: usize, column: usize, length: usize) -> Vec<Chunk> {
        (row..row + length)
            .map(|r| self.cell(r, column).clone())
            .collect()
    }

    /// Commit to a full axis vector with a fresh tree.
    pub(crate) fn commit(&self, index: usize, vector: &[Chunk]) -> Root {
        let mut tree = (self.create_tree)();
        for (cell, chunk) in vector.iter().enumerate() {
            tree.push(chunk, SquareIndex::new(index, cell));
        }
        tree.root()
    }

    pub fn axis_root(&self, axis: Axis, index: usize) -> Root {
        self.commit(index, &self.axis(axis, index))
    }

    pub fn row_root(&self, row: usize) -> Root {
        self.axis_root(Axis::Row, row)
    }

    pub fn col_root(&self, column: usize) -> Root {
        self.axis_root(Axis::Column, column)
    }

    pub fn row_roots(&self) -> Vec<Root> {
        (0..self.width()).map(|i| self.row_root(i)).collect()
    }

    pub fn col_roots(&self) -> Vec<Root> {
        (0..self.width()).map(|i| self.col_root(i)).collect()
    }

    pub fn roots(&self) -> SquareRoots {
        SquareRoots::new(self.row_roots(), self.col_roots())
    }

    /// Every chunk, in row-major order
    pub fn flattened(&self) -> Vec<Chunk> {
        self.grid.to_rows()
    }

    /// The original data quadrant, in row-major order
    pub fn flattened_original(&self) -> Vec<Chunk> {
        (0..self.original_data_width)
            .flat_map(|r| self.row_slice(r, 0, self.original_data_width))
            .collect()
    }
}

impl PartialEq for ExtendedDataSquare {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
    }
}

impl fmt::Debug for ExtendedDataSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedDataSquare")
            .field("width", &self.width())
            .field("original_data_width", &self.original_data_width)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{erasure::Rsgf8Codec, scheme::DefaultTree};

    fn original(n: usize) -> Vec<Chunk> {
        (0..n * n).map(|i| vec![i as u8; 4]).collect()
    }

    fn compute(n: usize) -> ExtendedDataSquare {
        ExtendedDataSquare::compute(original(n), Box::new(Rsgf8Codec), DefaultTree::boxed)
            .unwrap()
    }

    #[test]
    fn test_compute_shape() {
        let eds = compute(2);
        assert_eq!(eds.width(), 4);
        assert_eq!(eds.original_data_width(), 2);
        assert_eq!(eds.chunk_size(), 4);
        assert_eq!(eds.flattened_original(), original(2));
        assert_eq!(eds.row(0)[..2], original(2)[..2]);
        assert!(eds.flattened().iter().all(|c| c.len() == 4));
    }

    #[test]
    fn test_parity_is_consistent_both_ways() {
        let eds = compute(4);
        let k = eds.original_data_width();
        for i in 0..eds.width() {
            let row = eds.row(i);
            assert_eq!(Rsgf8Codec.encode(&row[..k]).unwrap(), row[k..]);
            let column = eds.column(i);
            assert_eq!(Rsgf8Codec.encode(&column[..k]).unwrap(), column[k..]);
        }
    }

    #[test]
    fn test_import_round_trip() {
        let eds = compute(2);
        let imported =
            ExtendedDataSquare::import(eds.flattened(), Box::new(Rsgf8Codec), DefaultTree::boxed)
                .unwrap();
        assert_eq!(imported, eds);
        assert_eq!(imported.roots(), eds.roots());
    }

    #[test]
    fn test_slices() {
        let eds = compute(2);
        assert_eq!(eds.row_slice(1, 1, 2), eds.row(1)[1..3]);
        assert_eq!(eds.column_slice(2, 3, 2), eds.column(3)[2..]);
        assert_eq!(eds.axis(Axis::Column, 1), eds.column(1));
    }

    #[test]
    fn test_roots_differ_per_axis() {
        let eds = compute(2);
        let roots = eds.roots();
        assert_eq!(roots.width(), 4);
        assert_ne!(roots.row_roots[0], roots.row_roots[1]);
        assert_eq!(eds.row_root(3), roots.row_roots[3]);
        assert_eq!(eds.col_root(2), roots.column_roots[2]);
    }

    #[test]
    fn test_import_rejects_bad_shapes() {
        let import = |data: Vec<Chunk>| {
            ExtendedDataSquare::import(data, Box::new(Rsgf8Codec), DefaultTree::boxed)
        };
        assert!(matches!(import(vec![]), Err(RepairError::InvalidInput(_))));
        // Not a square
        assert!(matches!(import(vec![vec![0; 2]; 5]), Err(RepairError::InvalidInput(_))));
        // Odd width
        assert!(matches!(import(vec![vec![0; 2]; 9]), Err(RepairError::InvalidInput(_))));
        // Uneven chunks
        let mut data = vec![vec![0; 2]; 4];
        data[3] = vec![0; 3];
        assert!(matches!(import(data), Err(RepairError::InvalidInput(_))));
        // Beyond what GF(2^8) can extend
        assert!(matches!(
            import(vec![vec![0; 1]; 258 * 258]),
            Err(RepairError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_rejects_too_much_data() {
        let result = ExtendedDataSquare::compute(
            vec![vec![1; 2]; 129 * 129],
            Box::new(Rsgf8Codec),
            DefaultTree::boxed,
        );
        assert!(matches!(result, Err(RepairError::InvalidInput(_))));
    }
}
