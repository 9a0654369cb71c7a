use eyre::{ensure, Result};
use nalgebra::{DMatrix, Scalar};

/// A Grid of data, also known as a perfect matrix. Callers see it in row-major
/// order regardless of the column-major storage of the inner matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Scalar> {
    pub width_length: usize,
    pub inner: DMatrix<T>,
}

impl<T: Scalar> Grid<T> {
    /// Create a grid where every cell holds `value`.
    pub fn filled(width_length: usize, value: T) -> Self {
        Grid {
            width_length,
            inner: DMatrix::from_element(width_length, width_length, value),
        }
    }

    /// Create a grid from cells in row-major order, the number of cells must
    /// be a perfect square.
    pub fn from_rows(data: Vec<T>) -> Result<Self> {
        let sq_root = Self::square_dimensions(data.len());
        ensure!(
            sq_root * sq_root == data.len(),
            "number of cells ({}) is not a perfect square",
            data.len()
        );
        // from_vec is column-major, transposing gives us rows
        let matrix = DMatrix::from_vec(sq_root, sq_root, data).transpose();
        Ok(Grid {
            width_length: sq_root,
            inner: matrix,
        })
    }

    /// The width of the smallest square able to hold `len` cells
    pub fn square_dimensions(len: usize) -> usize {
        (len as f64).sqrt().ceil() as usize
    }

    pub fn get(&self, row: usize, column: usize) -> &T {
        &self.inner[(row, column)]
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) {
        self.inner[(row, column)] = value;
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.width_length).map(move |c| &self.inner[(row, c)])
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.width_length).map(move |r| &self.inner[(r, column)])
    }

    /// Every cell, in row-major order
    pub fn to_rows(&self) -> Vec<T> {
        (0..self.width_length)
            .flat_map(|r| self.row(r).cloned())
            .collect()
    }
}
