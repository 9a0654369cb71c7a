#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use core::fmt;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// A single cell of the square. Every chunk of a square has the same length.
pub type Chunk = Vec<u8>;
/// An opaque commitment to one row or column.
pub type Root = Vec<u8>;

/// Selects which dimension of the square an operation addresses.
#[derive(
    Clone,
    Copy,
    BorshSerialize,
    BorshDeserialize,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Debug,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// Both axes, in the order the solver scans them.
    pub const ALL: [Axis; 2] = [Axis::Row, Axis::Column];

    pub fn orthogonal(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }

    /// Maps the `position`-th cell of axis `index` to `(row, column)`.
    pub fn cell(self, index: usize, position: usize) -> (usize, usize) {
        match self {
            Self::Row => (index, position),
            Self::Column => (position, index),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Row => "row",
            Self::Column => "column",
        };
        write!(f, "{}", s)
    }
}

/// The position of a leaf pushed into a tree: `axis` is the index of the row
/// or column being committed, `cell` the position of the chunk along it.
#[derive(
    Clone, Copy, BorshSerialize, BorshDeserialize, Eq, PartialEq, Default, Serialize, Deserialize, Debug,
)]
pub struct SquareIndex {
    pub axis: usize,
    pub cell: usize,
}

impl SquareIndex {
    pub fn new(axis: usize, cell: usize) -> Self {
        Self { axis, cell }
    }
}

/// The row and column commitments of an extended data square.
#[serde_as]
#[derive(Deserialize, Serialize, BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SquareRoots {
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub row_roots: Vec<Root>,
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub column_roots: Vec<Root>,
}

impl SquareRoots {
    pub fn new(row_roots: Vec<Root>, column_roots: Vec<Root>) -> Self {
        Self {
            row_roots,
            column_roots,
        }
    }

    pub fn width(&self) -> usize {
        self.row_roots.len()
    }
}

/// A possibly incomplete square, as collected from peers, together with the
/// roots it must be repaired against. Chunks are in row-major order and
/// `None` marks a missing chunk.
#[serde_as]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SparseSquare {
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub row_roots: Vec<Root>,
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub column_roots: Vec<Root>,
    #[serde_as(as = "Vec<Option<serde_with::hex::Hex>>")]
    pub chunks: Vec<Option<Chunk>>,
}

impl SparseSquare {
    pub fn new(roots: SquareRoots, chunks: Vec<Option<Chunk>>) -> Self {
        Self {
            row_roots: roots.row_roots,
            column_roots: roots.column_roots,
            chunks,
        }
    }

    pub fn roots(&self) -> SquareRoots {
        SquareRoots::new(self.row_roots.clone(), self.column_roots.clone())
    }

    /// Number of chunks that are present.
    pub fn known(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }
}
