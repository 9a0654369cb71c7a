use eds_primitives::{Root, SquareIndex};

pub mod merkle;

pub use merkle::DefaultTree;

/// The commitment built over one row or column of the square.
///
/// Leaves are pushed in position order, each tagged with its place in the
/// square, then `root` is taken once. A tree is used for a single axis.
pub trait Tree {
    /// Accumulate one leaf
    fn push(&mut self, data: &[u8], index: SquareIndex);
    /// The commitment over every leaf pushed so far
    fn root(&mut self) -> Root;
}

/// Creates a fresh, empty tree for each axis commitment.
pub type TreeConstructorFn = fn() -> Box<dyn Tree>;
