pub use eds_primitives::{Axis, Chunk, Root, SparseSquare, SquareIndex, SquareRoots};
pub use eyre::Result;

pub mod bitmatrix;
pub mod config;
pub mod erasure;
pub mod error;
pub mod grid;
pub mod repair;
pub mod scheme;
pub mod square;

pub use bitmatrix::BitMatrix;
pub use config::{CodecKind, Config};
pub use erasure::{Codec, NovelPolyCodec, Rsgf8Codec};
pub use error::RepairError;
pub use repair::repair;
pub use scheme::{DefaultTree, Tree, TreeConstructorFn};
pub use square::ExtendedDataSquare;

/// Repair a [`SparseSquare`] with the codec selected by `config` and the
/// default merkle tree.
pub fn repair_sparse(
    square: SparseSquare,
    config: &Config,
) -> std::result::Result<ExtendedDataSquare, RepairError> {
    repair(
        &square.row_roots,
        &square.column_roots,
        square.chunks,
        config.codec.build(),
        DefaultTree::boxed,
    )
}
