use super::Tree;
use eds_primitives::{Root, SquareIndex};
use sha2::{Digest, Sha256};

const LEAF_PREFIX: u8 = 0;
const NODE_PREFIX: u8 = 1;

type Hash = [u8; 32];

/// A binary SHA-256 merkle tree with RFC 6962 domain separation.
///
/// The position of a leaf is implied by push order, so the square index is
/// not committed to.
#[derive(Debug, Default, Clone)]
pub struct DefaultTree {
    leaves: Vec<Hash>,
    root: Option<Hash>,
}

impl DefaultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Used as a [`super::TreeConstructorFn`]
    pub fn boxed() -> Box<dyn Tree> {
        Box::new(Self::new())
    }

    fn leaf_hash(data: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update([LEAF_PREFIX]);
        hasher.update(data);
        hasher.finalize().into()
    }

    fn node_hash(left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update([NODE_PREFIX]);
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }

    fn compute(leaves: &[Hash]) -> Hash {
        match leaves.len() {
            0 => Sha256::digest(b"").into(),
            1 => leaves[0],
            n => {
                // Largest power of two strictly below n
                let split = n.next_power_of_two() / 2;
                let left = Self::compute(&leaves[..split]);
                let right = Self::compute(&leaves[split..]);
                Self::node_hash(&left, &right)
            }
        }
    }
}

impl Tree for DefaultTree {
    fn push(&mut self, data: &[u8], _index: SquareIndex) {
        self.leaves.push(Self::leaf_hash(data));
        self.root = None;
    }

    fn root(&mut self) -> Root {
        let leaves = &self.leaves;
        self.root
            .get_or_insert_with(|| Self::compute(leaves))
            .to_vec()
    }
}
