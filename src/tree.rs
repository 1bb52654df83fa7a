//! Balanced, 1-indexed Merkle Tree.
//!
//! The tree lives in a single array of `2 * leaf_count` slots. Slot 0 is
//! unused, slot 1 is the root, slots `[leaf_count, 2 * leaf_count)` hold the
//! leaf digests and every other slot `i` holds the parent of `2i` and `2i + 1`.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
};
use sha3::Keccak256;
use std::marker::PhantomData;
use tracing::trace;

/// Merkle Tree data structure
#[derive(Debug, Clone)]
pub struct MerkleTree<HF: DigestProvider = Keccak256> {
    _hasher: PhantomData<HF>,
    pub(crate) nodes: Vec<Option<MerkleHash>>,
    pub(crate) elements: Vec<Vec<u8>>,
    root: MerkleHash,
}

/// Build a Keccak-256 Merkle Tree from an ordered set of elements
pub fn build_tree<E: AsRef<[u8]>>(elements: &[E]) -> Result<MerkleTree, Error> {
    MerkleTree::new(elements)
}

impl<HF: DigestProvider> MerkleTree<HF> {
    /// Create a tree over the given elements, padding the leaf level with
    /// empty leaf digests up to the next power of two
    pub fn new<E: AsRef<[u8]>>(elements: &[E]) -> Result<Self, Error> {
        if elements.is_empty() {
            return Err(Error::EmptyInput);
        }
        let leaf_count = balanced_leaf_count(elements.len())?;
        let mut nodes = vec![None; leaf_count << 1];

        let empty_leaf = HF::empty_leaf();
        for offset in 0..leaf_count {
            nodes[leaf_count + offset] = Some(match elements.get(offset) {
                Some(element) => HF::hash_leaf(element.as_ref()),
                None => empty_leaf,
            });
        }

        for index in (1..leaf_count).rev() {
            nodes[index] = match (nodes[left_child(index)], nodes[right_child(index)]) {
                (Some(left), Some(right)) => Some(HF::hash_node(&left, &right)),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            };
        }

        let root = nodes[1].ok_or(Error::RootComputation)?;
        trace!(
            elements = elements.len(),
            leaf_count,
            root = %root,
            "built merkle tree"
        );

        Ok(Self {
            _hasher: PhantomData,
            nodes,
            elements: elements.iter().map(|e| e.as_ref().to_vec()).collect(),
            root,
        })
    }

    /// Get the merkle root of the tree
    pub fn root(&self) -> MerkleHash {
        self.root
    }

    /// Original elements, without padding
    pub fn elements(&self) -> &[Vec<u8>] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of leaves after padding to a power of two
    pub fn leaf_count(&self) -> usize {
        self.nodes.len() >> 1
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.leaf_count().trailing_zeros() as usize
    }

    /// The full 1-indexed node array. Slot 0 is always `None`.
    pub fn raw_tree(&self) -> &[Option<MerkleHash>] {
        &self.nodes
    }

    /// Get the merkle hash of a node by index
    pub fn node(&self, index: usize) -> Result<MerkleHash, Error> {
        match self.nodes.get(index) {
            None => Err(Error::NodeOutOfRange(index, self.nodes.len())),
            Some(None) => Err(Error::MissingNode(index)),
            Some(Some(hash)) => Ok(*hash),
        }
    }
}

/// Smallest power of two able to hold `count` leaves
pub fn balanced_leaf_count(count: usize) -> Result<usize, Error> {
    if count == 0 {
        return Err(Error::EmptyInput);
    }
    count
        .checked_next_power_of_two()
        .filter(|leaf_count| *leaf_count <= u32::MAX as usize)
        .ok_or(Error::CountOverflow(count))
}

pub fn left_child(index: usize) -> usize {
    index << 1
}

pub fn right_child(index: usize) -> usize {
    (index << 1) + 1
}

pub fn parent(index: usize) -> usize {
    index >> 1
}

pub fn sibling(index: usize) -> usize {
    index ^ 1
}

/// Left children sit at even indices
pub fn is_left_child(index: usize) -> bool {
    index & 1 == 0
}
