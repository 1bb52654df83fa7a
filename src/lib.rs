//! Merkle Tree multi-proofs for payer fee reports
//!
//! A report is committed to as the root of a balanced Merkle Tree over its
//! encoded entries. Any contiguous range or arbitrary subset of entries can
//! then be proven against that root without revealing the others.

mod error;
mod hash;
mod indexed;
mod proof;
mod sequential;
mod tree;
mod verify;

pub use crate::{
    error::Error,
    hash::{decode_count, encode_count, DigestProvider, MerkleHash, LEAF_PREFIX, NODE_PREFIX},
    indexed::{generate_indexed_proof, verify_indexed_proof},
    proof::{IndexedProof, Proof, SequentialProof},
    sequential::{generate_sequential_proof, verify_sequential_proof},
    tree::{
        balanced_leaf_count, build_tree, is_left_child, left_child, parent, right_child, sibling,
        MerkleTree,
    },
};
