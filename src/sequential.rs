//! Multi-proofs over a contiguous run of elements.
//!
//! The known leaves form a single run, so at every level only the two ends
//! of the run can be missing a sibling. Generation follows those two
//! boundaries up the tree instead of scanning every node.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    proof::SequentialProof,
    tree::{is_left_child, parent, sibling, MerkleTree},
    verify::{compute_root, full_root, matches, proof_leaf_count},
};
use tracing::trace;

/// Generate a proof for the `count` elements starting at `starting_index`
pub fn generate_sequential_proof<HF: DigestProvider>(
    tree: &MerkleTree<HF>,
    starting_index: usize,
    count: usize,
) -> Result<SequentialProof<HF>, Error> {
    let element_count = tree.element_count();
    let end = checked_range(starting_index, count, element_count)?;

    let decommitments = if count == element_count {
        Vec::new()
    } else {
        let mut decommitments = Vec::new();
        let mut lower = tree.leaf_count() + starting_index;
        let mut upper = tree.leaf_count() + end - 1;
        while lower > 1 {
            if !is_left_child(lower) {
                decommitments.push(tree.node(sibling(lower))?);
            }
            if is_left_child(upper) {
                decommitments.push(tree.node(sibling(upper))?);
            }
            lower = parent(lower);
            upper = parent(upper);
        }
        decommitments
    };
    trace!(
        starting_index,
        count,
        decommitments = decommitments.len(),
        "generated sequential proof"
    );

    Ok(SequentialProof::new(
        starting_index,
        element_count,
        tree.elements[starting_index..end].to_vec(),
        decommitments,
    ))
}

/// Verify a sequential proof against a root.
///
/// Returns `Ok(false)` when the proof is well formed but does not reproduce
/// the root, and `Err` when the proof is malformed. As with indexed proofs,
/// the element count is taken from the proof and is not bound by the root.
pub fn verify_sequential_proof<HF: DigestProvider>(
    root: &MerkleHash,
    proof: &SequentialProof<HF>,
) -> Result<bool, Error> {
    let leaf_count = proof_leaf_count(proof.element_count)?;
    let count = proof.elements.len();
    checked_range(proof.starting_index, count, proof.element_count)?;

    if count == proof.element_count {
        let candidate = full_root::<HF>(&proof.elements, &proof.decommitments)?;
        return Ok(matches(root, candidate));
    }
    if leaf_count > 1 && proof.decommitments.is_empty() {
        return Err(Error::MissingDecommitments);
    }

    let leaves: Vec<(usize, MerkleHash)> = proof
        .elements
        .iter()
        .enumerate()
        .map(|(offset, element)| (proof.starting_index + offset, HF::hash_leaf(element)))
        .collect();
    let candidate = compute_root::<HF>(leaf_count, &leaves, &proof.decommitments);
    Ok(matches(root, candidate))
}

/// Check a range against the element count and return its exclusive end
fn checked_range(
    starting_index: usize,
    count: usize,
    element_count: usize,
) -> Result<usize, Error> {
    starting_index
        .checked_add(count)
        .filter(|end| count > 0 && *end <= element_count)
        .ok_or(Error::InvalidRange(starting_index, count, element_count))
}
