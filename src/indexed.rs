//! Multi-proofs over arbitrary sets of element indices.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    proof::IndexedProof,
    tree::{left_child, right_child, MerkleTree},
    verify::{compute_root, full_root, matches, proof_leaf_count},
};
use tracing::trace;

/// Generate a proof that the elements at `indices` belong to the tree.
///
/// The proof lists the indices in ascending order together with their
/// elements. Decommitments are ordered bottom level first and left to right
/// within a level, the order in which verification consumes them.
pub fn generate_indexed_proof<HF: DigestProvider>(
    tree: &MerkleTree<HF>,
    indices: &[usize],
) -> Result<IndexedProof<HF>, Error> {
    let element_count = tree.element_count();
    let sorted = sorted_indices(indices, element_count)?;

    let decommitments = if sorted.len() == element_count {
        Vec::new()
    } else {
        collect_decommitments(tree, &sorted)?
    };
    trace!(
        indices = sorted.len(),
        decommitments = decommitments.len(),
        "generated indexed proof"
    );

    let elements = sorted
        .iter()
        .map(|index| tree.elements[*index].clone())
        .collect();
    Ok(IndexedProof::new(sorted, element_count, elements, decommitments))
}

/// Walk the tree bottom up, recording the sibling of every node that has
/// exactly one known child
fn collect_decommitments<HF: DigestProvider>(
    tree: &MerkleTree<HF>,
    indices: &[usize],
) -> Result<Vec<MerkleHash>, Error> {
    let leaf_count = tree.leaf_count();
    let mut known = vec![false; leaf_count << 1];
    for index in indices {
        known[leaf_count + index] = true;
    }

    let mut decommitments = Vec::new();
    let mut level_start = leaf_count >> 1;
    while level_start > 0 {
        for index in level_start..(level_start << 1) {
            let left = known[left_child(index)];
            let right = known[right_child(index)];
            known[index] = left || right;
            if left == right {
                continue;
            }
            let sibling = if left {
                right_child(index)
            } else {
                left_child(index)
            };
            decommitments.push(tree.node(sibling)?);
        }
        level_start >>= 1;
    }
    Ok(decommitments)
}

/// Verify an indexed proof against a root.
///
/// Returns `Ok(false)` when the proof is well formed but does not reproduce
/// the root, and `Err` when the proof is malformed.
///
/// The root does not commit to the element count. A proof claiming a larger
/// count with the same padded leaf count can present a padding leaf as an
/// empty element, so callers must check `element_count()` against the count
/// they expect.
pub fn verify_indexed_proof<HF: DigestProvider>(
    root: &MerkleHash,
    proof: &IndexedProof<HF>,
) -> Result<bool, Error> {
    let leaf_count = proof_leaf_count(proof.element_count)?;
    if proof.elements.len() != proof.indices.len() {
        return Err(Error::ElementCountMismatch(
            proof.elements.len(),
            proof.indices.len(),
        ));
    }
    sorted_indices(&proof.indices, proof.element_count)?;

    let mut pairs: Vec<(usize, &Vec<u8>)> = proof
        .indices
        .iter()
        .copied()
        .zip(proof.elements.iter())
        .collect();
    pairs.sort_unstable_by_key(|(index, _)| *index);

    if pairs.len() == proof.element_count {
        let elements: Vec<Vec<u8>> = pairs.into_iter().map(|(_, e)| e.clone()).collect();
        let candidate = full_root::<HF>(&elements, &proof.decommitments)?;
        return Ok(matches(root, candidate));
    }
    if leaf_count > 1 && proof.decommitments.is_empty() {
        return Err(Error::MissingDecommitments);
    }

    let leaves: Vec<(usize, MerkleHash)> = pairs
        .into_iter()
        .map(|(index, element)| (index, HF::hash_leaf(element)))
        .collect();
    let candidate = compute_root::<HF>(leaf_count, &leaves, &proof.decommitments);
    Ok(matches(root, candidate))
}

/// Validate requested indices and return them in ascending order
pub(crate) fn sorted_indices(
    indices: &[usize],
    element_count: usize,
) -> Result<Vec<usize>, Error> {
    if indices.is_empty() {
        return Err(Error::NoIndices);
    }
    if let Some(index) = indices.iter().find(|index| **index >= element_count) {
        return Err(Error::IndexOutOfRange(*index, element_count));
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(Error::DuplicateIndex(pair[0]));
    }
    Ok(sorted)
}
