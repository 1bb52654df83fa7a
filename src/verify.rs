//! Root reconstruction shared by both proof kinds.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    tree::{balanced_leaf_count, is_left_child, parent, sibling, MerkleTree},
};
use tracing::debug;

/// Fixed capacity FIFO of `(tree index, hash)` pairs.
///
/// Every reduction step pops at least one node before pushing its parent, so
/// the queue never holds more nodes than it was seeded with.
pub(crate) struct NodeQueue {
    indices: Vec<usize>,
    hashes: Vec<MerkleHash>,
    read: usize,
    write: usize,
    len: usize,
}

impl NodeQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: vec![0; capacity],
            hashes: vec![MerkleHash::ZERO; capacity],
            read: 0,
            write: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a node. Returns `false` and leaves the queue untouched when full.
    #[must_use]
    pub(crate) fn push(&mut self, index: usize, hash: MerkleHash) -> bool {
        if self.len == self.capacity() {
            return false;
        }
        self.indices[self.write] = index;
        self.hashes[self.write] = hash;
        self.write = (self.write + 1) % self.capacity();
        self.len += 1;
        true
    }

    pub(crate) fn pop(&mut self) -> Option<(usize, MerkleHash)> {
        if self.len == 0 {
            return None;
        }
        let item = (self.indices[self.read], self.hashes[self.read]);
        self.read = (self.read + 1) % self.capacity();
        self.len -= 1;
        Some(item)
    }

    pub(crate) fn peek_index(&self) -> Option<usize> {
        (self.len > 0).then(|| self.indices[self.read])
    }
}

/// Reduce leaf digests to a candidate root.
///
/// `leaves` are `(element index, leaf digest)` pairs in strictly ascending
/// index order. Decommitments are consumed front to back. Returns `None` when
/// the decommitments run out before the root is reached or are not all used.
pub(crate) fn compute_root<HF: DigestProvider>(
    leaf_count: usize,
    leaves: &[(usize, MerkleHash)],
    decommitments: &[MerkleHash],
) -> Option<MerkleHash> {
    let mut queue = NodeQueue::with_capacity(leaves.len());
    for (offset, hash) in leaves {
        if !queue.push(leaf_count + offset, *hash) {
            debug!(offset, "node queue full");
            return None;
        }
    }
    let mut remaining = decommitments.iter();

    while let Some((index, hash)) = queue.pop() {
        if index == 1 {
            if !queue.is_empty() || !remaining.as_slice().is_empty() {
                debug!(
                    unused = remaining.len(),
                    "proof carries more nodes than the root needs"
                );
                return None;
            }
            return Some(hash);
        }

        let left_child = is_left_child(index);
        let pair = match queue.peek_index() {
            Some(next) if left_child && next == sibling(index) => queue.pop().map(|(_, h)| h),
            _ => remaining.next().copied(),
        };
        let Some(pair) = pair else {
            debug!(index, "ran out of decommitments");
            return None;
        };

        let parent_hash = if left_child {
            HF::hash_node(&hash, &pair)
        } else {
            HF::hash_node(&pair, &hash)
        };
        if !queue.push(parent(index), parent_hash) {
            debug!(index, "node queue full");
            return None;
        }
    }
    None
}

/// Leaf count of the tree a proof claims to come from
pub(crate) fn proof_leaf_count(element_count: usize) -> Result<usize, Error> {
    balanced_leaf_count(element_count).map_err(|_| Error::InvalidElementCount(element_count))
}

/// Root of a proof that carries every element of its tree
pub(crate) fn full_root<HF: DigestProvider>(
    elements: &[Vec<u8>],
    decommitments: &[MerkleHash],
) -> Result<Option<MerkleHash>, Error> {
    if !decommitments.is_empty() {
        debug!(
            unused = decommitments.len(),
            "full proof carries decommitments"
        );
        return Ok(None);
    }
    Ok(Some(MerkleTree::<HF>::new(elements)?.root()))
}

/// Compare a candidate root against the expected one
pub(crate) fn matches(root: &MerkleHash, candidate: Option<MerkleHash>) -> bool {
    if root.is_zero() {
        debug!("refusing to verify against a zero root");
        return false;
    }
    match candidate {
        Some(candidate) if candidate == *root => true,
        Some(candidate) => {
            debug!(expected = %root, computed = %candidate, "root mismatch");
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{leaf, node};
    use sha3::Keccak256;

    #[test]
    fn test_queue_wraps_around() {
        let mut queue = NodeQueue::with_capacity(2);
        assert!(queue.push(4, MerkleHash([4u8; 32])));
        assert!(queue.push(5, MerkleHash([5u8; 32])));
        assert!(!queue.push(6, MerkleHash([6u8; 32])));

        assert_eq!(queue.pop(), Some((4, MerkleHash([4u8; 32]))));
        assert!(queue.push(2, MerkleHash([2u8; 32])));
        assert_eq!(queue.peek_index(), Some(5));
        assert_eq!(queue.pop(), Some((5, MerkleHash([5u8; 32]))));
        assert_eq!(queue.pop(), Some((2, MerkleHash([2u8; 32]))));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.peek_index(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_compute_root_pairs_siblings_from_queue() {
        let leaves: Vec<(usize, MerkleHash)> =
            (0..4u8).map(|i| (i as usize, leaf(&[i]))).collect();
        let expected = node(
            &node(&leaves[0].1, &leaves[1].1),
            &node(&leaves[2].1, &leaves[3].1),
        );
        assert_eq!(compute_root::<Keccak256>(4, &leaves, &[]), Some(expected));
    }

    #[test]
    fn test_compute_root_with_full_queue() {
        // Every leaf known: the queue starts at capacity and each parent
        // reuses a slot freed by its children
        let hashes: Vec<MerkleHash> = (0..8u8).map(|i| leaf(&[i])).collect();
        let leaves: Vec<(usize, MerkleHash)> = hashes.iter().copied().enumerate().collect();
        let level: Vec<MerkleHash> = hashes.chunks(2).map(|p| node(&p[0], &p[1])).collect();
        let level: Vec<MerkleHash> = level.chunks(2).map(|p| node(&p[0], &p[1])).collect();
        let expected = node(&level[0], &level[1]);
        assert_eq!(compute_root::<Keccak256>(8, &leaves, &[]), Some(expected));

        // Unsorted seeds pair with the wrong neighbours but never overflow
        let mut shuffled = leaves.clone();
        shuffled.swap(0, 7);
        assert_ne!(
            compute_root::<Keccak256>(8, &shuffled, &hashes),
            Some(expected)
        );
    }

    #[test]
    fn test_compute_root_consumes_decommitments_in_order() {
        let hashes: Vec<MerkleHash> = (0..4u8).map(|i| leaf(&[i])).collect();
        let expected = node(&node(&hashes[0], &hashes[1]), &node(&hashes[2], &hashes[3]));

        // Prove leaf 2: its right sibling first, then the left subtree
        let decommitments = [hashes[3], node(&hashes[0], &hashes[1])];
        assert_eq!(
            compute_root::<Keccak256>(4, &[(2, hashes[2])], &decommitments),
            Some(expected)
        );

        let swapped = [decommitments[1], decommitments[0]];
        assert_ne!(
            compute_root::<Keccak256>(4, &[(2, hashes[2])], &swapped),
            Some(expected)
        );
    }

    #[test]
    fn test_compute_root_rejects_short_and_long_decommitments() {
        let hashes: Vec<MerkleHash> = (0..4u8).map(|i| leaf(&[i])).collect();
        let decommitments = [hashes[1], node(&hashes[2], &hashes[3])];
        assert!(compute_root::<Keccak256>(4, &[(0, hashes[0])], &decommitments).is_some());
        assert!(compute_root::<Keccak256>(4, &[(0, hashes[0])], &decommitments[..1]).is_none());
        assert!(compute_root::<Keccak256>(4, &[(0, hashes[0])], &[]).is_none());

        let extra = [decommitments[0], decommitments[1], hashes[0]];
        assert!(compute_root::<Keccak256>(4, &[(0, hashes[0])], &extra).is_none());
    }

    #[test]
    fn test_single_leaf_is_its_own_root() {
        let only = leaf(b"only");
        assert_eq!(compute_root::<Keccak256>(1, &[(0, only)], &[]), Some(only));
    }

    #[test]
    fn test_matches() {
        let root = leaf(b"root");
        assert!(matches(&root, Some(root)));
        assert!(!matches(&root, Some(leaf(b"other"))));
        assert!(!matches(&root, None));
        assert!(!matches(&MerkleHash::ZERO, Some(MerkleHash::ZERO)));
    }

    #[test]
    fn test_proof_leaf_count() {
        assert_eq!(proof_leaf_count(5).unwrap(), 8);
        assert_eq!(proof_leaf_count(0).unwrap_err(), Error::InvalidElementCount(0));
    }
}
