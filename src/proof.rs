//! Multi-proof types.
//!
//! A proof never embeds the root it was generated against; the verifier
//! supplies the root independently.

use crate::{
    error::Error,
    hash::{decode_count, encode_count, DigestProvider, MerkleHash},
    indexed::verify_indexed_proof,
    sequential::verify_sequential_proof,
};
use sha3::Keccak256;
use std::{marker::PhantomData, ops::Range};

/// Proof over an arbitrary set of element indices
#[derive(Debug, Clone)]
pub struct IndexedProof<HF: DigestProvider = Keccak256> {
    _hasher: PhantomData<HF>,
    pub(crate) indices: Vec<usize>,
    pub(crate) element_count: usize,
    pub(crate) elements: Vec<Vec<u8>>,
    pub(crate) decommitments: Vec<MerkleHash>,
}

impl<HF: DigestProvider> IndexedProof<HF> {
    /// Assemble a proof from its transported parts. Shape is checked on verification.
    pub fn new(
        indices: Vec<usize>,
        element_count: usize,
        elements: Vec<Vec<u8>>,
        decommitments: Vec<MerkleHash>,
    ) -> Self {
        Self {
            _hasher: PhantomData,
            indices,
            element_count,
            elements,
            decommitments,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of elements in the tree the proof was generated from
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn elements(&self) -> &[Vec<u8>] {
        &self.elements
    }

    pub fn decommitments(&self) -> &[MerkleHash] {
        &self.decommitments
    }

    /// Iterate the proven `(index, element)` pairs
    pub fn values(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.elements.iter().map(Vec::as_slice))
    }

    pub fn verify(&self, root: &MerkleHash) -> Result<bool, Error> {
        verify_indexed_proof(root, self)
    }
}

impl<HF: DigestProvider> PartialEq for IndexedProof<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices
            && self.element_count == other.element_count
            && self.elements == other.elements
            && self.decommitments == other.decommitments
    }
}

impl<HF: DigestProvider> Eq for IndexedProof<HF> {}

/// Proof over a contiguous run of elements
#[derive(Debug, Clone)]
pub struct SequentialProof<HF: DigestProvider = Keccak256> {
    _hasher: PhantomData<HF>,
    pub(crate) starting_index: usize,
    pub(crate) element_count: usize,
    pub(crate) elements: Vec<Vec<u8>>,
    pub(crate) decommitments: Vec<MerkleHash>,
}

impl<HF: DigestProvider> SequentialProof<HF> {
    /// Assemble a proof from its transported parts. Shape is checked on verification.
    pub fn new(
        starting_index: usize,
        element_count: usize,
        elements: Vec<Vec<u8>>,
        decommitments: Vec<MerkleHash>,
    ) -> Self {
        Self {
            _hasher: PhantomData,
            starting_index,
            element_count,
            elements,
            decommitments,
        }
    }

    /// Rebuild a proof from a word list whose first word is the element count
    pub fn from_words(
        starting_index: usize,
        elements: Vec<Vec<u8>>,
        words: &[MerkleHash],
    ) -> Result<Self, Error> {
        let (count_word, decommitments) = words.split_first().ok_or(Error::MissingCountWord)?;
        Ok(Self::new(
            starting_index,
            decode_count(count_word)?,
            elements,
            decommitments.to_vec(),
        ))
    }

    pub fn starting_index(&self) -> usize {
        self.starting_index
    }

    /// Number of elements in the tree the proof was generated from
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn elements(&self) -> &[Vec<u8>] {
        &self.elements
    }

    pub fn decommitments(&self) -> &[MerkleHash] {
        &self.decommitments
    }

    /// Element indices covered by the proof. The end saturates at `usize::MAX`
    /// for a malformed starting index.
    pub fn indices(&self) -> Range<usize> {
        self.starting_index..self.starting_index.saturating_add(self.elements.len())
    }

    /// Transport form: the element count word followed by every decommitment
    pub fn to_words(&self) -> Result<Vec<MerkleHash>, Error> {
        let mut words = Vec::with_capacity(self.decommitments.len() + 1);
        words.push(encode_count(self.element_count)?);
        words.extend_from_slice(&self.decommitments);
        Ok(words)
    }

    /// The same proof expressed over explicit indices
    pub fn into_indexed(self) -> IndexedProof<HF> {
        IndexedProof::new(
            self.indices().collect(),
            self.element_count,
            self.elements,
            self.decommitments,
        )
    }

    pub fn verify(&self, root: &MerkleHash) -> Result<bool, Error> {
        verify_sequential_proof(root, self)
    }
}

impl<HF: DigestProvider> PartialEq for SequentialProof<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.starting_index == other.starting_index
            && self.element_count == other.element_count
            && self.elements == other.elements
            && self.decommitments == other.decommitments
    }
}

impl<HF: DigestProvider> Eq for SequentialProof<HF> {}

/// Either kind of multi-proof
#[derive(Debug, Clone)]
pub enum Proof<HF: DigestProvider = Keccak256> {
    Sequential(SequentialProof<HF>),
    Indexed(IndexedProof<HF>),
}

impl<HF: DigestProvider> Proof<HF> {
    pub fn element_count(&self) -> usize {
        match self {
            Proof::Sequential(proof) => proof.element_count(),
            Proof::Indexed(proof) => proof.element_count(),
        }
    }

    pub fn elements(&self) -> &[Vec<u8>] {
        match self {
            Proof::Sequential(proof) => proof.elements(),
            Proof::Indexed(proof) => proof.elements(),
        }
    }

    pub fn decommitments(&self) -> &[MerkleHash] {
        match self {
            Proof::Sequential(proof) => proof.decommitments(),
            Proof::Indexed(proof) => proof.decommitments(),
        }
    }

    /// Check the proof against a root. `Ok(false)` means a well formed proof
    /// that does not match; `Err` means the proof itself is malformed.
    pub fn verify(&self, root: &MerkleHash) -> Result<bool, Error> {
        match self {
            Proof::Sequential(proof) => verify_sequential_proof(root, proof),
            Proof::Indexed(proof) => verify_indexed_proof(root, proof),
        }
    }
}

impl<HF: DigestProvider> PartialEq for Proof<HF> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Proof::Sequential(a), Proof::Sequential(b)) => a == b,
            (Proof::Indexed(a), Proof::Indexed(b)) => a == b,
            _ => false,
        }
    }
}

impl<HF: DigestProvider> Eq for Proof<HF> {}

impl<HF: DigestProvider> From<SequentialProof<HF>> for Proof<HF> {
    fn from(proof: SequentialProof<HF>) -> Self {
        Proof::Sequential(proof)
    }
}

impl<HF: DigestProvider> From<IndexedProof<HF>> for Proof<HF> {
    fn from(proof: IndexedProof<HF>) -> Self {
        Proof::Indexed(proof)
    }
}
