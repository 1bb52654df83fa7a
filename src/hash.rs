//! Domain separated hashing for leaves and internal nodes

use crate::error::Error;
use sha3::digest::{consts::U32, Digest, OutputSizeUser};
use std::{fmt, ops::Deref};

/// Domain separation tags
pub const LEAF_PREFIX: &[u8] = b"leaf|";
pub const NODE_PREFIX: &[u8] = b"node|";

/// Largest count a count word may carry
pub const MAX_COUNT: usize = i32::MAX as usize;

/// Hash functions able to produce leaf and node digests for a Merkle Tree.
///
/// Leaves and nodes are hashed under distinct prefixes so a leaf digest can
/// never be passed off as an internal node in a proof, or the reverse.
pub trait DigestProvider {
    /// Hash a raw element into a leaf digest
    fn hash_leaf(element: &[u8]) -> MerkleHash;

    /// Hash two child digests into their parent
    fn hash_node(left: &[u8], right: &[u8]) -> MerkleHash;

    /// Digest used to pad the leaf level out to a power of two
    fn empty_leaf() -> MerkleHash {
        Self::hash_leaf(&[])
    }
}

/// Any 32 byte digest (Keccak-256, SHA3-256, Blake2s-256) can drive a tree
impl<D> DigestProvider for D
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    fn hash_leaf(element: &[u8]) -> MerkleHash {
        let mut hasher = <D as Digest>::new();
        hasher.update(LEAF_PREFIX);
        hasher.update(element);
        MerkleHash::from_slice(hasher.finalize().as_slice())
    }

    fn hash_node(left: &[u8], right: &[u8]) -> MerkleHash {
        let mut hasher = <D as Digest>::new();
        hasher.update(NODE_PREFIX);
        hasher.update(left);
        hasher.update(right);
        MerkleHash::from_slice(hasher.finalize().as_slice())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MerkleHash(pub [u8; 32]);

impl MerkleHash {
    pub const ZERO: MerkleHash = MerkleHash([0u8; 32]);

    fn from_slice(bytes: &[u8]) -> Self {
        let mut result = [0u8; 32];
        result.copy_from_slice(bytes);
        MerkleHash(result)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl From<[u8; 32]> for MerkleHash {
    fn from(value: [u8; 32]) -> Self {
        MerkleHash(value)
    }
}

impl Deref for MerkleHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for MerkleHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8; 32]> for MerkleHash {
    fn eq(&self, other: &[u8; 32]) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for MerkleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Encode a count as a 32 byte big endian word
pub fn encode_count(count: usize) -> Result<MerkleHash, Error> {
    if count > MAX_COUNT {
        return Err(Error::InvalidCount(count));
    }
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(count as u64).to_be_bytes());
    Ok(MerkleHash(word))
}

/// Decode a count from a 32 byte big endian word
pub fn decode_count(word: &[u8]) -> Result<usize, Error> {
    if word.len() != 32 {
        return Err(Error::InvalidWordLength(word.len()));
    }
    if word[..28].iter().any(|byte| *byte != 0) {
        return Err(Error::MalformedCountWord);
    }
    let mut low = [0u8; 4];
    low.copy_from_slice(&word[28..]);
    let count = u32::from_be_bytes(low) as usize;
    if count > MAX_COUNT {
        return Err(Error::InvalidCount(count));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::hex_literal::hex;
    use blake2::Blake2s256;
    use sha3::{Keccak256, Sha3_256};

    #[test]
    fn test_hash_leaf_vectors() {
        assert_eq!(
            Keccak256::empty_leaf(),
            hex!("3ef0000fc8752f5372eb9bcff2d75ad56ac4dc0824bb0dffcf7e454001558bf7")
        );
        assert_eq!(
            Keccak256::hash_leaf(&[1u8]),
            hex!("644bb1ff41e4ada8ec3ffe10205ff7e3016466c2c10fcaec6528bf0a08d68b1e")
        );
        assert_eq!(
            Sha3_256::hash_leaf(&[1u8]),
            hex!("e16d7c80823665e2fbd183b7109762296404c872b677690fd80ea687b97c21df")
        );
    }

    #[test]
    fn test_hash_node_vectors() {
        let left = Keccak256::hash_leaf(&[1u8]);
        let right = Keccak256::hash_leaf(&[2u8]);
        assert_eq!(
            Keccak256::hash_node(&left, &right),
            hex!("c742916d6d1cb2c76faecb2df44d3f40ab1843b67a34773b34da7286e1c93fe4")
        );
        assert_ne!(
            Keccak256::hash_node(&left, &right),
            Keccak256::hash_node(&right, &left)
        );
    }

    #[test]
    fn test_domain_separation() {
        let samples: [&[u8]; 4] = [b"", b"a", &[0u8; 32], &[0xffu8; 64]];
        for x in samples {
            for y in samples {
                assert_ne!(Keccak256::hash_leaf(x), Keccak256::hash_node(x, y));
                assert_ne!(Blake2s256::hash_leaf(x), Blake2s256::hash_node(x, y));
            }
            // A leaf over the concatenation must not collide with the node either
            let joined = [x, x].concat();
            assert_ne!(Keccak256::hash_leaf(&joined), Keccak256::hash_node(x, x));
        }
    }

    #[test]
    fn test_hash_providers_differ() {
        assert_ne!(Keccak256::empty_leaf(), Sha3_256::empty_leaf());
        assert_ne!(Keccak256::empty_leaf(), Blake2s256::empty_leaf());
    }

    #[test]
    fn test_count_words() {
        assert_eq!(encode_count(0).unwrap(), MerkleHash::ZERO);
        let word = encode_count(258).unwrap();
        assert_eq!(&word[30..], &[1u8, 2u8]);
        assert_eq!(decode_count(&word).unwrap(), 258);
        assert_eq!(
            decode_count(&encode_count(MAX_COUNT).unwrap()).unwrap(),
            MAX_COUNT
        );

        assert_eq!(
            encode_count(MAX_COUNT + 1).unwrap_err(),
            Error::InvalidCount(MAX_COUNT + 1)
        );
        assert_eq!(
            decode_count(&[0u8; 31]).unwrap_err(),
            Error::InvalidWordLength(31)
        );

        let mut high = [0u8; 32];
        high[0] = 1;
        assert_eq!(decode_count(&high).unwrap_err(), Error::MalformedCountWord);

        let mut negative = [0u8; 32];
        negative[28] = 0x80;
        assert_eq!(
            decode_count(&negative).unwrap_err(),
            Error::InvalidCount(0x8000_0000)
        );
    }

    #[test]
    fn test_display_is_lower_hex() {
        let hash = MerkleHash(hex!(
            "00ff10ab00000000000000000000000000000000000000000000000000000001"
        ));
        assert_eq!(
            hash.to_string(),
            "00ff10ab00000000000000000000000000000000000000000000000000000001"
        );
    }
}
