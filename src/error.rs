//! Merkle Tree Errors

use displaydoc::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cannot build a tree from zero elements
    EmptyInput,
    /// Element count: {0} needs more leaves than a u32 can address
    CountOverflow(usize),
    /// Root was not set after building the tree
    RootComputation,
    /// No indices were requested
    NoIndices,
    /// Index: {0} was requested more than once
    DuplicateIndex(usize),
    /// Index: {0} is outside of the element range [0, {1})
    IndexOutOfRange(usize, usize),
    /// Range starting at: {0} with count: {1} is invalid for {2} elements
    InvalidRange(usize, usize, usize),
    /// Proof carries {0} elements for {1} indices
    ElementCountMismatch(usize, usize),
    /// Proof element count: {0} is not a valid tree size
    InvalidElementCount(usize),
    /// Partial proof carries no decommitments
    MissingDecommitments,
    /// Node index: {0} exceeds number of tree slots: {1}
    NodeOutOfRange(usize, usize),
    /// Node index: {0} was never populated
    MissingNode(usize),
    /// Count: {0} does not fit in a count word
    InvalidCount(usize),
    /// Count word must be 32 bytes, got: {0}
    InvalidWordLength(usize),
    /// Count word has non-zero high bytes
    MalformedCountWord,
    /// Proof words must start with a count word
    MissingCountWord,
}

impl std::error::Error for Error {}
