use thiserror::Error;

/// Errors raised by chain, block and Merkle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Block index outside `0..len`.
    #[error("invalid block number {index} (chain has {len} blocks)")]
    InvalidBlockIndex { index: usize, len: usize },

    /// Transaction index outside the block's transaction list.
    #[error("invalid transaction index {index} (block {block} has {len} transactions)")]
    InvalidTransactionIndex {
        block: usize,
        index: usize,
        len: usize,
    },

    /// An operation was requested before a chain was created.
    #[error("chain has not been created")]
    Uninitialized,

    /// A Merkle tree needs at least one payload.
    #[error("cannot build a Merkle tree over zero payloads")]
    EmptyMerkleInput,
}

impl ChainError {
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ChainError::InvalidBlockIndex { .. } | ChainError::InvalidTransactionIndex { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_grouping() {
        assert!(ChainError::InvalidBlockIndex { index: 3, len: 2 }.is_out_of_range());
        assert!(ChainError::InvalidTransactionIndex {
            block: 0,
            index: 1,
            len: 1
        }
        .is_out_of_range());
        assert!(!ChainError::Uninitialized.is_out_of_range());
        assert!(!ChainError::EmptyMerkleInput.is_out_of_range());
    }

    #[test]
    fn messages_name_the_bad_index() {
        let err = ChainError::InvalidBlockIndex { index: 7, len: 2 };
        assert_eq!(
            err.to_string(),
            "invalid block number 7 (chain has 2 blocks)"
        );
    }
}
