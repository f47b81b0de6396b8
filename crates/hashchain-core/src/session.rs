//! Context object for a caller that drives the chain interactively.
//!
//! Holds at most one chain. Every operation other than
//! [`Session::create_chain`] fails with [`ChainError::Uninitialized`] until a
//! chain exists.

use crate::{Block, BlockView, Chain, ChainError, MerkleNodeView, Transaction};

#[derive(Clone, Debug, Default)]
pub struct Session {
    chain: Option<Chain>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh chain, replacing any existing one.
    pub fn create_chain(&mut self, init_data: impl Into<Vec<u8>>) -> &Chain {
        self.chain.insert(Chain::create_genesis(init_data))
    }

    pub fn is_initialized(&self) -> bool {
        self.chain.is_some()
    }

    pub fn chain(&self) -> Result<&Chain, ChainError> {
        self.chain.as_ref().ok_or(ChainError::Uninitialized)
    }

    fn chain_mut(&mut self) -> Result<&mut Chain, ChainError> {
        self.chain.as_mut().ok_or(ChainError::Uninitialized)
    }

    pub fn append_block<P: Into<Vec<u8>>>(
        &mut self,
        payloads: impl IntoIterator<Item = P>,
    ) -> Result<&Block, ChainError> {
        let transactions = payloads.into_iter().map(Transaction::new).collect();
        self.chain_mut()?.append(transactions)
    }

    pub fn get_block(&self, index: usize) -> Result<&Block, ChainError> {
        self.chain()?.get_block(index)
    }

    pub fn update_transaction(
        &mut self,
        block_index: usize,
        tx_index: usize,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ChainError> {
        self.chain_mut()?.update_transaction(block_index, tx_index, data)
    }

    pub fn verify_block(&self, index: usize) -> Result<bool, ChainError> {
        self.chain()?.verify_block(index)
    }

    pub fn describe_block(&self, index: usize) -> Result<BlockView, ChainError> {
        self.get_block(index).map(Block::describe)
    }

    pub fn describe_chain(&self) -> Result<Vec<BlockView>, ChainError> {
        self.chain().map(Chain::describe)
    }

    pub fn describe_merkle_tree(&self, index: usize) -> Result<Vec<MerkleNodeView>, ChainError> {
        self.get_block(index)?.describe_merkle_tree()
    }
}
