use tracing::{info, warn};

use crate::{constants::DEFAULT_GENESIS_DATA, error::ChainError, Block, BlockView, Transaction};

/// Append-only sequence of blocks, each linked to its predecessor's hash.
///
/// Not synchronised: a multi-threaded host must serialise `append` and
/// `update_transaction` behind one lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// A chain whose genesis carries [`DEFAULT_GENESIS_DATA`].
    pub fn new() -> Self {
        Self::create_genesis(DEFAULT_GENESIS_DATA)
    }

    /// A chain holding only a genesis block at index 0 with one transaction
    /// and no previous hash.
    pub fn create_genesis(init_data: impl Into<Vec<u8>>) -> Self {
        let genesis = Block::new(0, vec![Transaction::new(init_data)], None)
            .expect("a single transaction always yields a merkle root");
        info!(hash = %hex::encode(genesis.hash()), "created genesis block");
        Self {
            blocks: vec![genesis],
        }
    }

    /// Appends a block linked to the current tip.
    pub fn append(&mut self, transactions: Vec<Transaction>) -> Result<&Block, ChainError> {
        let tip = self.tip().ok_or(ChainError::Uninitialized)?;
        let block = Block::new(tip.index() + 1, transactions, Some(tip.hash()))?;
        info!(
            index = block.index(),
            txs = block.transactions().len(),
            hash = %hex::encode(block.hash()),
            "appended block"
        );
        self.blocks.push(block);
        self.tip().ok_or(ChainError::Uninitialized)
    }

    pub fn get_block(&self, index: usize) -> Result<&Block, ChainError> {
        self.blocks.get(index).ok_or(ChainError::InvalidBlockIndex {
            index,
            len: self.blocks.len(),
        })
    }

    /// Replaces a transaction payload without recomputing the block's hash
    /// or Merkle root. The block is cloned before the write, so copies
    /// handed out earlier keep the old payload.
    pub fn update_transaction(
        &mut self,
        block_index: usize,
        tx_index: usize,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ChainError> {
        let mut updated = self.get_block(block_index)?.clone();
        updated.update_transaction(tx_index, data)?;
        warn!(
            block = block_index,
            tx = tx_index,
            "transaction payload replaced"
        );
        self.blocks[block_index] = updated;
        Ok(())
    }

    pub fn verify_block(&self, index: usize) -> Result<bool, ChainError> {
        self.get_block(index).map(Block::verify)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn describe(&self) -> Vec<BlockView> {
        self.blocks.iter().map(BlockView::from).collect()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
