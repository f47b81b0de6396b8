pub mod chain;
pub mod constants;
pub mod error;
pub mod merkle;
pub mod session;
pub mod view;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub use chain::Chain;
pub use error::ChainError;
pub use merkle::{merkle_root, MerkleNode, MerkleTree};
pub use session::Session;
pub use view::{BlockView, MerkleNodeView, NodePosition};

pub type Hash = [u8; 32];

pub fn sha256(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Seconds since the unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// An opaque payload. Any byte string is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl AsRef<[u8]> for Transaction {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<&str> for Transaction {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl From<String> for Transaction {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Transaction {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// A block of transactions.
///
/// `hash` and `merkle_root` are snapshots taken at construction. The
/// transactions stay mutable through [`Block::update_transaction`], which
/// leaves both snapshots alone so that [`Block::verify`] can notice the
/// change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: u64,
    transactions: Vec<Transaction>,
    prev_block_hash: Option<Hash>,
    hash: Hash,
    merkle_root: Hash,
}

impl Block {
    /// Builds a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        prev_block_hash: Option<Hash>,
    ) -> Result<Self, ChainError> {
        Self::with_timestamp(index, transactions, prev_block_hash, unix_now())
    }

    pub fn with_timestamp(
        index: u64,
        transactions: Vec<Transaction>,
        prev_block_hash: Option<Hash>,
        timestamp: u64,
    ) -> Result<Self, ChainError> {
        let merkle_root = merkle_root(&transactions)?;
        let hash = Self::compute_hash(prev_block_hash.as_ref(), &transactions, timestamp);
        debug!(
            index,
            timestamp,
            txs = transactions.len(),
            hash = %hex::encode(hash),
            "created block"
        );
        Ok(Self {
            index,
            timestamp,
            transactions,
            prev_block_hash,
            hash,
            merkle_root,
        })
    }

    /// Identity hash preimage: previous hash, then every payload joined with
    /// no separator, then the timestamp as decimal ASCII.
    pub fn hash_bytes(
        prev_block_hash: Option<&Hash>,
        transactions: &[Transaction],
        timestamp: u64,
    ) -> Vec<u8> {
        let timestamp = timestamp.to_string();
        let tx_len: usize = transactions.iter().map(|t| t.data.len()).sum();
        let mut bytes = Vec::with_capacity(32 + tx_len + timestamp.len());
        if let Some(prev) = prev_block_hash {
            bytes.extend_from_slice(prev);
        }
        for tx in transactions {
            bytes.extend_from_slice(&tx.data);
        }
        bytes.extend_from_slice(timestamp.as_bytes());
        bytes
    }

    pub fn compute_hash(
        prev_block_hash: Option<&Hash>,
        transactions: &[Transaction],
        timestamp: u64,
    ) -> Hash {
        sha256(&Self::hash_bytes(prev_block_hash, transactions, timestamp))
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// `None` for a genesis block.
    pub fn prev_block_hash(&self) -> Option<&Hash> {
        self.prev_block_hash.as_ref()
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn merkle_root(&self) -> Hash {
        self.merkle_root
    }

    /// Rebuilds the Merkle tree from the current transaction payloads.
    pub fn merkle_tree(&self) -> Result<MerkleTree, ChainError> {
        MerkleTree::build(&self.transactions)
    }

    /// Replaces one payload in place without touching `hash` or `merkle_root`.
    pub fn update_transaction(
        &mut self,
        tx_index: usize,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ChainError> {
        let len = self.transactions.len();
        let Some(tx) = self.transactions.get_mut(tx_index) else {
            return Err(ChainError::InvalidTransactionIndex {
                block: self.index as usize,
                index: tx_index,
                len,
            });
        };
        tx.data = data.into();
        Ok(())
    }

    /// True iff the Merkle root recomputed from the current payloads equals
    /// the stored one. The identity hash and chain linkage are not checked.
    pub fn verify(&self) -> bool {
        let valid = merkle_root(&self.transactions)
            .map(|root| root == self.merkle_root)
            .unwrap_or(false);
        if !valid {
            warn!(index = self.index, "merkle root mismatch");
        }
        valid
    }

    pub fn describe(&self) -> BlockView {
        BlockView::from(self)
    }

    pub fn describe_merkle_tree(&self) -> Result<Vec<MerkleNodeView>, ChainError> {
        self.merkle_tree()
            .map(|tree| MerkleNodeView::collect(&tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txs(payloads: &[&str]) -> Vec<Transaction> {
        payloads.iter().map(|p| Transaction::from(*p)).collect()
    }

    #[test]
    fn sha256_example() {
        assert_eq!(
            hex::encode(sha256(b"a")),
            "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb"
        );
    }

    #[test]
    fn genesis_hash_example() {
        let block = Block::with_timestamp(0, txs(&["Genesis"]), None, 1_600_000_000).unwrap();
        assert_eq!(
            hex::encode(block.hash()),
            "75ba7c0eaa1fd4ccc2856ba5675ee5bc06d8ab26b9037e3b53dae680a358414c"
        );
        assert_eq!(
            hex::encode(block.merkle_root()),
            "8b2d74827939f5f4bca0919b649e57cdcb1761e59998583b4df1dcb7c2ae90dd"
        );
    }

    #[test]
    fn block_hash_example() {
        let prev = Some([0u8; 32]);
        let block = Block::with_timestamp(1, txs(&["a", "b", "c"]), prev, 1_600_000_000).unwrap();
        assert_eq!(
            hex::encode(block.hash()),
            "548c769efef994bddd0ebe65502848a4234a83eb879d1af47ba52298ebe7f467"
        );
    }

    #[test]
    fn hash_bytes_layout() {
        let prev = [7u8; 32];
        let bytes = Block::hash_bytes(Some(&prev), &txs(&["ab", "c"]), 42);
        assert_eq!(&bytes[..32], &prev);
        assert_eq!(&bytes[32..35], b"abc");
        assert_eq!(&bytes[35..], b"42");

        let bytes = Block::hash_bytes(None, &txs(&["x"]), 7);
        assert_eq!(bytes, b"x7".to_vec());
    }

    #[test]
    fn block_hash_consistency() {
        let prev = Some([1u8; 32]);
        let a = Block::with_timestamp(3, txs(&["a", "b"]), prev, 1_600_000_200).unwrap();
        let b = Block::with_timestamp(3, txs(&["a", "b"]), prev, 1_600_000_200).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), a.hash());
    }

    #[test]
    fn block_hash_changes_with_timestamp() {
        let a = Block::with_timestamp(1, txs(&["a"]), None, 1_600_000_000).unwrap();
        let b = Block::with_timestamp(1, txs(&["a"]), None, 1_600_000_001).unwrap();
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.merkle_root(), b.merkle_root());
    }

    #[test]
    fn index_is_not_part_of_hash() {
        let a = Block::with_timestamp(1, txs(&["a"]), None, 10).unwrap();
        let b = Block::with_timestamp(2, txs(&["a"]), None, 10).unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn new_block_is_stamped_and_valid() {
        let block = Block::new(0, txs(&["a"]), None).unwrap();
        assert!(block.timestamp() > 0);
        assert!(block.prev_block_hash().is_none());
        assert!(block.verify());
    }

    #[test]
    fn block_without_transactions_is_rejected() {
        assert_eq!(
            Block::new(0, vec![], None),
            Err(ChainError::EmptyMerkleInput)
        );
    }

    #[test]
    fn update_detected_by_verify() {
        let mut block = Block::with_timestamp(1, txs(&["a", "b", "c"]), None, 5).unwrap();
        let hash = block.hash();
        let root = block.merkle_root();

        block.update_transaction(1, "z").unwrap();
        assert_eq!(block.transactions()[1].data, b"z".to_vec());
        assert_eq!(block.hash(), hash);
        assert_eq!(block.merkle_root(), root);
        assert!(!block.verify());

        block.update_transaction(1, "b").unwrap();
        assert!(block.verify());
    }

    #[test]
    fn update_out_of_range() {
        let mut block = Block::with_timestamp(4, txs(&["a"]), None, 5).unwrap();
        assert_eq!(
            block.update_transaction(1, "z"),
            Err(ChainError::InvalidTransactionIndex {
                block: 4,
                index: 1,
                len: 1
            })
        );
        assert!(block.verify());
    }

    #[test]
    fn rebuilt_tree_follows_payloads() {
        let mut block = Block::with_timestamp(1, txs(&["a", "b"]), None, 5).unwrap();
        assert_eq!(
            block.merkle_tree().unwrap().root_hash(),
            block.merkle_root()
        );
        block.update_transaction(0, "q").unwrap();
        assert_eq!(
            block.merkle_tree().unwrap().root_hash(),
            merkle_root(&["q", "b"]).unwrap()
        );
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::from("hi");
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"data":[104,105]}"#);
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn block_serialization_roundtrip() {
        let block = Block::with_timestamp(2, txs(&["a", "b"]), Some([9u8; 32]), 77).unwrap();
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
        assert!(back.verify());
    }
}
