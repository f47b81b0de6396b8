//! Binary Merkle tree over an ordered list of byte payloads.
//!
//! Leaves hold `SHA256(payload)`, parents hold `SHA256(left || right)`.
//! Whenever a level has an odd number of nodes its last node is duplicated,
//! so a single payload is paired with a copy of itself.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{error::ChainError, sha256, Hash};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleNode {
    data: Hash,
    // Either both children or none.
    children: Option<Box<(MerkleNode, MerkleNode)>>,
}

impl MerkleNode {
    pub fn leaf(payload: &[u8]) -> Self {
        Self {
            data: sha256(payload),
            children: None,
        }
    }

    pub fn parent(left: MerkleNode, right: MerkleNode) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(left.data);
        hasher.update(right.data);
        let digest = hasher.finalize();
        let mut data = [0u8; 32];
        data.copy_from_slice(&digest[..]);
        Self {
            data,
            children: Some(Box::new((left, right))),
        }
    }

    pub fn data(&self) -> &Hash {
        &self.data
    }

    pub fn left(&self) -> Option<&MerkleNode> {
        self.children.as_deref().map(|(left, _)| left)
    }

    pub fn right(&self) -> Option<&MerkleNode> {
        self.children.as_deref().map(|(_, right)| right)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A fully materialised tree. Built once from a snapshot of payloads; any
/// change to the payloads needs a rebuild.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    root: MerkleNode,
    leaf_count: usize,
}

impl MerkleTree {
    pub fn build<P: AsRef<[u8]>>(payloads: &[P]) -> Result<Self, ChainError> {
        if payloads.is_empty() {
            return Err(ChainError::EmptyMerkleInput);
        }

        let mut level: Vec<MerkleNode> = payloads
            .iter()
            .map(|p| MerkleNode::leaf(p.as_ref()))
            .collect();
        let leaf_count = level.len();

        // The leaf level is always combined at least once, even for one payload.
        loop {
            if level.len() % 2 == 1 {
                if let Some(last) = level.last().cloned() {
                    level.push(last);
                }
            }
            let mut next = Vec::with_capacity(level.len() / 2);
            let mut nodes = level.into_iter();
            while let (Some(left), Some(right)) = (nodes.next(), nodes.next()) {
                next.push(MerkleNode::parent(left, right));
            }
            level = next;
            if level.len() <= 1 {
                break;
            }
        }

        let root = level.pop().ok_or(ChainError::EmptyMerkleInput)?;
        debug!(
            leaves = leaf_count,
            root = %hex::encode(root.data),
            "built merkle tree"
        );
        Ok(Self { root, leaf_count })
    }

    pub fn root(&self) -> &MerkleNode {
        &self.root
    }

    pub fn root_hash(&self) -> Hash {
        self.root.data
    }

    /// Number of payloads the tree was built from, before any padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of edges from the root down to the leaves.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = &self.root;
        while let Some(left) = node.left() {
            height += 1;
            node = left;
        }
        height
    }
}

pub fn merkle_root<P: AsRef<[u8]>>(payloads: &[P]) -> Result<Hash, ChainError> {
    MerkleTree::build(payloads).map(|tree| tree.root_hash())
}
