//! Presentation views. Digests are rendered as lowercase hex here and
//! nowhere else.

use serde::Serialize;

use crate::{merkle::MerkleNode, Block, MerkleTree};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockView {
    pub index: u64,
    /// Empty for the genesis block.
    pub prev_hash: String,
    pub hash: String,
    pub timestamp: u64,
    pub merkle_root: String,
    pub transactions: Vec<String>,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index(),
            prev_hash: block.prev_block_hash().map(hex::encode).unwrap_or_default(),
            hash: hex::encode(block.hash()),
            timestamp: block.timestamp(),
            merkle_root: hex::encode(block.merkle_root()),
            transactions: block
                .transactions()
                .iter()
                .map(|tx| String::from_utf8_lossy(&tx.data).into_owned())
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodePosition {
    Root,
    Left,
    Right,
}

/// One node of a pre-order walk, left subtree before right.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MerkleNodeView {
    pub depth: usize,
    pub position: NodePosition,
    pub hash: String,
    pub leaf: bool,
}

impl MerkleNodeView {
    pub fn collect(tree: &MerkleTree) -> Vec<MerkleNodeView> {
        let mut out = Vec::new();
        walk(tree.root(), 0, NodePosition::Root, &mut out);
        out
    }
}

fn walk(node: &MerkleNode, depth: usize, position: NodePosition, out: &mut Vec<MerkleNodeView>) {
    out.push(MerkleNodeView {
        depth,
        position,
        hash: hex::encode(node.data()),
        leaf: node.is_leaf(),
    });
    if let (Some(left), Some(right)) = (node.left(), node.right()) {
        walk(left, depth + 1, NodePosition::Left, out);
        walk(right, depth + 1, NodePosition::Right, out);
    }
}
