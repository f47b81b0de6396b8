use std::fmt::Write;

use hashchain_core::{BlockView, MerkleNodeView, NodePosition};

pub fn block(view: &BlockView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Block Number: {}", view.index);
    let _ = writeln!(out, "Prev. hash: {}", view.prev_hash);
    let _ = writeln!(out, "Transactions:");
    for (i, tx) in view.transactions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, tx);
    }
    let _ = writeln!(out, "Hash: {}", view.hash);
    let _ = writeln!(out, "Timestamp: {}", view.timestamp);
    let _ = writeln!(out, "MerkleRoot: {}", view.merkle_root);
    out
}

/// Two spaces per level; right children get `└─`, everything else `├─`.
pub fn merkle_tree(nodes: &[MerkleNodeView]) -> String {
    let mut out = String::from("Merkle Tree:\n");
    for node in nodes {
        let marker = match node.position {
            NodePosition::Right => "└─",
            NodePosition::Root | NodePosition::Left => "├─",
        };
        let _ = writeln!(out, "{}{} {}", "  ".repeat(node.depth), marker, node.hash);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashchain_core::{Block, MerkleTree, Transaction};

    #[test]
    fn block_layout() {
        let txs = vec![Transaction::from("Genesis")];
        let genesis = Block::with_timestamp(0, txs, None, 1_600_000_000).unwrap();
        let text = block(&genesis.describe());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Block Number: 0");
        assert_eq!(lines[1], "Prev. hash: ");
        assert_eq!(lines[2], "Transactions:");
        assert_eq!(lines[3], "  1. Genesis");
        assert_eq!(
            lines[4],
            "Hash: 75ba7c0eaa1fd4ccc2856ba5675ee5bc06d8ab26b9037e3b53dae680a358414c"
        );
        assert_eq!(lines[5], "Timestamp: 1600000000");
        assert!(lines[6].starts_with("MerkleRoot: 8b2d7482"));
    }

    #[test]
    fn tree_layout() {
        let tree = MerkleTree::build(&["a"]).unwrap();
        let text = merkle_tree(&MerkleNodeView::collect(&tree));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Merkle Tree:");
        assert!(lines[1].starts_with("├─ 251a2622"));
        assert!(lines[2].starts_with("  ├─ ca978112"));
        assert!(lines[3].starts_with("  └─ ca978112"));
    }
}
