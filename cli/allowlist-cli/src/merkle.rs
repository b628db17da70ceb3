//! Keccak-256 Merkle tree with sorted-pair hashing.
//!
//! Parents are `keccak256(min(a, b) ++ max(a, b))`, so proofs carry no
//! left/right flags. This is the convention OpenZeppelin's `MerkleProof.verify`
//! checks on-chain. An unpaired last node is carried up to the next level
//! unchanged.

use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::address::Address;
use crate::error::AllowlistError;

pub type Hash32 = [u8; 32];

pub fn keccak256(data: impl AsRef<[u8]>) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Leaf for an address: keccak256 of its 20 raw bytes, the same value as
/// Solidity's `keccak256(abi.encodePacked(msg.sender))`.
pub fn leaf_hash(address: &Address) -> Hash32 {
    keccak256(address.as_bytes())
}

/// Computes the parent of two nodes, smaller hash first.
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

/// Folds a proof into the root it implies for `leaf`.
pub fn process_proof(leaf: &Hash32, proof: &[Hash32]) -> Hash32 {
    proof
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(&current, sibling))
}

pub fn verify_proof(leaf: &Hash32, proof: &[Hash32], root: &Hash32) -> bool {
    process_proof(leaf, proof) == *root
}

/// A fully materialized tree, stored as levels from leaves to root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<Hash32>>,
    root: Hash32,
}

impl MerkleTree {
    /// Builds a tree over `leaves` in the given order.
    ///
    /// # Errors
    /// Returns [`AllowlistError::EmptyAllowlist`] if there are no leaves.
    pub fn from_leaves(leaves: Vec<Hash32>) -> Result<Self, AllowlistError> {
        let Some(&first) = leaves.first() else {
            return Err(AllowlistError::EmptyAllowlist);
        };

        let mut root = first;
        let mut layers = vec![leaves];
        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let next_level: Vec<Hash32> = level
                .chunks(2)
                .map(|chunk| match chunk.get(1) {
                    Some(right) => hash_pair(&chunk[0], right),
                    None => chunk[0],
                })
                .collect();

            debug!(level = layers.len(), nodes = next_level.len(), "built tree level");
            root = next_level[0];
            layers.push(next_level);
        }

        Ok(Self { layers, root })
    }

    pub fn root(&self) -> Hash32 {
        self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Generates the proof for the leaf at `leaf_index`.
    ///
    /// Levels where the node had no sibling and was carried up contribute no
    /// element, so proofs for the tail of an odd tree can be shorter than
    /// [`depth`](Self::depth).
    pub fn proof(&self, leaf_index: usize) -> Result<Vec<Hash32>, AllowlistError> {
        if leaf_index >= self.leaf_count() {
            return Err(AllowlistError::LeafIndexOutOfRange {
                index: leaf_index,
                leaves: self.leaf_count(),
            });
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut current_index = leaf_index;

        for level in &self.layers[..self.depth()] {
            if let Some(sibling) = level.get(current_index ^ 1) {
                proof.push(*sibling);
            }
            current_index /= 2;
        }

        Ok(proof)
    }
}
