//! ABI calldata for the collection contract's mint and admin entry points.
//!
//! Transactions are signed and sent elsewhere; this only produces the bytes.

use alloy_primitives::{B256, U256};
use alloy_sol_types::{sol, SolCall};

use crate::error::AllowlistError;
use crate::merkle::Hash32;

sol! {
    function setMerkleRoot(bytes32 root);
    function whitelistMint(uint256 quantity, bytes32[] proof);
    function publicMint(uint256 quantity);
    function toggleWhitelistSale();
    function togglePublicSale();
    function setPublicPrice(uint256 price);
    function setUnrevealedURI(string uri);
    function whitelistSaleActive() returns (bool);
    function publicSaleActive() returns (bool);
    function publicPrice() returns (uint256);
}

pub fn set_merkle_root(root: &Hash32) -> Vec<u8> {
    setMerkleRootCall {
        root: B256::from(*root),
    }
    .abi_encode()
}

/// `whitelistMint(uint256 quantity, bytes32[] proof)`
///
/// An empty proof (single-member allowlist) encodes as a zero-length array.
pub fn whitelist_mint(quantity: u64, proof: &[Hash32]) -> Vec<u8> {
    whitelistMintCall {
        quantity: U256::from(quantity),
        proof: proof.iter().copied().map(B256::from).collect(),
    }
    .abi_encode()
}

pub fn public_mint(quantity: u64) -> Vec<u8> {
    publicMintCall {
        quantity: U256::from(quantity),
    }
    .abi_encode()
}

/// Wei to attach to a public mint.
pub fn public_mint_value(price_wei: u128, quantity: u64) -> Result<u128, AllowlistError> {
    price_wei
        .checked_mul(u128::from(quantity))
        .ok_or(AllowlistError::Overflow("public mint value"))
}

pub fn toggle_whitelist_sale() -> Vec<u8> {
    no_args::<toggleWhitelistSaleCall>()
}

pub fn toggle_public_sale() -> Vec<u8> {
    no_args::<togglePublicSaleCall>()
}

pub fn set_public_price(price_wei: u128) -> Vec<u8> {
    setPublicPriceCall {
        price: U256::from(price_wei),
    }
    .abi_encode()
}

pub fn set_unrevealed_uri(uri: &str) -> Vec<u8> {
    setUnrevealedURICall {
        uri: uri.to_owned(),
    }
    .abi_encode()
}

/// Calldata for a call without arguments: just the selector.
pub fn no_args<C: SolCall>() -> Vec<u8> {
    C::SELECTOR.to_vec()
}
