use thiserror::Error;

use crate::address::Address;

#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },
    #[error("allowlist is empty: no valid addresses after filtering")]
    EmptyAllowlist,
    #[error("leaf index {index} is out of bounds for tree with {leaves} leaves")]
    LeafIndexOutOfRange { index: usize, leaves: usize },
    #[error("invalid hash {input:?}: {reason}")]
    InvalidHash { input: String, reason: String },
    #[error("invalid proof map: {0}")]
    InvalidProofMap(String),
    #[error("proof for {address} does not reproduce the Merkle root")]
    ProofMismatch { address: Address },
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
