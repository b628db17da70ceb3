#![forbid(unsafe_code)]

pub mod address;
pub mod allowlist;
pub mod calldata;
pub mod common;
pub mod error;
pub mod merkle;
pub mod proof_map;

pub use address::{Address, ChecksumPolicy};
pub use allowlist::{read_entries, Allowlist, BuildOutput, RejectedEntry};
pub use common::{hex_encode, parse_hash32, write_file_atomic};
pub use error::AllowlistError;
pub use merkle::{hash_pair, keccak256, leaf_hash, process_proof, verify_proof, Hash32, MerkleTree};
pub use proof_map::{Eligibility, ProofMap};
