//! The published proof map and the lookups made against it at mint time.

use std::collections::btree_map::{BTreeMap, Entry};
use std::fs;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::address::{Address, ChecksumPolicy};
use crate::common::{hex_encode, parse_hash32, write_file_atomic};
use crate::error::AllowlistError;
use crate::merkle::{leaf_hash, verify_proof, Hash32};

/// Result of looking an address up in a proof map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(Vec<Hash32>),
    NotEligible,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }

    pub fn proof(&self) -> Option<&[Hash32]> {
        match self {
            Self::Eligible(proof) => Some(proof.as_slice()),
            Self::NotEligible => None,
        }
    }
}

/// Address to proof mapping, as written to `proofs.json`.
///
/// The JSON form is an object keyed by checksummed address, with each value
/// an array of `0x`-prefixed hashes. Keys are emitted in address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofMap {
    entries: BTreeMap<Address, Vec<Hash32>>,
}

impl ProofMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, address: Address, proof: Vec<Hash32>) {
        self.entries.insert(address, proof);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the proof for `address`. Absence is a normal outcome.
    pub fn lookup(&self, address: &Address) -> Eligibility {
        match self.entries.get(address) {
            Some(proof) => Eligibility::Eligible(proof.clone()),
            None => Eligibility::NotEligible,
        }
    }

    /// Parses `text` the way the builder does and looks it up.
    ///
    /// # Errors
    /// Only a malformed address is an error; a well-formed address with no
    /// entry yields [`Eligibility::NotEligible`].
    pub fn lookup_str(
        &self,
        text: &str,
        policy: ChecksumPolicy,
    ) -> Result<Eligibility, AllowlistError> {
        let address = Address::parse(text, policy)?;
        Ok(self.lookup(&address))
    }

    /// Checks that every entry folds back to `root`.
    pub fn verify_all(&self, root: &Hash32) -> Result<(), AllowlistError> {
        for (address, proof) in &self.entries {
            if !verify_proof(&leaf_hash(address), proof, root) {
                return Err(AllowlistError::ProofMismatch { address: *address });
            }
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, AllowlistError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parses a proof map, normalizing every key with `policy`.
    ///
    /// Keys that differ only in spelling are merged when their proofs agree
    /// and rejected when they do not.
    pub fn from_json_str(text: &str, policy: ChecksumPolicy) -> Result<Self, AllowlistError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(text)?;

        let mut entries = BTreeMap::new();
        for (key, hashes) in raw {
            let address = Address::parse(&key, policy)
                .map_err(|e| AllowlistError::InvalidProofMap(format!("key {key:?}: {e}")))?;
            let proof = hashes
                .iter()
                .map(|h| parse_hash32(h))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AllowlistError::InvalidProofMap(format!("entry {key:?}: {e}")))?;

            match entries.entry(address) {
                Entry::Vacant(slot) => {
                    slot.insert(proof);
                }
                Entry::Occupied(existing) if *existing.get() == proof => {}
                Entry::Occupied(_) => {
                    return Err(AllowlistError::InvalidProofMap(format!(
                        "conflicting entries for {address}"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path, policy: ChecksumPolicy) -> Result<Self, AllowlistError> {
        let text = fs::read_to_string(path)?;
        let map = Self::from_json_str(&text, policy)?;
        info!(path = %path.display(), entries = map.len(), "loaded proof map");
        Ok(map)
    }

    /// Writes the map without ever leaving a truncated file at `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<(), AllowlistError> {
        let json = self.to_json_string()?;
        write_file_atomic(path, json.as_bytes())?;
        info!(path = %path.display(), entries = self.len(), "wrote proof map");
        Ok(())
    }
}

impl Serialize for ProofMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (address, proof) in &self.entries {
            let hashes: Vec<String> = proof.iter().map(hex_encode).collect();
            map.serialize_entry(&address.to_checksum(), &hashes)?;
        }
        map.end()
    }
}
