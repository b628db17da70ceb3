//! Allowlist builder: raw entries in, root and proof map out.
//!
//! An allowlist is a snapshot. Changing membership means building a new
//! [`Allowlist`] and republishing both the root and the whole proof map.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::address::{Address, ChecksumPolicy};
use crate::error::AllowlistError;
use crate::merkle::{leaf_hash, Hash32, MerkleTree};
use crate::proof_map::ProofMap;

/// An input row that did not parse as an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub line: usize,
    pub raw: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct BuildOutput {
    pub root: Hash32,
    pub tree: MerkleTree,
    pub proofs: ProofMap,
}

/// Deduplicated allowlist members, sorted by address bytes.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    addresses: Vec<Address>,
    rejected: Vec<RejectedEntry>,
    duplicates: usize,
}

/// Reads the first column of every row of raw, unheadered CSV.
///
/// Returns `(line, field)` pairs; blank rows and empty first fields are
/// dropped. Extra columns are ignored. Fields are raw bytes so that a row
/// which is not UTF-8 can be rejected on its own instead of failing the read.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<(usize, Vec<u8>)>, AllowlistError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        let line = record
            .position()
            .map_or(entries.len() + 1, |pos| pos.line() as usize);
        match record.get(0) {
            Some(field) if !field.is_empty() => entries.push((line, field.to_vec())),
            _ => {}
        }
    }
    Ok(entries)
}

impl Allowlist {
    /// Validates, normalizes and deduplicates raw entries.
    ///
    /// Invalid entries are logged and kept in [`rejected`](Self::rejected);
    /// they never abort the run.
    pub fn from_entries<I, S>(entries: I, policy: ChecksumPolicy) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<[u8]>,
    {
        let mut unique = BTreeSet::new();
        let mut rejected = Vec::new();
        let mut duplicates = 0;

        for (line, raw) in entries {
            let raw = match std::str::from_utf8(raw.as_ref()) {
                Ok(text) => text,
                Err(_) => {
                    let lossy = String::from_utf8_lossy(raw.as_ref()).into_owned();
                    warn!(line, entry = %lossy, "skipping entry that is not UTF-8");
                    rejected.push(RejectedEntry {
                        line,
                        raw: lossy,
                        reason: "invalid utf-8".into(),
                    });
                    continue;
                }
            };
            match Address::parse(raw, policy) {
                Ok(address) => {
                    if !unique.insert(address) {
                        debug!(line, %address, "duplicate address");
                        duplicates += 1;
                    }
                }
                Err(err) => {
                    warn!(line, entry = raw, %err, "skipping invalid address");
                    rejected.push(RejectedEntry {
                        line,
                        raw: raw.to_owned(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Self {
            addresses: unique.into_iter().collect(),
            rejected,
            duplicates,
        }
    }

    pub fn from_addresses<I: IntoIterator<Item = Address>>(addresses: I) -> Self {
        let unique: BTreeSet<Address> = addresses.into_iter().collect();
        Self {
            addresses: unique.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn from_reader<R: Read>(
        reader: R,
        policy: ChecksumPolicy,
    ) -> Result<Self, AllowlistError> {
        Ok(Self::from_entries(read_entries(reader)?, policy))
    }

    pub fn from_path(path: &Path, policy: ChecksumPolicy) -> Result<Self, AllowlistError> {
        let file = File::open(path)?;
        let allowlist = Self::from_reader(file, policy)?;
        info!(
            path = %path.display(),
            valid = allowlist.len(),
            rejected = allowlist.rejected.len(),
            duplicates = allowlist.duplicates,
            "loaded allowlist"
        );
        Ok(allowlist)
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Builds the tree and the complete proof map.
    ///
    /// # Errors
    /// Returns [`AllowlistError::EmptyAllowlist`] if no valid address remains.
    pub fn build(&self) -> Result<BuildOutput, AllowlistError> {
        if self.addresses.is_empty() {
            return Err(AllowlistError::EmptyAllowlist);
        }

        let leaves = self.addresses.iter().map(leaf_hash).collect();
        let tree = MerkleTree::from_leaves(leaves)?;

        let mut proofs = ProofMap::new();
        for (index, address) in self.addresses.iter().enumerate() {
            proofs.insert(*address, tree.proof(index)?);
        }

        info!(leaves = tree.leaf_count(), depth = tree.depth(), "built Merkle tree");
        Ok(BuildOutput {
            root: tree.root(),
            tree,
            proofs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::verify_proof;

    const A_UPPER: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1";
    const A_LOWER: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";
    const B_UPPER: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB2";
    const C_UPPER: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC3";

    fn entries(raw: &[&str]) -> Vec<(usize, String)> {
        raw.iter()
            .enumerate()
            .map(|(i, s)| (i + 1, (*s).to_owned()))
            .collect()
    }

    fn strict(raw: &[&str]) -> Allowlist {
        Allowlist::from_entries(entries(raw), ChecksumPolicy::Strict)
    }

    #[test]
    fn test_case_variants_collapse() {
        let allowlist = strict(&[A_UPPER, A_LOWER, B_UPPER]);
        assert_eq!(allowlist.len(), 2);
        assert_eq!(allowlist.duplicates(), 1);
        assert!(allowlist.rejected().is_empty());
    }

    #[test]
    fn test_scenario_two_members_third_absent() {
        let allowlist = strict(&[A_UPPER, A_LOWER, B_UPPER]);
        let output = allowlist.build().unwrap();
        assert_eq!(output.tree.leaf_count(), 2);
        assert_eq!(output.root, allowlist.build().unwrap().root);

        for text in [A_UPPER, B_UPPER] {
            let address: Address = text.parse().unwrap();
            let proof = output.proofs.lookup(&address).proof().unwrap().to_vec();
            assert!(verify_proof(&leaf_hash(&address), &proof, &output.root));
        }

        let absent: Address = C_UPPER.parse().unwrap();
        assert!(!output.proofs.lookup(&absent).is_eligible());
        assert!(!allowlist.addresses().contains(&absent));
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let allowlist = strict(&["not-an-address", A_LOWER, "0x1234"]);
        assert_eq!(allowlist.len(), 1);
        let lines: Vec<usize> = allowlist.rejected().iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_zero_address_is_a_member() {
        let zero = "0x0000000000000000000000000000000000000000";
        let allowlist = strict(&[zero, A_UPPER]);
        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.rejected().is_empty());
                assert_eq!(allowlist.addresses()[0], Address([0u8; 20]));
    }

    #[test]
    fn test_non_utf8_row_is_rejected_not_fatal() {
        let mut input = Vec::new();
        input.extend_from_slice(A_UPPER.as_bytes());
        input.extend_from_slice(b"\n0x\xff\xfe-garbage\n");
        input.extend_from_slice(B_UPPER.as_bytes());
        input.push(b'\n');

        let allowlist = Allowlist::from_reader(input.as_slice(), ChecksumPolicy::Strict).unwrap();
        assert_eq!(allowlist.len(), 2);
        let rejected = allowlist.rejected();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].line, 2);
        assert_eq!(rejected[0].reason, "invalid utf-8");
        assert!(rejected[0].raw.contains('\u{fffd}'));
        assert!(allowlist.build().is_ok());
    }

    #[test]
    fn test_bad_checksum_depends_on_policy() {
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let checked = strict(&[bad]);
        assert!(checked.is_empty());
        assert_eq!(checked.rejected().len(), 1);

        let lenient = Allowlist::from_entries(entries(&[bad]), ChecksumPolicy::Lenient);
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn test_empty_allowlist_fails_build() {
        let allowlist = strict(&["garbage"]);
        assert!(matches!(allowlist.build(), Err(AllowlistError::EmptyAllowlist)));
    }

    #[test]
    fn test_order_does_not_change_root() {
        let forward = strict(&[A_UPPER, B_UPPER, C_UPPER]);
        let backward = strict(&[C_UPPER, B_UPPER, A_UPPER]);
        assert_eq!(forward.addresses(), backward.addresses());
        assert_eq!(forward.build().unwrap().root, backward.build().unwrap().root);
    }

    #[test]
    fn test_read_entries_first_column() {
        let input = format!("{A_UPPER},extra,columns\n\n  {B_UPPER}  \n,\n{C_UPPER}\n");
        let rows = read_entries(input.as_bytes()).unwrap();
        let fields: Vec<&[u8]> = rows.iter().map(|(_, f)| f.as_slice()).collect();
        let expected: Vec<&[u8]> = vec![A_UPPER.as_bytes(), B_UPPER.as_bytes(), C_UPPER.as_bytes()];
        assert_eq!(fields, expected);
        let lines: Vec<usize> = rows.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 3, 5]);
    }

    // Root and proofs cross-checked against an independent keccak
    // implementation of the sorted-pair tree (odd leaf carried up).
    #[test]
    fn test_known_root_and_proofs() {
        let allowlist = strict(&[
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        ]);
        let output = allowlist.build().unwrap();
        assert_eq!(
            hex::encode(output.root),
            "615d13b64dc05301f8e36176938063ae767b665a7a88e868c5665f0eb2055a21"
        );

        let leaf_5aae = "793f88740e3ced5d3b007ab91feb3feb22d76afe4b9e849aa48d4d35f740fb4e";
        let leaf_dbf0 = "1a984f78b5313eb7dc3985bc550deeae6f699f0d0ffb80ad45d4fe793350e52f";
        let leaf_fb69 = "913c99ea930c78868f1535d34cd705ab85929b2eaaf70fcd09677ecd6e5d75e9";
        let pair_5aae_dbf0 = "fbc2da7eb1c53c4b9adf3981ad66de9a915cdb8be6531e72664cf1edf860b940";

        let proof_of = |text: &str| -> Vec<String> {
            let address: Address = text.parse().unwrap();
            output
                .proofs
                .lookup(&address)
                .proof()
                .unwrap()
                .iter()
                .map(hex::encode)
                .collect()
        };
        assert_eq!(
            proof_of("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            vec![leaf_dbf0, leaf_fb69]
        );
        assert_eq!(
            proof_of("0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB"),
            vec![leaf_5aae, leaf_fb69]
        );
        // the odd leaf is carried up, so its only sibling is the first pair
        assert_eq!(
            proof_of("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"),
            vec![pair_5aae_dbf0]
        );
    }
}
