//! 20-byte Ethereum addresses and their EIP-55 checksummed text form.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{SigningKey, VerifyingKey};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::common::strip_hex_prefix;
use crate::error::AllowlistError;

/// How mixed-case input is treated when its EIP-55 checksum does not match.
///
/// All-lowercase and all-uppercase addresses carry no checksum and are
/// accepted under either policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Reject mixed-case input whose casing is not the EIP-55 encoding.
    #[default]
    Strict,
    /// Trust the raw bytes and re-derive the canonical casing.
    Lenient,
}

impl ChecksumPolicy {
    pub fn from_lenient_flag(lenient: bool) -> Self {
        if lenient {
            Self::Lenient
        } else {
            Self::Strict
        }
    }
}

/// Ethereum account address.
///
/// Ordering and equality are on the raw bytes, so two spellings of the same
/// address always compare equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// Parses an address from a hex string.
    ///
    /// # Arguments
    /// * `text` - The address string, with or without "0x" prefix
    /// * `policy` - What to do with a mixed-case string whose checksum is wrong
    ///
    /// # Errors
    /// Returns [`AllowlistError::InvalidAddress`] if the address is not 40 hex
    /// chars, or fails the checksum under [`ChecksumPolicy::Strict`].
    pub fn parse(text: &str, policy: ChecksumPolicy) -> Result<Self, AllowlistError> {
        let trimmed = text.trim();
        let digits = strip_hex_prefix(trimmed);
        let invalid = |reason: String| AllowlistError::InvalidAddress {
            input: trimmed.to_owned(),
            reason,
        };

        if digits.len() != 2 * Self::LEN {
            return Err(invalid(format!(
                "expected 40 hex chars, got {}",
                digits.len()
            )));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| invalid(format!("invalid hex encoding: {e}")))?;
        let address = Self(bytes);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && policy == ChecksumPolicy::Strict {
            let canonical = address.to_checksum();
            if &canonical[2..] != digits {
                return Err(invalid(format!(
                    "bad EIP-55 checksum, expected {canonical}"
                )));
            }
        }

        Ok(address)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case encoding, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        alloy_primitives::Address::from(self.0).to_checksum(None)
    }

    /// Derives the address controlled by a secp256k1 public key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let encoded = key.to_encoded_point(false);
        // skip the 0x04 uncompressed-point tag
        let derived = alloy_primitives::Address::from_raw_public_key(&encoded.as_bytes()[1..]);
        Self(derived.0.into())
    }

    /// Derives the address of a hex-encoded private key.
    ///
    /// The decoded key bytes are zeroized before returning.
    pub fn from_private_key_hex(text: &str) -> Result<Self, AllowlistError> {
        let cleaned = strip_hex_prefix(text.trim());
        if cleaned.is_empty() {
            return Err(AllowlistError::InvalidKey("private key is empty".into()));
        }
        let mut key_bytes = hex::decode(cleaned)
            .map_err(|e| AllowlistError::InvalidKey(format!("invalid hex encoding: {e}")))?;

        let signing_key = if key_bytes.len() == 32 {
            SigningKey::from_slice(&key_bytes)
                .map_err(|e| AllowlistError::InvalidKey(e.to_string()))
        } else {
            Err(AllowlistError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            )))
        };
        key_bytes.zeroize();

        Ok(Self::from_verifying_key(signing_key?.verifying_key()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = AllowlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, ChecksumPolicy::Strict)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // vectors from EIP-55
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    fn strict(text: &str) -> Result<Address, AllowlistError> {
        Address::parse(text, ChecksumPolicy::Strict)
    }

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let address = strict(&expected.to_lowercase()).unwrap();
            assert_eq!(address.to_checksum(), expected);
            assert_eq!(address.to_string(), expected);
        }
    }

    #[test]
    fn test_parse_accepts_valid_checksum() {
        for text in CHECKSUMMED {
            assert!(strict(text).is_ok());
        }
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let with = strict("0x1234567890abcdef1234567890abcdef12345678").unwrap();
        let without = strict("1234567890abcdef1234567890abcdef12345678").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_parse_uppercase_has_no_checksum() {
        let upper = strict("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        let lower = strict("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_parse_zero_address() {
        let zero = strict("0x0000000000000000000000000000000000000000").unwrap();
        assert_eq!(zero.as_bytes(), &[0u8; 20]);
    }

    #[test]
    fn test_bad_checksum_strict_rejects() {
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(strict(bad), Err(AllowlistError::InvalidAddress { .. })));
    }

    #[test]
    fn test_bad_checksum_lenient_rederives() {
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let address = Address::parse(bad, ChecksumPolicy::Lenient).unwrap();
        assert_eq!(address.to_checksum(), CHECKSUMMED[0]);
    }

    #[test]
    fn test_parse_invalid_length() {
        assert!(Address::parse("0x1234", ChecksumPolicy::Lenient).is_err());
    }

    #[test]
    fn test_parse_invalid_hex() {
        let text = "0xghijklmnopqrstuvwxyz1234567890abcdefghij";
        assert!(Address::parse(text, ChecksumPolicy::Lenient).is_err());
    }

    #[test]
    fn test_from_private_key_one() {
        let key = format!("0x{}01", "00".repeat(31));
        let address = Address::from_private_key_hex(&key).unwrap();
        assert_eq!(
            address.to_checksum(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_from_private_key_rejects_bad_input() {
        assert!(Address::from_private_key_hex("").is_err());
        assert!(Address::from_private_key_hex("0x1234").is_err());
        // zero is not a valid secp256k1 scalar
        assert!(Address::from_private_key_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_serde_uses_checksum() {
        let address: Address = CHECKSUMMED[1].parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[1]));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
