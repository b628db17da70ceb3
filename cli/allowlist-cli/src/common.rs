use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AllowlistError;
use crate::merkle::Hash32;

/// Encodes bytes as a lowercase hex string with a `0x` prefix.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Removes an optional `0x` / `0X` prefix.
pub fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Parses a 32-byte hash from a hex string, with or without `0x` prefix.
///
/// # Errors
/// Returns [`AllowlistError::InvalidHash`] if the value is not exactly 64 hex chars.
pub fn parse_hash32(text: &str) -> Result<Hash32, AllowlistError> {
    let trimmed = text.trim();
    let cleaned = strip_hex_prefix(trimmed);
    let invalid = |reason: String| AllowlistError::InvalidHash {
        input: trimmed.to_owned(),
        reason,
    };
    if cleaned.len() != 64 {
        return Err(invalid(format!(
            "expected 64 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| invalid(format!("invalid hex encoding: {e}")))?;
    Ok(hash)
}

fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {} has no file name", path.display()),
        )
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

/// Writes `contents` to `path` through a sibling temp file and a rename.
///
/// Readers see either the previous file or the complete new one, never a
/// truncated write. The temp file is removed if any step fails.
pub fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<(), AllowlistError> {
    let temp_path = temp_path_for(path)?;

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result.map_err(AllowlistError::from)
}
