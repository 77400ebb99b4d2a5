//! SHA-256 verification of downloaded release archives.
//!
//! Bun publishes a `SHASUMS256.txt` file next to each release's assets, in
//! the usual `<hex digest>  <file name>` format.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::errors::BunenvError;

/// Name of the checksum listing published with every release.
pub const SHASUMS_FILE: &str = "SHASUMS256.txt";

/// Verifies that a file matches the expected SHA-256 checksum.
///
/// The comparison ignores the case of `expected`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or a
/// [`BunenvError::ChecksumMismatch`] if the digests differ.
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let computed = compute_sha256(file_path)?;
    let expected = expected.to_lowercase();

    if computed != expected {
        let file = file_path
            .file_name()
            .map_or_else(|| file_path.display().to_string(), |n| n.to_string_lossy().into_owned());
        return Err(BunenvError::checksum_mismatch(file, expected, computed).into());
    }

    Ok(())
}

/// Computes the SHA-256 hash of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open file for checksum: {}", file_path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).with_context(|| {
            format!("Failed to read file for checksum: {}", file_path.display())
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Looks up the digest listed for `asset` in a `SHASUMS256.txt` body.
///
/// Lines that do not have the `<digest> <name>` shape are ignored. A `*`
/// before the name (binary mode marker) is accepted.
#[must_use]
pub fn parse_shasums(listing: &str, asset: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?;
        let name = name.strip_prefix('*').unwrap_or(name);
        (name == asset && digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()))
            .then(|| digest.to_lowercase())
    })
}
