use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub fn sha256_file_hex(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Returns the actual digest when it differs from `expected_hex`.
pub fn verify_sha256_file(path: &Path, expected_hex: &str) -> Result<Option<String>> {
    let actual = sha256_file_hex(path)?;
    if actual.eq_ignore_ascii_case(expected_hex.trim()) {
        return Ok(None);
    }
    Ok(Some(actual))
}
