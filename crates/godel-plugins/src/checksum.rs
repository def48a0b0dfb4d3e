//! Plugin integrity verification
//!
//! Installed plugin binaries are checked against the SHA-256 digests declared
//! in the project configuration. Comparison is case-insensitive over the hex
//! form. A mismatching file is retained on disk so the operator can inspect
//! it.

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

/// Compute the hex-encoded SHA-256 digest of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open {} for checksum", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to read {} for checksum", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify that a file's SHA-256 digest matches the expected hex digest
pub fn verify_checksum(path: &Path, want: &str) -> Result<()> {
    let got = sha256_file(path)?;
    if !got.eq_ignore_ascii_case(want) {
        return Err(anyhow!(
            "failed to verify checksum for {}: want {}, got {}",
            path.display(),
            want,
            got
        ));
    }
    debug!("checksum verified for {}", path.display());
    Ok(())
}
