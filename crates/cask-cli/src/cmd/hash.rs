//! Hash command

use anyhow::{Context, Result};
use cask_schema::Sha256Digest;
use std::path::PathBuf;

/// Print the SHA-256 of each file, `sha256sum` style.
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let digest = Sha256Digest::compute_file(path)
            .with_context(|| format!("Failed to hash {}", path.display()))?;
        println!("{digest}  {}", path.display());
    }
    Ok(())
}
