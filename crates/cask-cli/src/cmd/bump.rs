//! Bump command

use anyhow::{Context, Result};
use cask_core::bump::bump_version;
use cask_schema::Version;
use std::path::Path;

use crate::ui::Output;

/// Rewrite the version stanza; print the result unless `write` is set.
pub fn bump(path: &Path, version: &str, write: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let bumped = bump_version(&content, &Version::new(version))
        .with_context(|| format!("Failed to bump {}", path.display()))?;

    if write {
        std::fs::write(path, &bumped)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Output::new().success(&format!("Bumped {} to {version}", path.display()));
    } else {
        print!("{bumped}");
    }
    Ok(())
}
