//! Resolve command

use anyhow::{Context, Result};
use cask_schema::{Arch, Checksum, Version};
use std::path::Path;

use crate::ui::Output;

/// Print the URL and digest selected for `arch`.
pub fn resolve(path: &Path, arch: Arch, version: Option<&str>, json: bool) -> Result<()> {
    let manifest = super::load(path)?;
    let version = version.map(Version::new);
    let resolved = cask_core::resolve(&manifest, arch, version.as_ref())
        .with_context(|| format!("Failed to resolve {} for {arch}", manifest.token))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let output = Output::new();
    output.header(resolved.token.as_str(), resolved.version.as_str());
    output.field("arch", arch.as_str());
    output.field("url", &resolved.source.url);
    match &resolved.source.checksum {
        Checksum::Sha256(digest) => output.field("sha256", digest.as_str()),
        Checksum::NoCheck => {
            output.field("sha256", "no_check");
            output.warning("Downloads of this cask are not verified");
        }
    }
    Ok(())
}
