//! Verify command

use anyhow::{Context, Result};
use cask_core::exec::verify_download;
use cask_core::{Intent, PlanOptions, Verification, plan, resolve};
use cask_schema::{Arch, Sha256Digest};
use std::path::Path;

use crate::ui::Output;

/// Compare a local download with the digest the install plan expects.
pub fn verify(path: &Path, download: &Path, arch: Arch) -> Result<()> {
    let manifest = super::load(path)?;
    let resolved = resolve(&manifest, arch, None)?;
    let plan = plan(&resolved, Intent::Install, &PlanOptions::default())?;

    let actual = Sha256Digest::compute_file(download)
        .with_context(|| format!("Failed to hash {}", download.display()))?;

    let output = Output::new();
    match verify_download(&plan, actual.as_str())? {
        Verification::Verified { digest } => {
            output.success(&format!("{} matches {digest}", download.display()));
        }
        Verification::Skipped => {
            output.warning(&format!(
                "{} declares sha256 :no_check; nothing to compare",
                plan.token
            ));
            output.field("sha256", actual.as_str());
        }
    }
    Ok(())
}
