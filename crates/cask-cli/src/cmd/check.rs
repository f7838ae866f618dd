//! Check command

use anyhow::{Context, Result, bail};
use cask_core::corpus::{ManifestFile, validate_batch};
use cask_core::resolve;
use std::path::Path;

use crate::ui::Output;

/// Parse a manifest file and resolve it for every architecture it supports.
pub fn check(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let output = Output::new();

    let report = validate_batch(&[ManifestFile {
        path: path.to_path_buf(),
        content,
    }]);
    let mut problems: Vec<String> = report.errors.iter().map(ToString::to_string).collect();

    for manifest in &report.manifests {
        let arches = manifest.supported_arches();
        for arch in &arches {
            if let Err(e) = resolve(manifest, *arch, None) {
                problems.push(e.to_string());
            }
        }
        if problems.is_empty() {
            output.success(&format!("{} {} is valid", manifest.token, manifest.version));
            let arches: Vec<&str> = arches.iter().map(|a| a.as_str()).collect();
            output.field("arch", &arches.join(", "));
            if manifest.sources.iter().any(|s| s.checksum.is_no_check()) {
                output.warning("sha256 :no_check, downloads will not be verified");
            }
            if manifest.livecheck.is_none() {
                output.info("No livecheck block");
            }
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            output.error(problem);
        }
        bail!("{} problem(s) in {}", problems.len(), path.display());
    }
    Ok(())
}
