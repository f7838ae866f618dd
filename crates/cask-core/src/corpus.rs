//! Batch validation of a manifest corpus.
//!
//! Every file is parsed independently. Errors are collected rather than
//! short-circuiting, and tokens declared more than once are reported as a
//! single [`CaskError::DuplicateManifest`] naming every declaration. Neither
//! side of a conflict is kept.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CaskError, Result};
use crate::manifest::{Manifest, parse_all};
use cask_schema::CaskToken;

/// Extension of manifest files.
pub const MANIFEST_EXT: &str = "rb";

/// A manifest file read into memory.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Where the text came from.
    pub path: PathBuf,
    /// File contents.
    pub content: String,
}

/// Outcome of validating a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of files examined.
    pub files: usize,
    /// Manifests that parsed and are not part of a conflict.
    pub manifests: Vec<Manifest>,
    /// Every problem found, parse errors first, then duplicates by token.
    pub errors: Vec<CaskError>,
}

/// Serializable view of one problem, for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    /// Variant name (see [`CaskError::kind`]).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl BatchReport {
    /// Returns `true` if no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Duplicate conflicts only.
    pub fn duplicates(&self) -> impl Iterator<Item = &CaskError> {
        self.errors
            .iter()
            .filter(|e| matches!(e, CaskError::DuplicateManifest { .. }))
    }

    /// Errors flattened for serialization.
    pub fn problems(&self) -> Vec<Problem> {
        self.errors
            .iter()
            .map(|e| Problem {
                kind: e.kind(),
                message: e.to_string(),
            })
            .collect()
    }
}

/// List every manifest file under `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`CaskError::Io`] if the directory cannot be walked.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| CaskError::Io(e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == MANIFEST_EXT) {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();
    debug!(dir = %dir.display(), count = paths.len(), "discovered manifests");
    Ok(paths)
}

/// Parse and cross-check a batch of files.
pub fn validate_batch(files: &[ManifestFile]) -> BatchReport {
    let mut report = BatchReport {
        files: files.len(),
        ..BatchReport::default()
    };
    let mut parsed = Vec::new();

    for file in files {
        match parse_all(&file.content, Some(&file.path)) {
            Ok(manifests) => parsed.extend(manifests),
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "invalid manifest");
                report.errors.push(e);
            }
        }
    }

    let mut by_token: BTreeMap<CaskToken, Vec<usize>> = BTreeMap::new();
    for (i, m) in parsed.iter().enumerate() {
        by_token.entry(m.token.clone()).or_default().push(i);
    }

    let mut conflicted = vec![false; parsed.len()];
    for (token, indices) in by_token {
        if indices.len() < 2 {
            continue;
        }
        for &i in &indices {
            conflicted[i] = true;
        }
        let locations = indices.iter().map(|&i| parsed[i].location.clone()).collect();
        warn!(cask = %token, count = indices.len(), "duplicate manifest");
        report
            .errors
            .push(CaskError::DuplicateManifest { token, locations });
    }

    report.manifests = parsed
        .into_iter()
        .zip(conflicted)
        .filter_map(|(m, bad)| (!bad).then_some(m))
        .collect();
    report
}

/// Discover, read and validate every manifest under `dir`.
///
/// Unreadable files are reported in the batch rather than aborting it.
///
/// # Errors
///
/// Returns [`CaskError::Io`] only if the directory itself cannot be walked.
pub fn validate_dir(dir: &Path) -> Result<BatchReport> {
    let mut files = Vec::new();
    let mut read_errors = Vec::new();
    for path in discover(dir)? {
        match fs::read_to_string(&path) {
            Ok(content) => files.push(ManifestFile { path, content }),
            Err(e) => read_errors.push(CaskError::Io(e)),
        }
    }
    let mut report = validate_batch(&files);
    report.files += read_errors.len();
    report.errors.splice(0..0, read_errors);
    Ok(report)
}
