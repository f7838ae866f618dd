//! Error taxonomy shared by the parser, resolver, planner and driver.

use std::path::PathBuf;

use cask_schema::{Arch, CaskToken, Sha256Digest};
use serde::Serialize;
use thiserror::Error;

/// Where a manifest (or a problem inside one) was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    /// File the manifest was read from; `None` for in-memory text.
    pub path: Option<PathBuf>,
    /// 1-based line number.
    pub line: usize,
}

impl SourceLocation {
    /// A location inside the file at `path` (or in-memory text when `None`).
    pub fn new(path: Option<PathBuf>, line: usize) -> Self {
        Self { path, line }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "<memory>:{}", self.line),
        }
    }
}

fn join_locations(locations: &[SourceLocation]) -> String {
    locations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced while loading, resolving, planning or driving a cask.
#[derive(Error, Debug)]
pub enum CaskError {
    /// Structural parse failure. Fatal for that manifest only.
    #[error("Malformed manifest at {location}: {reason}")]
    MalformedManifest {
        /// Position of the offending token, or of the `cask` keyword for
        /// missing stanzas.
        location: SourceLocation,
        /// What is wrong.
        reason: String,
    },

    /// Zero or several sources remained after architecture filtering.
    #[error("No matching source for '{token}' on {arch} ({candidates} candidates)")]
    NoMatchingSource {
        /// Cask being resolved.
        token: CaskToken,
        /// Requested architecture.
        arch: Arch,
        /// Number of candidates left after filtering (0 or more than 1).
        candidates: usize,
    },

    /// A `#{...}` token survived substitution.
    #[error("Unresolved template variable '#{{{variable}}}' in {field} of '{token}'")]
    UnresolvedTemplate {
        /// Cask being resolved.
        token: CaskToken,
        /// Field holding the template (e.g. `url`, `zap`).
        field: &'static str,
        /// Name of the unknown variable.
        variable: String,
    },

    /// A downloaded artifact did not hash to the declared digest.
    #[error("Checksum mismatch for '{token}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Cask being installed.
        token: CaskToken,
        /// Digest declared by the manifest.
        expected: Sha256Digest,
        /// Digest reported by the digester.
        actual: String,
    },

    /// Several manifests in one batch declare the same token.
    #[error("Duplicate manifest for '{token}' at {}", join_locations(.locations))]
    DuplicateManifest {
        /// The contested token.
        token: CaskToken,
        /// Every place the token is declared, in discovery order.
        locations: Vec<SourceLocation>,
    },

    /// An install was planned for a cask that declares no `app`.
    #[error("'{0}' declares no app artifact to install")]
    MissingArtifact(CaskToken),

    /// A livecheck was planned for a cask that declares no `livecheck` block.
    #[error("'{0}' declares no livecheck")]
    NoLivecheck(CaskToken),

    /// An external collaborator failed while a plan was being driven.
    #[error("{action} failed: {message}")]
    Collaborator {
        /// Action being executed.
        action: &'static str,
        /// Collaborator-supplied message.
        message: String,
    },

    /// An I/O error occurred while reading a manifest.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaskError {
    /// Shorthand for [`CaskError::MalformedManifest`].
    pub fn malformed(location: SourceLocation, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            location,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedManifest { .. } => "malformed_manifest",
            Self::NoMatchingSource { .. } => "no_matching_source",
            Self::UnresolvedTemplate { .. } => "unresolved_template",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::DuplicateManifest { .. } => "duplicate_manifest",
            Self::MissingArtifact(_) => "missing_artifact",
            Self::NoLivecheck(_) => "no_livecheck",
            Self::Collaborator { .. } => "collaborator",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = CaskError> = std::result::Result<T, E>;
