//! Subcommand implementations.

pub mod bump;
pub mod check;
pub mod hash;
pub mod info;
pub mod livecheck;
pub mod plan;
pub mod resolve;
pub mod validate;
pub mod verify;

use anyhow::{Context, Result};
use cask_core::Manifest;
use std::path::Path;

/// Load the single manifest in `path`.
pub(crate) fn load(path: &Path) -> Result<Manifest> {
    Manifest::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}
