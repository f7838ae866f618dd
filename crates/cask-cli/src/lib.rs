//! cask - validate, resolve and plan cask manifests
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! # Overview
//!
//! A cask is a small Ruby-flavoured manifest describing how to fetch,
//! verify, install and remove a macOS application. This binary exposes the
//! `cask-core` pipeline on the command line:
//!
//! ```text
//! check / validate   parse one file or a whole corpus
//! resolve            bind a manifest to an architecture
//! plan               list the actions for install, uninstall, zap or livecheck
//! verify             compare a local download with the planned digest
//! livecheck-extract  read a candidate version out of a fetched feed
//! bump               rewrite the version stanza
//! ```
//!
//! Nothing here touches the network; downloads and feeds are supplied by
//! the caller.

pub mod cmd;
pub mod ui;

pub use cask_core::paths::*;

use cask_core::Intent;
use cask_schema::Arch;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cask")]
#[command(author, version, about = "cask - validate, resolve and plan cask manifests")]
pub struct Cli {
    /// Target architecture (arm64 or x86_64); defaults to the host
    #[arg(long, global = true)]
    pub arch: Option<Arch>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The requested architecture, or the host's.
    pub fn arch(&self) -> Arch {
        self.arch.unwrap_or_else(Arch::current)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a manifest and report problems
    Check {
        /// Manifest file
        path: PathBuf,
    },
    /// Validate every manifest in a directory
    Validate {
        /// Corpus directory
        #[arg(default_value = "Casks")]
        dir: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the source selected for an architecture
    Resolve {
        /// Manifest file
        path: PathBuf,
        /// Override the declared version
        #[arg(long)]
        version: Option<String>,
        /// Print the resolved manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the actions for an intent
    Plan {
        /// Manifest file
        path: PathBuf,
        /// install, uninstall, zap or livecheck
        intent: Intent,
        /// Directory app bundles are installed into
        #[arg(long, env = APPDIR_ENV, default_value = DEFAULT_APPDIR)]
        appdir: PathBuf,
        /// Override the declared version
        #[arg(long)]
        version: Option<String>,
        /// Expand `~` in zap paths against the current home directory
        #[arg(long)]
        expand_home: bool,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a human-readable summary of a manifest
    Info {
        /// Manifest file
        path: PathBuf,
    },
    /// Compute SHA256 hash of a file (for manifest authoring)
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check a downloaded file against the manifest's digest
    Verify {
        /// Manifest file
        path: PathBuf,
        /// Downloaded artifact
        download: PathBuf,
    },
    /// Extract the upstream version from an already fetched feed
    #[command(name = "livecheck-extract")]
    LivecheckExtract {
        /// Manifest file
        path: PathBuf,
        /// Final URL of the feed request, after redirects
        #[arg(long)]
        url: String,
        /// File holding the response body
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Rewrite a manifest's version
    Bump {
        /// Manifest file
        path: PathBuf,
        /// New version
        version: String,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
}
