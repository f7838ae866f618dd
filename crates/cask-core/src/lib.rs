//! Core library for cask manifests.
//!
//! ```text
//! text --parse--> Manifest --resolve(arch, version)--> ResolvedManifest --plan(intent)--> Plan
//! ```
//!
//! Every stage is a pure function. [`exec::drive`] runs a plan against
//! caller-supplied collaborators; [`corpus`] validates a whole directory of
//! manifests at once.

pub mod bump;
pub mod corpus;
pub mod error;
pub mod exec;
mod lexer;
pub mod livecheck;
pub mod manifest;
pub mod paths;
pub mod plan;
pub mod resolve;
pub mod template;

pub use error::{CaskError, Result, SourceLocation};
pub use manifest::{Livecheck, Manifest, Source, Uninstall, Zap, parse_all};
pub use paths::*;
pub use plan::{Action, Intent, Plan, PlanOptions, Verification, plan};
pub use resolve::{ResolvedManifest, resolve};

pub use cask_schema::{Arch, CaskToken, Checksum, LivecheckStrategy, Sha256Digest, Version};
