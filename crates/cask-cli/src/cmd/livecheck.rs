//! Livecheck extraction command

use anyhow::{Context, Result, bail};
use cask_core::exec::{
    CollaboratorError, Digester, FeedReader, FileSystem, Fetcher, ProcessControl, Sha256Digester,
    drive,
};
use cask_core::livecheck::{FeedResponse, is_newer};
use cask_core::{Intent, PlanOptions, plan, resolve};
use cask_schema::Arch;
use std::path::{Path, PathBuf};

use crate::ui::Output;

/// Runtime that answers feed requests with a response captured earlier and
/// refuses everything else.
#[derive(Debug)]
struct CapturedFeed {
    response: FeedResponse,
}

fn offline(what: &str) -> CollaboratorError {
    format!("{what} is not available offline").into()
}

impl Fetcher for CapturedFeed {
    fn fetch(&mut self, _url: &str) -> Result<Vec<u8>, CollaboratorError> {
        Err(offline("download"))
    }
}

impl Digester for CapturedFeed {
    fn sha256(&self, bytes: &[u8]) -> String {
        Sha256Digester.sha256(bytes)
    }
}

impl FileSystem for CapturedFeed {
    fn mount(&mut self, _image: &[u8]) -> Result<PathBuf, CollaboratorError> {
        Err(offline("mount"))
    }
    fn copy(&mut self, _src: &Path, _dst: &Path) -> Result<(), CollaboratorError> {
        Err(offline("copy"))
    }
    fn remove(&mut self, _path: &Path) -> Result<(), CollaboratorError> {
        Err(offline("remove"))
    }
}

impl ProcessControl for CapturedFeed {
    fn terminate_by_bundle_id(&mut self, _bundle_id: &str) -> bool {
        false
    }
}

impl FeedReader for CapturedFeed {
    fn fetch_feed(&mut self, _url: &str) -> Result<FeedResponse, CollaboratorError> {
        Ok(self.response.clone())
    }
}

/// Run the livecheck plan against a feed the caller already fetched.
pub fn extract(path: &Path, final_url: &str, body: Option<&Path>) -> Result<()> {
    let manifest = super::load(path)?;
    // feeds are architecture independent; any installable arch will do
    let arches = manifest.supported_arches();
    let arch = if arches.contains(&Arch::current()) {
        Arch::current()
    } else {
        arches.first().copied().unwrap_or_else(Arch::current)
    };
    let resolved = resolve(&manifest, arch, None)?;
    let plan = plan(&resolved, Intent::Livecheck, &PlanOptions::default())?;

    let body = match body {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display()))?,
        None => String::new(),
    };
    let mut runtime = CapturedFeed {
        response: FeedResponse {
            final_url: final_url.to_string(),
            body,
        },
    };
    let outcome = drive(&plan, &mut runtime)?;

    let output = Output::new();
    match outcome.candidate_version {
        Some(candidate) if is_newer(&manifest.version, &candidate) => {
            output.success(&format!(
                "{} {} -> {candidate}",
                manifest.token, manifest.version
            ));
        }
        Some(candidate) => {
            output.info(&format!("{} is up to date ({candidate})", manifest.token));
        }
        None => bail!("No version found in the feed for {}", manifest.token),
    }
    Ok(())
}
