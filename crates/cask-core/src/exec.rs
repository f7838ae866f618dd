//! Collaborator interfaces and the plan driver.
//!
//! The engine does not download, mount, copy or kill anything itself. An
//! executor supplies those capabilities through the traits below and hands
//! them to [`drive`], which walks a [`Plan`] in order and stops at the first
//! failure.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CaskError, Result};
use crate::livecheck::{FeedResponse, extract_version};
use crate::plan::{Action, Intent, Plan, Verification};
use cask_schema::{CaskToken, Sha256Digest, Version};

/// Error type returned by collaborators.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Network download capability.
pub trait Fetcher {
    /// Download `url` in full.
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// Digest capability.
pub trait Digester {
    /// Lowercase hex SHA-256 of `bytes`.
    fn sha256(&self, bytes: &[u8]) -> String;
}

/// Filesystem capability.
pub trait FileSystem {
    /// Mount or unpack a downloaded image; returns the volume root.
    fn mount(&mut self, image: &[u8]) -> Result<PathBuf, CollaboratorError>;
    /// Copy `src` to `dst`, recursively for bundles.
    fn copy(&mut self, src: &Path, dst: &Path) -> Result<(), CollaboratorError>;
    /// Delete `path`. Paths may start with `~`, which the implementor expands.
    fn remove(&mut self, path: &Path) -> Result<(), CollaboratorError>;
}

/// Process capability.
pub trait ProcessControl {
    /// Ask the app with `bundle_id` to quit. Returns `false` if it was not
    /// running.
    fn terminate_by_bundle_id(&mut self, bundle_id: &str) -> bool;
}

/// Livecheck feed capability.
pub trait FeedReader {
    /// Fetch `url`, following redirects.
    fn fetch_feed(&mut self, url: &str) -> Result<FeedResponse, CollaboratorError>;
}

/// Everything [`drive`] needs.
pub trait Runtime: Fetcher + Digester + FileSystem + ProcessControl + FeedReader {}

impl<T: Fetcher + Digester + FileSystem + ProcessControl + FeedReader> Runtime for T {}

/// [`Digester`] backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn sha256(&self, bytes: &[u8]) -> String {
        Sha256Digest::compute(bytes).to_string()
    }
}

/// What happened while driving a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Cask the plan applied to.
    pub token: CaskToken,
    /// Intent of the plan.
    pub intent: Intent,
    /// Number of actions run to completion.
    pub executed: usize,
    /// For installs: whether the download was checked.
    pub verification: Option<Verification>,
    /// Bundle ids that were not running when asked to quit.
    pub not_running: Vec<String>,
    /// For livechecks: the version found in the feed.
    pub candidate_version: Option<Version>,
}

/// Compare a digest reported for a download against the plan's expectation.
///
/// Install plans flagged [`Verification::Skipped`] accept any digest.
///
/// # Errors
///
/// Returns [`CaskError::ChecksumMismatch`] if the plan expects a different
/// digest.
pub fn verify_download(plan: &Plan, actual: &str) -> Result<Verification> {
    match &plan.verification {
        Some(Verification::Verified { digest }) => {
            if digest.as_str().eq_ignore_ascii_case(actual) {
                Ok(Verification::Verified {
                    digest: digest.clone(),
                })
            } else {
                Err(CaskError::ChecksumMismatch {
                    token: plan.token.clone(),
                    expected: digest.clone(),
                    actual: actual.to_string(),
                })
            }
        }
        _ => Ok(Verification::Skipped),
    }
}

fn collaborator(action: &'static str) -> impl FnOnce(CollaboratorError) -> CaskError {
    move |e| CaskError::Collaborator {
        action,
        message: e.to_string(),
    }
}

fn out_of_order(action: &'static str, missing: &str) -> CaskError {
    CaskError::Collaborator {
        action,
        message: format!("plan has no {missing} before this step"),
    }
}

/// Execute `plan` against `runtime`, in order, stopping at the first error.
///
/// # Errors
///
/// Returns [`CaskError::ChecksumMismatch`] when a download does not match,
/// or [`CaskError::Collaborator`] when a collaborator fails or the plan is
/// out of order.
pub fn drive<R: Runtime + ?Sized>(plan: &Plan, runtime: &mut R) -> Result<Outcome> {
    let mut download: Option<Vec<u8>> = None;
    let mut volume: Option<PathBuf> = None;
    let mut feed: Option<FeedResponse> = None;
    let mut outcome = Outcome {
        token: plan.token.clone(),
        intent: plan.intent,
        executed: 0,
        verification: plan.verification.clone(),
        not_running: Vec::new(),
        candidate_version: None,
    };

    for action in &plan.actions {
        info!(cask = %plan.token, %action, "executing");
        match action {
            Action::Fetch { url } => {
                download = Some(runtime.fetch(url).map_err(collaborator("fetch"))?);
            }
            Action::VerifyChecksum { .. } => {
                let bytes = download
                    .as_deref()
                    .ok_or_else(|| out_of_order("verify", "download"))?;
                let actual = runtime.sha256(bytes);
                outcome.verification = Some(verify_download(plan, &actual)?);
            }
            Action::MountOrExtract => {
                let bytes = download
                    .as_deref()
                    .ok_or_else(|| out_of_order("mount", "download"))?;
                volume = Some(runtime.mount(bytes).map_err(collaborator("mount"))?);
            }
            Action::CopyArtifact {
                artifact,
                destination,
            } => {
                let root = volume
                    .as_ref()
                    .ok_or_else(|| out_of_order("copy", "mounted volume"))?;
                runtime
                    .copy(&root.join(artifact), destination)
                    .map_err(collaborator("copy"))?;
            }
            Action::TerminateProcess { bundle_id } => {
                if !runtime.terminate_by_bundle_id(bundle_id) {
                    debug!(%bundle_id, "not running");
                    outcome.not_running.push(bundle_id.clone());
                }
            }
            Action::RemoveArtifact { path } => {
                runtime.remove(path).map_err(collaborator("remove"))?;
            }
            Action::RemovePath { path } => {
                runtime
                    .remove(Path::new(path))
                    .map_err(collaborator("trash"))?;
            }
            Action::FetchFeed { url } => {
                feed = Some(runtime.fetch_feed(url).map_err(collaborator("fetch feed"))?);
            }
            Action::ExtractVersion { strategy } => {
                let response = feed
                    .as_ref()
                    .ok_or_else(|| out_of_order("extract version", "feed"))?;
                outcome.candidate_version = extract_version(strategy, response);
            }
        }
        outcome.executed += 1;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::manifest::fixtures::{MUFFON, POSTGRES, POSTGRES_ARM};
    use crate::plan::{PlanOptions, plan};
    use crate::resolve::resolve;
    use cask_schema::Arch;

    /// Records every call; fails `fetch` when `fail_fetch` is set.
    #[derive(Default)]
    struct Recorder {
        payload: Vec<u8>,
        fail_fetch: bool,
        running: Vec<String>,
        calls: Vec<String>,
    }

    impl Fetcher for Recorder {
        fn fetch(&mut self, url: &str) -> Result<Vec<u8>, CollaboratorError> {
            self.calls.push(format!("fetch {url}"));
            if self.fail_fetch {
                return Err("connection reset".into());
            }
            Ok(self.payload.clone())
        }
    }

    impl Digester for Recorder {
        fn sha256(&self, bytes: &[u8]) -> String {
            Sha256Digester.sha256(bytes)
        }
    }

    impl FileSystem for Recorder {
        fn mount(&mut self, _image: &[u8]) -> Result<PathBuf, CollaboratorError> {
            self.calls.push("mount".into());
            Ok(PathBuf::from("/Volumes/cask"))
        }
        fn copy(&mut self, src: &Path, dst: &Path) -> Result<(), CollaboratorError> {
            self.calls
                .push(format!("copy {} {}", src.display(), dst.display()));
            Ok(())
        }
        fn remove(&mut self, path: &Path) -> Result<(), CollaboratorError> {
            self.calls.push(format!("remove {}", path.display()));
            Ok(())
        }
    }

    impl ProcessControl for Recorder {
        fn terminate_by_bundle_id(&mut self, bundle_id: &str) -> bool {
            self.calls.push(format!("quit {bundle_id}"));
            self.running.iter().any(|r| r == bundle_id)
        }
    }

    impl FeedReader for Recorder {
        fn fetch_feed(&mut self, url: &str) -> Result<FeedResponse, CollaboratorError> {
            self.calls.push(format!("feed {url}"));
            Ok(FeedResponse {
                final_url: "https://github.com/staniel359/muffon/releases/tag/v2.4.1".into(),
                body: String::new(),
            })
        }
    }

    fn install_plan_for(payload: &[u8]) -> Plan {
        let text = MUFFON.replace(
            "07e19ac200a52be219ced7e0fc7ecf2ab89aa5afef95708433b48e0286aa690f",
            Sha256Digest::compute(payload).as_str(),
        );
        let r = resolve(&Manifest::parse(&text).unwrap(), Arch::Arm64, None).unwrap();
        plan(&r, Intent::Install, &PlanOptions::default()).unwrap()
    }

    #[test]
    fn verified_install_runs_every_step() {
        let p = install_plan_for(b"dmg payload");
        let mut rt = Recorder {
            payload: b"dmg payload".to_vec(),
            ..Recorder::default()
        };
        let outcome = drive(&p, &mut rt).unwrap();
        assert_eq!(outcome.executed, 4);
        assert!(matches!(
            outcome.verification,
            Some(Verification::Verified { .. })
        ));
        assert_eq!(
            rt.calls.last().unwrap(),
            "copy /Volumes/cask/muffon.app /Applications/muffon.app"
        );
    }

    #[test]
    fn mismatch_stops_before_mount() {
        let p = install_plan_for(b"expected");
        let mut rt = Recorder {
            payload: b"tampered".to_vec(),
            ..Recorder::default()
        };
        let err = drive(&p, &mut rt).unwrap_err();
        assert!(matches!(err, CaskError::ChecksumMismatch { .. }));
        assert!(!rt.calls.iter().any(|c| c == "mount"));
    }

    #[test]
    fn skipped_verification_is_reported() {
        let r = resolve(&Manifest::parse(POSTGRES_ARM).unwrap(), Arch::Arm64, None).unwrap();
        let p = plan(&r, Intent::Install, &PlanOptions::default()).unwrap();
        let mut rt = Recorder::default();
        let outcome = drive(&p, &mut rt).unwrap();
        assert_eq!(outcome.verification, Some(Verification::Skipped));
    }

    #[test]
    fn fetch_failure_is_fail_fast() {
        let p = install_plan_for(b"x");
        let mut rt = Recorder {
            fail_fetch: true,
            ..Recorder::default()
        };
        let err = drive(&p, &mut rt).unwrap_err();
        assert_eq!(err.to_string(), "fetch failed: connection reset");
        assert_eq!(rt.calls.len(), 1);
    }

    #[test]
    fn zap_records_not_running_apps() {
        let r = resolve(&Manifest::parse(POSTGRES).unwrap(), Arch::X86_64, None).unwrap();
        let p = plan(&r, Intent::Zap, &PlanOptions::default()).unwrap();
        let mut rt = Recorder::default();
        let outcome = drive(&p, &mut rt).unwrap();
        assert_eq!(outcome.not_running, vec!["com.postgres.app"]);
        assert_eq!(outcome.executed, 6);
        assert_eq!(rt.calls[2], "remove ~/Library/Application Support/Postgres");
    }

    #[test]
    fn livecheck_yields_candidate() {
        let r = resolve(&Manifest::parse(MUFFON).unwrap(), Arch::Arm64, None).unwrap();
        let p = plan(&r, Intent::Livecheck, &PlanOptions::default()).unwrap();
        let outcome = drive(&p, &mut Recorder::default()).unwrap();
        assert_eq!(outcome.candidate_version, Some(Version::new("2.4.1")));
    }

    #[test]
    fn out_of_order_plan_is_rejected() {
        let mut p = install_plan_for(b"x");
        p.actions.remove(0);
        let err = drive(&p, &mut Recorder::default()).unwrap_err();
        assert!(err.to_string().contains("no download"));
    }
}
