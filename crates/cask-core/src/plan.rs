//! Action planning.
//!
//! A [`Plan`] is an ordered list of abstract [`Action`]s for one intent. The
//! planner never touches the filesystem, the network or other processes;
//! executing a plan is the job of a [`Runtime`](crate::exec::Runtime).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CaskError, Result};
use crate::resolve::ResolvedManifest;
use cask_schema::{Arch, CaskToken, Checksum, LivecheckStrategy, Sha256Digest, Version};

/// What the caller wants to do with a cask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Download, verify and copy the app.
    Install,
    /// Quit the app and remove the bundle.
    Uninstall,
    /// Uninstall, then remove user data.
    Zap,
    /// Look for a newer upstream version.
    Livecheck,
}

impl Intent {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Zap => "zap",
            Self::Livecheck => "livecheck",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "install" => Ok(Self::Install),
            "uninstall" | "remove" => Ok(Self::Uninstall),
            "zap" => Ok(Self::Zap),
            "livecheck" => Ok(Self::Livecheck),
            _ => Err(format!("Unknown intent: {s}")),
        }
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Download the artifact.
    Fetch {
        /// Concrete URL.
        url: String,
    },
    /// Compare the download against a digest.
    VerifyChecksum {
        /// Expected SHA-256.
        digest: Sha256Digest,
    },
    /// Mount the disk image or unpack the archive.
    MountOrExtract,
    /// Copy the app bundle out of the mounted volume.
    CopyArtifact {
        /// Bundle name inside the volume.
        artifact: String,
        /// Final location.
        destination: PathBuf,
    },
    /// Ask a running app to quit.
    TerminateProcess {
        /// Bundle identifier.
        bundle_id: String,
    },
    /// Delete the installed bundle.
    RemoveArtifact {
        /// Installed location.
        path: PathBuf,
    },
    /// Delete a zap path; `~` is left for the executor to expand.
    RemovePath {
        /// Path as declared.
        path: String,
    },
    /// Download the livecheck feed.
    FetchFeed {
        /// Feed URL.
        url: String,
    },
    /// Read a candidate version out of the feed.
    ExtractVersion {
        /// Strategy to apply.
        strategy: LivecheckStrategy,
    },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { url } => write!(f, "fetch {url}"),
            Self::VerifyChecksum { digest } => write!(f, "verify sha256 {digest}"),
            Self::MountOrExtract => write!(f, "mount or extract"),
            Self::CopyArtifact {
                artifact,
                destination,
            } => write!(f, "copy {artifact} -> {}", destination.display()),
            Self::TerminateProcess { bundle_id } => write!(f, "quit {bundle_id}"),
            Self::RemoveArtifact { path } => write!(f, "remove {}", path.display()),
            Self::RemovePath { path } => write!(f, "trash {path}"),
            Self::FetchFeed { url } => write!(f, "fetch feed {url}"),
            Self::ExtractVersion { strategy } => write!(f, "extract version using {strategy}"),
        }
    }
}

/// Whether an install plan checks the download's integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verification {
    /// A `VerifyChecksum` action is part of the plan.
    Verified {
        /// Expected SHA-256.
        digest: Sha256Digest,
    },
    /// The manifest declares `sha256 :no_check`.
    Skipped,
}

/// Severity of a [`PlanNote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    /// Informational.
    Info,
    /// Non-fatal but worth surfacing to the user.
    Warning,
}

/// A message attached to a plan for the caller to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanNote {
    /// Severity.
    pub level: NoteLevel,
    /// Text.
    pub message: String,
}

/// An ordered, not yet executed, list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Cask the plan applies to.
    pub token: CaskToken,
    /// Resolved version.
    pub version: Version,
    /// Target architecture.
    pub arch: Arch,
    /// What the plan does.
    pub intent: Intent,
    /// Steps, in execution order.
    pub actions: Vec<Action>,
    /// Set for install plans only.
    pub verification: Option<Verification>,
    /// Messages for the caller.
    pub notes: Vec<PlanNote>,
}

impl Plan {
    /// Returns `true` for install plans that verify their download.
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Some(Verification::Verified { .. }))
    }

    /// Returns `true` if any note is a warning.
    pub fn has_warnings(&self) -> bool {
        self.notes.iter().any(|n| n.level == NoteLevel::Warning)
    }
}

/// Knobs that affect where actions point.
///
/// The default honours `CASK_APPDIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Directory app bundles are copied into.
    pub appdir: PathBuf,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            appdir: crate::paths::appdir(),
        }
    }
}

fn uninstall_actions(resolved: &ResolvedManifest, options: &PlanOptions) -> Vec<Action> {
    let mut actions: Vec<Action> = resolved
        .uninstall
        .iter()
        .flat_map(|u| u.quit.iter())
        .map(|id| Action::TerminateProcess {
            bundle_id: id.clone(),
        })
        .collect();
    if let Some(app) = &resolved.app {
        actions.push(Action::RemoveArtifact {
            path: options.appdir.join(app),
        });
    }
    actions
}

/// Build the plan for `intent`.
///
/// # Errors
///
/// Returns [`CaskError::MissingArtifact`] when installing a cask without an
/// `app`, or [`CaskError::NoLivecheck`] when checking a cask without a
/// `livecheck` block.
pub fn plan(resolved: &ResolvedManifest, intent: Intent, options: &PlanOptions) -> Result<Plan> {
    let mut actions = Vec::new();
    let mut notes = Vec::new();
    let mut verification = None;

    match intent {
        Intent::Install => {
            let app = resolved
                .app
                .as_ref()
                .ok_or_else(|| CaskError::MissingArtifact(resolved.token.clone()))?;
            actions.push(Action::Fetch {
                url: resolved.source.url.clone(),
            });
            match &resolved.source.checksum {
                Checksum::Sha256(digest) => {
                    actions.push(Action::VerifyChecksum {
                        digest: digest.clone(),
                    });
                    verification = Some(Verification::Verified {
                        digest: digest.clone(),
                    });
                }
                Checksum::NoCheck => {
                    warn!(cask = %resolved.token, "install plan skips checksum verification");
                    notes.push(PlanNote {
                        level: NoteLevel::Warning,
                        message: format!(
                            "'{}' declares sha256 :no_check; the download will not be verified",
                            resolved.token
                        ),
                    });
                    verification = Some(Verification::Skipped);
                }
            }
            actions.push(Action::MountOrExtract);
            actions.push(Action::CopyArtifact {
                artifact: app.clone(),
                destination: options.appdir.join(app),
            });
        }
        Intent::Uninstall => actions = uninstall_actions(resolved, options),
        Intent::Zap => {
            actions = uninstall_actions(resolved, options);
            actions.extend(
                resolved
                    .zap
                    .iter()
                    .flat_map(|z| z.trash.iter())
                    .map(|p| Action::RemovePath { path: p.clone() }),
            );
            if resolved.zap.is_none() {
                notes.push(PlanNote {
                    level: NoteLevel::Info,
                    message: format!("'{}' declares no zap paths", resolved.token),
                });
            }
        }
        Intent::Livecheck => {
            let livecheck = resolved
                .livecheck
                .as_ref()
                .ok_or_else(|| CaskError::NoLivecheck(resolved.token.clone()))?;
            actions.push(Action::FetchFeed {
                url: livecheck.url.clone(),
            });
            actions.push(Action::ExtractVersion {
                strategy: livecheck.strategy.clone(),
            });
        }
    }

    debug!(cask = %resolved.token, %intent, actions = actions.len(), "planned");

    Ok(Plan {
        token: resolved.token.clone(),
        version: resolved.version.clone(),
        arch: resolved.arch,
        intent,
        actions,
        verification,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::manifest::fixtures::{MUFFON, POSTGRES, POSTGRES_ARM};
    use crate::resolve::resolve;

    fn resolved(text: &str, arch: Arch) -> ResolvedManifest {
        resolve(&Manifest::parse(text).unwrap(), arch, None).unwrap()
    }

    fn postgres_uninstall() -> Vec<Action> {
        vec![
            Action::TerminateProcess {
                bundle_id: "com.postgres.app".into(),
            },
            Action::RemoveArtifact {
                path: PathBuf::from("/Applications/Postgres"),
            },
        ]
    }

    #[test]
    fn install_with_digest_is_verified() {
        let r = resolved(MUFFON, Arch::Arm64);
        let p = plan(&r, Intent::Install, &PlanOptions::default()).unwrap();
        assert!(p.is_verified());
        assert!(!p.has_warnings());
        assert_eq!(p.actions.len(), 4);
        assert!(matches!(p.actions[0], Action::Fetch { .. }));
        assert!(matches!(p.actions[1], Action::VerifyChecksum { .. }));
        assert_eq!(p.actions[2], Action::MountOrExtract);
        assert_eq!(
            p.actions[3],
            Action::CopyArtifact {
                artifact: "muffon.app".into(),
                destination: PathBuf::from("/Applications/muffon.app"),
            }
        );
    }

    #[test]
    fn install_with_no_check_is_flagged() {
        let r = resolved(POSTGRES_ARM, Arch::Arm64);
        let p = plan(&r, Intent::Install, &PlanOptions::default()).unwrap();
        assert_eq!(p.verification, Some(Verification::Skipped));
        assert!(!p.is_verified());
        assert!(p.has_warnings());
        assert!(
            !p.actions
                .iter()
                .any(|a| matches!(a, Action::VerifyChecksum { .. }))
        );
        assert_eq!(p.actions.len(), 3);
    }

    #[test]
    fn uninstall_then_zap() {
        let r = resolved(POSTGRES, Arch::X86_64);
        let opts = PlanOptions::default();

        let uninstall = plan(&r, Intent::Uninstall, &opts).unwrap();
        assert_eq!(uninstall.actions, postgres_uninstall());
        assert_eq!(uninstall.verification, None);

        let zap = plan(&r, Intent::Zap, &opts).unwrap();
        let mut expected = postgres_uninstall();
        expected.extend(
            [
                "~/Library/Application Support/Postgres",
                "~/Library/Caches/com.postgres",
                "~/Library/Preferences/com.postgres.plist",
                "~/Library/Saved Application State/com.postgres.savedState",
            ]
            .map(|p| Action::RemovePath { path: p.into() }),
        );
        assert_eq!(zap.actions, expected);
    }

    #[test]
    fn appdir_is_configurable() {
        let r = resolved(POSTGRES, Arch::Arm64);
        let opts = PlanOptions {
            appdir: PathBuf::from("/Users/me/Applications"),
        };
        let p = plan(&r, Intent::Uninstall, &opts).unwrap();
        assert_eq!(
            p.actions[1],
            Action::RemoveArtifact {
                path: PathBuf::from("/Users/me/Applications/Postgres"),
            }
        );
    }

    #[test]
    fn livecheck_plan() {
        let r = resolved(MUFFON, Arch::X86_64);
        let p = plan(&r, Intent::Livecheck, &PlanOptions::default()).unwrap();
        assert_eq!(
            p.actions,
            vec![
                Action::FetchFeed {
                    url: "https://github.com/staniel359/muffon/releases/latest".into(),
                },
                Action::ExtractVersion {
                    strategy: LivecheckStrategy::GithubLatest,
                },
            ]
        );
    }

    #[test]
    fn missing_livecheck_and_app() {
        let mut r = resolved(MUFFON, Arch::Arm64);
        r.livecheck = None;
        r.app = None;
        let opts = PlanOptions::default();
        assert!(matches!(
            plan(&r, Intent::Livecheck, &opts),
            Err(CaskError::NoLivecheck(_))
        ));
        assert!(matches!(
            plan(&r, Intent::Install, &opts),
            Err(CaskError::MissingArtifact(_))
        ));
        // uninstall still terminates the process
        let p = plan(&r, Intent::Uninstall, &opts).unwrap();
        assert_eq!(p.actions.len(), 1);
    }

    #[test]
    fn zap_without_paths_is_uninstall() {
        let mut r = resolved(POSTGRES, Arch::Arm64);
        r.zap = None;
        let p = plan(&r, Intent::Zap, &PlanOptions::default()).unwrap();
        assert_eq!(p.actions, postgres_uninstall());
        assert_eq!(p.notes[0].level, NoteLevel::Info);
    }

    #[test]
    fn intent_from_str() {
        assert_eq!("ZAP".parse::<Intent>(), Ok(Intent::Zap));
        assert_eq!("remove".parse::<Intent>(), Ok(Intent::Uninstall));
        assert!("upgrade".parse::<Intent>().is_err());
    }

    #[test]
    fn plan_serializes_with_tags() {
        let r = resolved(POSTGRES, Arch::Arm64);
        let p = plan(&r, Intent::Uninstall, &PlanOptions::default()).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["intent"], "uninstall");
        assert_eq!(json["actions"][0]["action"], "terminate_process");
        assert_eq!(json["actions"][0]["bundle_id"], "com.postgres.app");
    }
}
