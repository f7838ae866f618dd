//! Variable resolution and architecture selection.
//!
//! Turns an unresolved [`Manifest`] into a [`ResolvedManifest`] for one
//! target architecture: exactly one source is selected and every template
//! token is substituted.

use serde::Serialize;
use tracing::debug;

use crate::error::{CaskError, Result, SourceLocation};
use crate::manifest::{Livecheck, Manifest, Source, Uninstall, Zap, check_app_name};
use crate::template;
use cask_schema::{Arch, CaskToken, Checksum, Version};

/// The source chosen for the target architecture, with its URL expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    /// Concrete download URL.
    pub url: String,
    /// Tag of the declaring block; `None` for an agnostic source.
    pub arch: Option<Arch>,
    /// Expected digest or the skip sentinel.
    pub checksum: Checksum,
}

/// A manifest bound to one architecture and version, free of templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedManifest {
    /// Cask name.
    pub token: CaskToken,
    /// Version that was substituted.
    pub version: Version,
    /// Target architecture.
    pub arch: Arch,
    /// Display names.
    pub name: Vec<String>,
    /// Description.
    pub desc: Option<String>,
    /// Homepage, expanded.
    pub homepage: Option<String>,
    /// The selected source.
    pub source: ResolvedSource,
    /// App bundle name, expanded.
    pub app: Option<String>,
    /// Uninstall directive, expanded.
    pub uninstall: Option<Uninstall>,
    /// Zap directive, expanded.
    pub zap: Option<Zap>,
    /// Livecheck directive, expanded.
    pub livecheck: Option<Livecheck>,
    /// Where the manifest was declared.
    pub location: SourceLocation,
}

impl ResolvedManifest {
    /// Re-express this record as a manifest with a single source.
    ///
    /// Resolving the result for the same architecture yields `self` again.
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            token: self.token.clone(),
            version: self.version.clone(),
            name: self.name.clone(),
            desc: self.desc.clone(),
            homepage: self.homepage.clone(),
            sources: vec![Source {
                url: self.source.url.clone(),
                arch: self.source.arch,
                checksum: self.source.checksum.clone(),
            }],
            app: self.app.clone(),
            uninstall: self.uninstall.clone(),
            zap: self.zap.clone(),
            livecheck: self.livecheck.clone(),
            location: self.location.clone(),
        }
    }
}

/// Pick the single source that applies to `arch`.
///
/// Sources tagged with `arch` win; agnostic sources are only considered when
/// no tagged source matches.
///
/// # Errors
///
/// Returns [`CaskError::NoMatchingSource`] unless exactly one candidate
/// remains.
pub fn select_source(manifest: &Manifest, arch: Arch) -> Result<&Source> {
    let tagged: Vec<&Source> = manifest
        .sources
        .iter()
        .filter(|s| s.arch == Some(arch))
        .collect();
    let candidates = if tagged.is_empty() {
        manifest
            .sources
            .iter()
            .filter(|s| s.arch.is_none())
            .collect()
    } else {
        tagged
    };

    match candidates.as_slice() {
        [only] => Ok(*only),
        _ => Err(CaskError::NoMatchingSource {
            token: manifest.token.clone(),
            arch,
            candidates: candidates.len(),
        }),
    }
}

struct Expander<'a> {
    token: &'a CaskToken,
    version: &'a Version,
}

impl Expander<'_> {
    fn expand(&self, field: &'static str, s: &str) -> Result<String> {
        template::expand(s, self.version).map_err(|variable| CaskError::UnresolvedTemplate {
            token: self.token.clone(),
            field,
            variable,
        })
    }

    fn expand_all(&self, field: &'static str, items: &[String]) -> Result<Vec<String>> {
        items.iter().map(|s| self.expand(field, s)).collect()
    }

    fn expand_opt(&self, field: &'static str, s: Option<&String>) -> Result<Option<String>> {
        s.map(|s| self.expand(field, s)).transpose()
    }
}

/// Resolve `manifest` for `arch`, optionally overriding its version.
///
/// The override replaces the declared version before substitution; the
/// declared checksum is kept as-is.
///
/// # Errors
///
/// Returns [`CaskError::NoMatchingSource`] if source selection fails, or
/// [`CaskError::UnresolvedTemplate`] if any field references an unknown
/// variable.
pub fn resolve(
    manifest: &Manifest,
    arch: Arch,
    version: Option<&Version>,
) -> Result<ResolvedManifest> {
    let source = select_source(manifest, arch)?;
    let version = version.unwrap_or(&manifest.version).clone();
    let x = Expander {
        token: &manifest.token,
        version: &version,
    };

    let resolved_source = ResolvedSource {
        url: x.expand("url", &source.url)?,
        arch: source.arch,
        checksum: source.checksum.clone(),
    };
    let uninstall = manifest
        .uninstall
        .as_ref()
        .map(|u| {
            Ok::<_, CaskError>(Uninstall {
                quit: x.expand_all("uninstall", &u.quit)?,
            })
        })
        .transpose()?;
    let zap = manifest
        .zap
        .as_ref()
        .map(|z| {
            Ok::<_, CaskError>(Zap {
                trash: x.expand_all("zap", &z.trash)?,
            })
        })
        .transpose()?;
    let livecheck = manifest
        .livecheck
        .as_ref()
        .map(|l| {
            Ok::<_, CaskError>(Livecheck {
                url: x.expand("livecheck", &l.url)?,
                strategy: l.strategy.clone(),
            })
        })
        .transpose()?;

    let app = x.expand_opt("app", manifest.app.as_ref())?;
    if let Some(app) = &app {
        check_app_name(app)
            .map_err(|reason| CaskError::malformed(manifest.location.clone(), reason))?;
    }

    debug!(
        cask = %manifest.token,
        %arch,
        %version,
        url = %resolved_source.url,
        "resolved manifest"
    );

    Ok(ResolvedManifest {
        token: manifest.token.clone(),
        arch,
        name: manifest.name.clone(),
        desc: manifest.desc.clone(),
        homepage: x.expand_opt("homepage", manifest.homepage.as_ref())?,
        app,
        source: resolved_source,
        uninstall,
        zap,
        livecheck,
        location: manifest.location.clone(),
        version,
    })
}
