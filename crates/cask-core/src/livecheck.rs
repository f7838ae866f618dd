//! Extract candidate versions from livecheck feeds.
//!
//! Fetching the feed is left to a [`FeedReader`](crate::exec::FeedReader);
//! this module only interprets what came back. Nothing here mutates a
//! manifest: the caller decides whether to [`bump`](crate::bump) it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::paths::filename_from_url;
use cask_schema::{LivecheckStrategy, Version};

static VERSION_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)+(?:-\d+)?").expect("version pattern is valid"));

static SPARKLE_SHORT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"sparkle:shortVersionString\s*=\s*"([^"]+)"|<sparkle:shortVersionString>([^<]+)</"#)
        .expect("sparkle pattern is valid")
});

static SPARKLE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"sparkle:version\s*=\s*"([^"]+)"|<sparkle:version>([^<]+)</"#)
        .expect("sparkle pattern is valid")
});

/// What a feed request returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResponse {
    /// URL after following redirects.
    pub final_url: String,
    /// Response body (may be empty).
    pub body: String,
}

#[derive(Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
}

/// Strip a leading `v` from tags like `v2.2.0`.
fn normalize_tag(tag: &str) -> Option<Version> {
    let tag = tag.trim();
    let tag = match tag.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => tag,
    };
    (!tag.is_empty()).then(|| Version::new(tag))
}

fn github_latest(final_url: &str) -> Option<Version> {
    let (_, rest) = final_url.split_once("/releases/tag/")?;
    let tag = rest.split(['/', '?', '#']).next()?;
    normalize_tag(tag)
}

fn github_releases(body: &str) -> Option<Version> {
    let releases: Vec<GithubRelease> = serde_json::from_str(body).ok()?;
    releases
        .into_iter()
        .find(|r| !r.draft && !r.prerelease)
        .and_then(|r| normalize_tag(&r.tag_name))
}

/// Prefers the marketing version over the build number.
fn sparkle(body: &str) -> Option<Version> {
    let caps = SPARKLE_SHORT_VERSION
        .captures(body)
        .or_else(|| SPARKLE_VERSION.captures(body))?;
    let m = caps.iter().skip(1).flatten().next()?;
    normalize_tag(m.as_str())
}

fn first_version_like(s: &str) -> Option<Version> {
    VERSION_LIKE.find(s).map(|m| Version::new(m.as_str()))
}

/// Read a candidate version out of `feed` according to `strategy`.
///
/// Returns `None` when the feed does not contain a recognisable version or
/// the strategy is one this engine does not interpret.
pub fn extract_version(strategy: &LivecheckStrategy, feed: &FeedResponse) -> Option<Version> {
    let version = match strategy {
        LivecheckStrategy::GithubLatest => github_latest(&feed.final_url),
        LivecheckStrategy::GithubReleases => github_releases(&feed.body),
        LivecheckStrategy::Sparkle => sparkle(&feed.body),
        LivecheckStrategy::HeaderMatch => first_version_like(filename_from_url(&feed.final_url)),
        LivecheckStrategy::PageMatch => first_version_like(&feed.body),
        LivecheckStrategy::Other(_) => None,
    };
    debug!(%strategy, version = ?version, "extracted livecheck version");
    version
}

/// Returns `true` if `candidate` should replace `current`.
///
/// Uses [`Version`]'s ordering, so a `-N` packaging revision counts as newer
/// than the bare upstream version it was built from.
pub fn is_newer(current: &Version, candidate: &Version) -> bool {
    candidate > current
}
