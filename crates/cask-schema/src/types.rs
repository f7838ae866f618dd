use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// Errors that can occur when validating a [`CaskToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is empty.
    #[error("Cask token must not be empty")]
    Empty,

    /// The token contains a character outside `[a-z0-9-+@.]`.
    #[error("Invalid character '{ch}' in cask token '{token}'")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// The rejected token.
        token: String,
    },
}

/// The unique identifier of a cask (`cask "postgres" do`).
///
/// Tokens are lowercase; they double as the file stem of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaskToken(String);

impl CaskToken {
    /// Create a new token, validating its character set.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the token is empty or contains characters
    /// other than lowercase ASCII letters, digits, `-`, `+`, `@` and `.`.
    pub fn new(s: &str) -> Result<Self, TokenError> {
        if s.is_empty() {
            return Err(TokenError::Empty);
        }
        if let Some(ch) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || "-+@.".contains(*c)))
        {
            return Err(TokenError::InvalidChar {
                ch,
                token: s.to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Return the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CaskToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for CaskToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for CaskToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for CaskToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for CaskToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A version string, substituted verbatim into templates.
///
/// Ordering compares dot-separated components numerically where they are
/// numbers. A `-N` suffix starting with a digit is a packaging revision and
/// sorts after the bare version (`2.8.2 < 2.8.2-17`); any other suffix is a
/// prerelease and sorts before it (`0.8.0-beta.1 < 0.8.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

/// One dot-separated component. Text sorts before numbers.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Text(&'a str),
    Number(u64),
}

fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> {
    s.split('.')
        .map(|p| p.parse::<u64>().map_or(Segment::Text(p), Segment::Number))
}

/// Missing trailing components count as zero, so `2.8 == 2.8.0` here.
fn cmp_segments(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (segments(a), segments(b));
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (x, y) => {
                let x = x.unwrap_or(Segment::Number(0));
                let y = y.unwrap_or(Segment::Number(0));
                match x.cmp(&y) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
        }
    }
}

/// 0 = prerelease, 1 = none, 2 = revision.
fn suffix_rank(suffix: Option<&str>) -> u8 {
    match suffix {
        None => 1,
        Some(r) if r.starts_with(|c: char| c.is_ascii_digit()) => 2,
        Some(_) => 0,
    }
}

fn split_suffix(v: &str) -> (&str, Option<&str>) {
    match v.split_once('-') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (v, None),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_base, a_suffix) = split_suffix(&self.0);
        let (b_base, b_suffix) = split_suffix(&other.0);
        cmp_segments(a_base, b_base)
            .then_with(|| suffix_rank(a_suffix).cmp(&suffix_rank(b_suffix)))
            .then_with(|| cmp_segments(a_suffix.unwrap_or(""), b_suffix.unwrap_or("")))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Version {
    /// Spelling used for `version :latest`.
    pub const LATEST: &'static str = "latest";

    /// Create a new version from the given string (stored as-is).
    pub fn new(v: &str) -> Self {
        Self(v.to_string())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `version :latest`, which has no fixed number.
    pub fn is_latest(&self) -> bool {
        self.0 == Self::LATEST
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How an external updater detects new upstream versions.
///
/// Written in manifests as a symbol: `strategy :github_latest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LivecheckStrategy {
    /// Follow the `releases/latest` redirect and read the tag.
    GithubLatest,
    /// Read the newest entry of the GitHub releases API.
    GithubReleases,
    /// Match a version-like token in a web page.
    PageMatch,
    /// Read the version from a redirected download filename.
    HeaderMatch,
    /// Read a Sparkle appcast feed.
    Sparkle,
    /// A strategy this engine does not interpret.
    Other(String),
}

impl LivecheckStrategy {
    /// Map a strategy symbol (without the leading colon) to a strategy.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "github_latest" => Self::GithubLatest,
            "github_releases" => Self::GithubReleases,
            "page_match" => Self::PageMatch,
            "header_match" => Self::HeaderMatch,
            "sparkle" => Self::Sparkle,
            other => Self::Other(other.to_string()),
        }
    }

    /// The symbol spelling of this strategy.
    pub fn as_symbol(&self) -> &str {
        match self {
            Self::GithubLatest => "github_latest",
            Self::GithubReleases => "github_releases",
            Self::PageMatch => "page_match",
            Self::HeaderMatch => "header_match",
            Self::Sparkle => "sparkle",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for LivecheckStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{}", self.as_symbol())
    }
}

impl Serialize for LivecheckStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_symbol())
    }
}

impl<'de> Deserialize<'de> for LivecheckStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_symbol(s.trim_start_matches(':')))
    }
}
