use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::NO_CHECK;

/// Errors produced when validating a digest string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The hex portion is not exactly 64 characters long.
    #[error("Invalid SHA256 digest: expected 64 hex characters, got {len} in '{value}'")]
    Length {
        /// Length of the offending hex portion.
        len: usize,
        /// The rejected input.
        value: String,
    },

    /// The hex portion contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// A validated SHA256 digest (64 hex characters)
///
/// This newtype ensures that every digest carried by a manifest or a plan is
/// validated at construction time, preventing invalid hex strings from
/// propagating through the codebase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest` from bare hex, validating the input.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();

        if s.len() != 64 {
            return Err(DigestError::Length {
                len: s.len(),
                value: s,
            });
        }

        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s));
        }

        Ok(Self(s.to_lowercase()))
    }

    /// Like [`new`](Self::new), but also accepts a `sha256:` prefix as found
    /// in serialized plans and reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the hex portion is not exactly 64 ASCII hex characters.
    pub fn from_prefixed(s: &str) -> Result<Self, DigestError> {
        Self::new(s.strip_prefix("sha256:").unwrap_or(s))
    }

    /// Compute the SHA256 digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Compute the SHA256 digest of a file, streaming it through the hasher.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn compute_file(path: &std::path::Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_prefixed(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Integrity expectation declared by a `sha256` stanza.
///
/// `NoCheck` is the sentinel that disables verification. It is a distinct
/// variant rather than an empty digest so that callers must handle the
/// unverified path explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Checksum {
    /// Verify the download against this digest.
    Sha256(Sha256Digest),
    /// Skip verification (`sha256 :no_check`).
    NoCheck,
}

impl Checksum {
    /// Parse a checksum value as written in a manifest: bare hex or the
    /// `no_check` sentinel.
    ///
    /// # Errors
    ///
    /// Returns a [`DigestError`] if the value is neither the sentinel nor a
    /// well-formed digest.
    pub fn parse(s: &str) -> Result<Self, DigestError> {
        if s == NO_CHECK {
            Ok(Self::NoCheck)
        } else {
            Sha256Digest::new(s).map(Self::Sha256)
        }
    }

    /// The digest to verify against, if any.
    pub fn digest(&self) -> Option<&Sha256Digest> {
        match self {
            Self::Sha256(d) => Some(d),
            Self::NoCheck => None,
        }
    }

    /// Returns `true` for the skip-verification sentinel.
    pub fn is_no_check(&self) -> bool {
        matches!(self, Self::NoCheck)
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256(d) => write!(f, "{d}"),
            Self::NoCheck => write!(f, "{NO_CHECK}"),
        }
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == NO_CHECK {
            return Ok(Self::NoCheck);
        }
        Sha256Digest::from_prefixed(&s)
            .map(Self::Sha256)
            .map_err(serde::de::Error::custom)
    }
}
