//! Regenerate a manifest at a new version.
//!
//! Only the `version` stanza line is rewritten; everything else, including
//! comments and formatting, is preserved byte for byte.

use crate::error::{CaskError, Result};
use crate::manifest::Manifest;
use cask_schema::Version;

/// Rewrite the `version "..."` stanza of `content` to `new_version`.
///
/// The result is re-parsed so a bump can never produce an invalid manifest.
///
/// # Errors
///
/// Returns [`CaskError::MalformedManifest`] if `content` declares
/// `version :latest` or has no single string `version` stanza, if
/// `new_version` cannot be written as a plain string literal, or if the
/// bumped text does not parse back to `new_version`.
pub fn bump_version(content: &str, new_version: &Version) -> Result<String> {
    let manifest = Manifest::parse(content)?;

    if manifest.version.is_latest() {
        return Err(CaskError::malformed(
            manifest.location,
            format!("'{}' tracks version :latest and cannot be bumped", manifest.token),
        ));
    }
    if new_version.is_empty()
        || new_version
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(CaskError::malformed(
            manifest.location,
            format!("version {:?} cannot be written into a manifest", new_version.as_str()),
        ));
    }

    let mut out = String::with_capacity(content.len() + new_version.len());
    let mut replaced = 0;
    for line in content.split_inclusive('\n') {
        let indent_len = line.len() - line.trim_start().len();
        let body = &line[indent_len..];
        if let Some(rest) = body.strip_prefix("version") {
            let rest_trimmed = rest.trim_start();
            if rest.len() != rest_trimmed.len() && rest_trimmed.starts_with('"') {
                let ending = &line[line.trim_end_matches(['\r', '\n']).len()..];
                let tail = rest_trimmed[1..]
                    .find('"')
                    .map_or("", |end| &rest_trimmed[end + 2..]);
                out.push_str(&line[..indent_len]);
                out.push_str(&format!("version \"{new_version}\""));
                out.push_str(tail.trim_end_matches(['\r', '\n']));
                out.push_str(ending);
                replaced += 1;
                continue;
            }
        }
        out.push_str(line);
    }

    if replaced != 1 {
        return Err(CaskError::malformed(
            manifest.location,
            format!("expected one string version stanza, found {replaced}"),
        ));
    }

    let bumped = Manifest::parse(&out).map_err(|e| match e {
        CaskError::MalformedManifest { reason, .. } => CaskError::malformed(
            manifest.location.clone(),
            format!("bumped manifest is invalid: {reason}"),
        ),
        other => other,
    })?;
    if bumped.version != *new_version {
        return Err(CaskError::malformed(
            manifest.location,
            format!("bumped manifest reads back version '{}'", bumped.version),
        ));
    }
    Ok(out)
}
