//! `#{...}` template expansion.
//!
//! The only variable is `version`; it is replaced by the version string
//! verbatim. Anything else is reported back to the caller, which turns it
//! into [`CaskError::UnresolvedTemplate`](crate::CaskError::UnresolvedTemplate).

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use cask_schema::Version;

static TEMPLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{([^}]*)\}").expect("template token pattern is valid"));

/// Name of the single variable manifests may interpolate.
pub const VERSION_VAR: &str = "version";

/// Variable names referenced by `template`, in order of appearance.
pub fn variables(template: &str) -> impl Iterator<Item = &str> {
    TEMPLATE_TOKEN
        .captures_iter(template)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Returns `true` if `s` still contains a `#{...}` token.
pub fn has_template(s: &str) -> bool {
    TEMPLATE_TOKEN.is_match(s)
}

/// Substitute `#{version}` in `template`.
///
/// Text without tokens is returned unchanged.
///
/// # Errors
///
/// Returns the name of the first variable that is unknown, or that is still
/// present after substitution (a version string that itself contains a
/// token).
pub fn expand(template: &str, version: &Version) -> Result<String, String> {
    if !has_template(template) {
        return Ok(template.to_string());
    }
    if let Some(unknown) = variables(template).find(|v| *v != VERSION_VAR) {
        return Err(unknown.to_string());
    }
    let expanded = TEMPLATE_TOKEN
        .replace_all(template, NoExpand(version.as_str()))
        .into_owned();
    if let Some(left) = variables(&expanded).next() {
        return Err(left.to_string());
    }
    Ok(expanded)
}
