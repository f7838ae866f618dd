use dirs::home_dir;
use std::path::PathBuf;

/// Default destination for `.app` bundles.
pub const DEFAULT_APPDIR: &str = "/Applications";

/// Environment variable overriding [`DEFAULT_APPDIR`].
pub const APPDIR_ENV: &str = "CASK_APPDIR";

/// Returns the applications directory, honouring `CASK_APPDIR`.
pub fn appdir() -> PathBuf {
    match std::env::var(APPDIR_ENV) {
        Ok(val) if !val.is_empty() => PathBuf::from(val),
        _ => PathBuf::from(DEFAULT_APPDIR),
    }
}

/// Expand a leading `~` against `home`.
///
/// Paths that do not start with `~/` (or are not exactly `~`) are returned
/// unchanged.
pub fn expand_home_with(path: &str, home: &std::path::Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Expand a leading `~` against the current user's home directory.
///
/// Returns the path unchanged if the home directory cannot be resolved.
pub fn expand_home(path: &str) -> PathBuf {
    match home_dir() {
        Some(home) => expand_home_with(path, &home),
        None => PathBuf::from(path),
    }
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.split('/').next_back().unwrap_or("")
}
