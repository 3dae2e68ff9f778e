//! Filename resolution against an ordered list of search directories.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Resolve `filename` against `search_dirs`.
///
/// Returns the effective path and whether it exists:
///
/// 1. An empty name is never found and is returned unchanged.
/// 2. Environment variables (`$VAR`, `${VAR}`) are expanded first.
/// 3. An absolute name is checked directly without scanning.
/// 4. Otherwise the first directory (in insertion order) containing the file
///    wins; if none does, the expanded name is returned with `false`.
pub fn resolve(filename: &str, search_dirs: &[PathBuf]) -> (PathBuf, bool) {
    resolve_with(filename, search_dirs, process_env)
}

/// [`resolve`] with variables looked up through `lookup` instead of the
/// process environment.
pub fn resolve_with<F>(filename: &str, search_dirs: &[PathBuf], lookup: F) -> (PathBuf, bool)
where
    F: FnMut(&str) -> Option<String>,
{
    if filename.is_empty() {
        return (PathBuf::from(filename), false);
    }

    let expanded = PathBuf::from(expand_with(filename, lookup));

    if expanded.is_absolute() {
        let found = file_exists(&expanded);
        trace!(path = %expanded.display(), found, "absolute path checked");
        return (expanded, found);
    }

    for dir in search_dirs {
        let candidate = dir.join(&expanded);
        if file_exists(&candidate) {
            trace!(path = %candidate.display(), "resolved in search path");
            return (candidate, true);
        }
        trace!(path = %candidate.display(), "not present");
    }

    (expanded, false)
}

/// Expand `$VAR` and `${VAR}` references. Unset variables expand to "".
pub fn expand_env(input: &str) -> String {
    expand_with(input, process_env)
}

/// Expand variables resolved by `lookup`. Names it returns `None` for
/// expand to "".
pub fn expand_with<F>(input: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    shellexpand::env_with_context_no_errors(input, |var| Some(lookup(var).unwrap_or_default()))
        .into_owned()
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn file_exists(path: &Path) -> bool {
    // Permission errors and the like count as missing, same as NotFound.
    std::fs::metadata(path).is_ok()
}
