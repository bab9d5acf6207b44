//! Executable lookup for completion and dispatch.
//!
//! Two scans share the same notion of "executable": [`find_candidates`]
//! enumerates every builtin and PATH entry matching a prefix for the completer,
//! while [`resolve_executable`] stops at the first PATH directory holding an
//! exact match, the way `execvp` would.

use crate::builtin::BUILTIN_NAMES;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Collect completion candidates for `prefix`.
///
/// Builtins come first in their fixed order, followed by executable basenames
/// from each `PATH` directory in left-to-right order. Within a directory the
/// order is whatever `read_dir` yields. Names found in several directories are
/// listed once per directory. At most `max` candidates are returned.
pub fn find_candidates(prefix: &str, search_paths: Option<&OsStr>, max: usize) -> Vec<String> {
    let mut matches: Vec<String> = BUILTIN_NAMES
        .iter()
        .filter(|name| name.starts_with(prefix))
        .take(max)
        .map(|name| name.to_string())
        .collect();

    for dir in path_dirs(search_paths) {
        if matches.len() >= max {
            break;
        }
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), %err, "skipping unreadable PATH entry");
                continue;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            if matches.len() >= max {
                debug!(max, "candidate cap reached");
                break;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(prefix) && is_executable(&entry.path()) {
                matches.push(name.to_string());
            }
        }
    }

    trace!(prefix, count = matches.len(), "collected completion candidates");
    matches
}

/// Resolve a command name to the executable that would run.
///
/// Behavior:
/// - A name containing `/` (absolute, `./foo`, `bin/foo`) is checked as-is.
/// - A bare name is searched in each `PATH` directory and the first
///   executable hit is returned; later directories are not examined.
/// - An empty name resolves to nothing.
pub fn resolve_executable(search_paths: Option<&OsStr>, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = Path::new(name);
        return is_executable(path).then(|| path.to_path_buf());
    }
    path_dirs(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Longest string that every candidate starts with.
///
/// Compared character by character up to the shortest candidate, so a
/// multi-byte character is never split.
pub fn longest_common_prefix<S: AsRef<str>>(candidates: &[S]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let first = first.as_ref();
    let mut end = first.len();
    for other in rest {
        let common: usize = first
            .chars()
            .zip(other.as_ref().chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        end = end.min(common);
    }
    first[..end].to_string()
}

/// Whether `path` names a non-directory the current user may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    !path.is_dir() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Split `PATH` on `:`; empty components are skipped rather than meaning ".".
fn path_dirs(search_paths: Option<&OsStr>) -> impl Iterator<Item = PathBuf> + '_ {
    search_paths
        .into_iter()
        .flat_map(|paths| std::env::split_paths(paths))
        .filter(|dir| !dir.as_os_str().is_empty())
}
