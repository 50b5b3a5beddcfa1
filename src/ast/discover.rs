//! Source-file discovery.
//!
//! A root argument names a directory of Go sources; a trailing `...`
//! requests recursion into subdirectories, mirroring the Go toolchain's
//! package-path convention. Test files are not analyzed.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::Error;

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Resolve a root argument into the sorted list of Go files to analyze.
///
/// Sorting keeps the finding order stable across runs over the same input.
pub fn discover(root: &str) -> Result<Vec<PathBuf>, Error> {
    let (dir, recursive) = match root.strip_suffix("...") {
        Some(stripped) => (stripped, true),
        None => (root, false),
    };
    let dir = if dir.is_empty() { "." } else { dir };

    let mut files = Vec::new();
    if recursive {
        for entry in WalkDir::new(dir) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_go_source(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => warn!("skipping unreadable entry under {dir}: {err}"),
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_go_source(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
