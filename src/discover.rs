//! FileSet discovery: every file under `<root>/<dir>` with a given extension.
//!
//! Mirrors `<dir>/**/*.<ext>` shell-glob semantics: recursive, hidden files
//! and directories skipped, symlinked files and directories included. A
//! symlink that loops back to one of its ancestors is skipped. A missing
//! directory is an empty set.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_SOURCE_DIR: &str = "lib";
pub const DEFAULT_EXTENSION: &str = "dart";

#[derive(Error, Debug)]
#[error("failed to walk {path}: {source}")]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// Files selected for one batch pass, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Walk `root/dir` and collect files whose extension is `extension`.
    pub fn discover(
        root: impl AsRef<Path>,
        dir: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Self, DiscoveryError> {
        let base = root.as_ref().join(dir.as_ref());
        let extension = extension.trim_start_matches('.');

        let mut paths = Vec::new();
        if base.is_dir() {
            let walker = WalkDir::new(&base)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) if err.loop_ancestor().is_some() => continue,
                    Err(source) => {
                        return Err(DiscoveryError {
                            path: base.clone(),
                            source,
                        })
                    }
                };
                // With links followed, the file type is the target's.
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|s| s.to_str()) == Some(extension)
                {
                    paths.push(entry.into_path());
                }
            }
        }

        paths.sort();
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
