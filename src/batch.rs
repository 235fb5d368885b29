//! Batch driver: discover the FileSet, rewrite each file, report.
//!
//! Files are processed one at a time in sorted order with no shared state
//! between them.

use crate::discover::{DiscoveryError, FileSet, DEFAULT_EXTENSION, DEFAULT_SOURCE_DIR};
use crate::document::{read_document, write_document, FileAccessError};
use crate::rewrite::{apply_rules, RewriteError, RuleHit};
use crate::rules::RuleSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// When a visited file is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Overwrite every visited file, even if no rule fired.
    #[default]
    Always,
    /// Only write files whose content changed.
    OnChange,
}

/// What a file-level error does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first error.
    #[default]
    Abort,
    /// Record the error and move on to the next file.
    Continue,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory under the root to search, `lib` by default
    pub source_dir: PathBuf,
    /// File extension without the dot, `dart` by default
    pub extension: String,
    pub write_policy: WritePolicy,
    pub failure_policy: FailurePolicy,
    /// Compute outcomes without touching any file
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            write_policy: WritePolicy::default(),
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    #[error("failed to rewrite {path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },
}

/// Per-file result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Rewritten text differs from the original
    pub changed: bool,
    /// File was written back
    pub written: bool,
    pub hits: Vec<RuleHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one batch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Files discovered and visited (including failed ones)
    pub visited: usize,
    pub changed: usize,
    pub written: usize,
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum FileEvent<'a> {
    /// About to read the file
    Started { path: &'a Path },
    /// File processed (and written, unless dry run or unchanged under `OnChange`)
    Finished {
        outcome: &'a FileOutcome,
        before: &'a str,
        after: &'a str,
    },
    /// File failed under [`FailurePolicy::Continue`]
    Failed { path: &'a Path, error: &'a BatchError },
}

/// Run a batch pass over `root` with default reporting.
pub fn run(
    root: impl AsRef<Path>,
    rules: &RuleSet,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    run_with(root, rules, options, |_| {})
}

/// Run a batch pass, calling `on_event` as each file progresses.
pub fn run_with<F>(
    root: impl AsRef<Path>,
    rules: &RuleSet,
    options: &BatchOptions,
    mut on_event: F,
) -> Result<BatchReport, BatchError>
where
    F: FnMut(FileEvent<'_>),
{
    let files = FileSet::discover(root, &options.source_dir, &options.extension)?;

    let mut report = BatchReport {
        visited: files.len(),
        dry_run: options.dry_run,
        ..BatchReport::default()
    };

    for path in files.paths() {
        on_event(FileEvent::Started { path });

        match process_file(path, rules, options) {
            Ok(processed) => {
                on_event(FileEvent::Finished {
                    outcome: &processed.outcome,
                    before: &processed.before,
                    after: &processed.after,
                });
                if processed.outcome.changed {
                    report.changed += 1;
                }
                if processed.outcome.written {
                    report.written += 1;
                }
                report.files.push(processed.outcome);
            }
            Err(error) => match options.failure_policy {
                FailurePolicy::Abort => return Err(error),
                FailurePolicy::Continue => {
                    on_event(FileEvent::Failed {
                        path,
                        error: &error,
                    });
                    report.failed.push(FailedFile {
                        path: path.clone(),
                        error: error.to_string(),
                    });
                }
            },
        }
    }

    Ok(report)
}

struct ProcessedFile {
    outcome: FileOutcome,
    before: String,
    after: String,
}

fn process_file(
    path: &Path,
    rules: &RuleSet,
    options: &BatchOptions,
) -> Result<ProcessedFile, BatchError> {
    let before = read_document(path)?;
    let rewritten = apply_rules(&before, rules).map_err(|source| BatchError::Rewrite {
        path: path.to_path_buf(),
        source,
    })?;

    let changed = rewritten.text != before;
    let should_write = !options.dry_run
        && match options.write_policy {
            WritePolicy::Always => true,
            WritePolicy::OnChange => changed,
        };

    if should_write {
        write_document(path, &rewritten.text)?;
    }

    Ok(ProcessedFile {
        outcome: FileOutcome {
            path: path.to_path_buf(),
            changed,
            written: should_write,
            hits: rewritten.hits,
        },
        before,
        after: rewritten.text,
    })
}
