use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileAccessError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileAccessError {
    pub fn path(&self) -> &Path {
        match self {
            FileAccessError::Read { path, .. }
            | FileAccessError::Utf8 { path, .. }
            | FileAccessError::Write { path, .. } => path,
        }
    }
}

/// Read a whole file as UTF-8. No BOM handling.
pub fn read_document(path: &Path) -> Result<String, FileAccessError> {
    let bytes = fs::read(path).map_err(|source| FileAccessError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| FileAccessError::Utf8 {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the file at `path` with `content`.
///
/// Writes to a tempfile in the same directory, fsyncs, then renames over the
/// original, so a crash leaves either the old or the new document. A symlink
/// is written through: its target is replaced and the link stays.
pub fn write_document(path: &Path, content: &str) -> Result<(), FileAccessError> {
    let write = || -> std::io::Result<()> {
        let target = resolve_link(path)?;
        atomic_write(&target, content.as_bytes())
    };
    write().map_err(|source| FileAccessError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve_link(path: &Path) -> std::io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}

fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    // Keep the original permission bits across the rename.
    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
