//! Mapping of request paths onto the served directory tree.
//!
//! Every request path is checked lexically first (no `..`, no absolute
//! paths), then joined onto the serve root and canonicalized so that symlinks
//! pointing outside the root are caught by the containment check.

use std::io;
use std::path::{is_separator, Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::warn;

use crate::error::FileServerError;

/// The directory tree exposed by the server.
///
/// Holds the canonical form of the configured folder. Built once at startup
/// and shared read-only by all requests.
#[derive(Debug, Clone)]
pub struct ServeRoot {
    path: PathBuf,
}

impl ServeRoot {
    /// Canonicalize `path` and make sure it is an existing directory.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        if !path.is_dir() {
            return Err(io::Error::other(format!(
                "'{}' is not a directory",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What a request path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File {
        size: u64,
        modified: Option<SystemTime>,
    },
}

/// A request path that passed every check and exists on disk.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// Canonical absolute path, always inside the serve root.
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl ResolvedEntry {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Resolve a decoded request path against the serve root.
pub async fn resolve(root: &ServeRoot, request_path: &str) -> Result<ResolvedEntry, FileServerError> {
    let relative = request_path.strip_prefix('/').unwrap_or(request_path);

    if relative.contains("..") {
        warn!(path = %request_path, "Path traversal attempt: parent directory reference");
        return Err(FileServerError::Forbidden(
            "Directory traversal not allowed".to_string(),
        ));
    }

    if relative.starts_with(is_separator) || Path::new(relative).is_absolute() {
        warn!(path = %request_path, "Path traversal attempt: absolute path");
        return Err(FileServerError::Forbidden(
            "Directory traversal not allowed".to_string(),
        ));
    }

    let candidate = root.path().join(relative);

    let canonical = fs::canonicalize(&candidate)
        .await
        .map_err(|_| FileServerError::NotFound(request_path.to_string()))?;

    if !is_contained(root.path(), &canonical) {
        warn!(
            path = %request_path,
            resolved = %canonical.display(),
            "Resolved path escapes serve root"
        );
        return Err(FileServerError::Forbidden(
            "Path outside serve directory".to_string(),
        ));
    }

    let metadata = match fs::metadata(&canonical).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FileServerError::NotFound(request_path.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }
    };

    Ok(ResolvedEntry {
        path: canonical,
        kind,
    })
}

/// Component-wise containment: `/srv/files-secret` is not inside `/srv/files`.
pub fn is_contained(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}
