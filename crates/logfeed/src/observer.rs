//! Size/mtime observation of the monitored file.

use crate::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use logfeed_protocol::ObservedFileState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stats one path on demand. Holds no state between observations.
#[derive(Debug, Clone)]
pub struct FileObserver {
    path: PathBuf,
}

impl FileObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size and modification time.
    pub fn observe(&self) -> Result<ObservedFileState> {
        let observe_err = |source: io::Error| MonitorError::Observe {
            path: self.path.clone(),
            source,
        };
        let metadata = fs::metadata(&self.path).map_err(observe_err)?;
        let modified = metadata.modified().map_err(observe_err)?;
        Ok(ObservedFileState::new(
            metadata.len(),
            DateTime::<Utc>::from(modified),
        ))
    }
}

/// Resolve the file to monitor to an absolute path, failing if it does not
/// exist or is not a regular file.
pub fn resolve_target(path: &Path) -> Result<PathBuf> {
    let resolved = fs::canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MonitorError::FileNotFound(path.to_path_buf()),
        _ => MonitorError::Observe {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !resolved.is_file() {
        return Err(MonitorError::NotAFile(resolved));
    }
    Ok(resolved)
}
