//! The file being tailed, as seen by the poll scheduler.

use crate::delta::DeltaReader;
use crate::error::Result;
use crate::observer::FileObserver;
use logfeed_protocol::{DeltaPayload, ObservedFileState};
use std::path::{Path, PathBuf};

/// Something that can be stat'ed and read by byte range.
pub trait LogSource {
    /// Human-readable location for log lines.
    fn location(&self) -> &Path;

    fn observe(&self) -> Result<ObservedFileState>;

    /// Read `[start, end)`; may return fewer bytes if the source ends early.
    fn read_delta(&self, start: u64, end: u64) -> Result<DeltaPayload>;
}

/// A regular file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalLogFile {
    observer: FileObserver,
    reader: DeltaReader,
}

impl LocalLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            observer: FileObserver::new(path.clone()),
            reader: DeltaReader::new(path),
        }
    }
}

impl LogSource for LocalLogFile {
    fn location(&self) -> &Path {
        self.observer.path()
    }

    fn observe(&self) -> Result<ObservedFileState> {
        self.observer.observe()
    }

    fn read_delta(&self, start: u64, end: u64) -> Result<DeltaPayload> {
        self.reader.read(start, end)
    }
}
