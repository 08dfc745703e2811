//! Reading the appended byte range of the monitored file.
//!
//! The reader never assumes one `read` call returns everything asked for: it
//! keeps reading until the requested length is reached or the file ends. A
//! file that ends early (truncated between stat and read) yields a shorter
//! payload whose `end` is the offset actually reached.

use crate::error::{MonitorError, Result};
use logfeed_protocol::DeltaPayload;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DeltaReader {
    path: PathBuf,
}

impl DeltaReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `[start, end)`. Requires `end > start`.
    pub fn read(&self, start: u64, end: u64) -> Result<DeltaPayload> {
        if end <= start {
            return Err(MonitorError::InvalidRange { start, end });
        }
        let mut file = File::open(&self.path).map_err(|source| MonitorError::Read {
            path: self.path.clone(),
            offset: start,
            source,
        })?;
        read_range(&mut file, start, end - start).map_err(|source| MonitorError::Read {
            path: self.path.clone(),
            offset: start,
            source,
        })
    }
}

/// Seek to `start` and read up to `len` bytes, stopping early only at
/// end of stream.
pub fn read_range<R: Read + Seek>(reader: &mut R, start: u64, len: u64) -> std::io::Result<DeltaPayload> {
    reader.seek(SeekFrom::Start(start))?;
    let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    // `take` + `read_to_end` loops over short reads and retries `Interrupted`.
    reader.take(len).read_to_end(&mut bytes)?;
    Ok(DeltaPayload::new(start, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    /// Hands out at most `chunk` bytes per `read` call.
    struct Trickle {
        inner: Cursor<Vec<u8>>,
        chunk: usize,
        calls: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            let limit = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..limit])
        }
    }

    impl Seek for Trickle {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_reads_exact_range() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hdfs.log");
        fs::write(&path, "preamble\nline one\nline two\n").unwrap();

        let delta = DeltaReader::new(&path).read(9, 18).unwrap();
        assert_eq!(delta.bytes, b"line one\n");
        assert_eq!((delta.start, delta.end), (9, 18));
    }

    #[test]
    fn test_loops_over_partial_reads() {
        let mut source = Trickle {
            inner: Cursor::new(b"0123456789abcdefghij".to_vec()),
            chunk: 3,
            calls: 0,
        };
        let delta = read_range(&mut source, 5, 12).unwrap();
        assert_eq!(delta.bytes, b"56789abcdefg");
        assert_eq!(delta.end, 17);
        assert!(source.calls >= 4);
    }

    #[test]
    fn test_short_file_reports_offset_reached() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hdfs.log");
        fs::write(&path, "0123456789").unwrap();

        // Caller believes the file is 16 bytes long.
        let delta = DeltaReader::new(&path).read(4, 16).unwrap();
        assert_eq!(delta.bytes, b"456789");
        assert_eq!(delta.end, 10);
    }

    #[test]
    fn test_empty_range_is_rejected() {
        let reader = DeltaReader::new("/nonexistent");
        assert!(matches!(
            reader.read(10, 10),
            Err(MonitorError::InvalidRange { start: 10, end: 10 })
        ));
        assert!(matches!(
            reader.read(10, 4),
            Err(MonitorError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_vanished_file_is_a_read_error() {
        let temp = TempDir::new().unwrap();
        let err = DeltaReader::new(temp.path().join("gone.log"))
            .read(0, 5)
            .unwrap_err();
        assert!(matches!(err, MonitorError::Read { offset: 0, .. }));
    }
}
