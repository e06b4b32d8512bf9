//! Source loading
//!
//! A [`SourceBuffer`] holds the complete contents of one input file. It is
//! created once per run and never mutated afterwards.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::{MylangError, Result};

/// Immutable bytes of one input file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
}

impl SourceBuffer {
    /// Read the whole file at `path`
    ///
    /// Capacity is reserved up front and fallibly, so a file too large for
    /// memory yields [`MylangError::Allocation`] instead of aborting.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|err| MylangError::io_error(path, err))?;

        let hint = file
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(|err| MylangError::io_error(path, err))?;
        let requested = usize::try_from(hint).map_err(|_| MylangError::allocation_error(usize::MAX))?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(requested)
            .map_err(|_| MylangError::allocation_error(requested))?;
        file.read_to_end(&mut bytes)
            .map_err(|err| MylangError::io_error(path, err))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Loaded source");
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The contents as UTF-8, if they are valid
    pub fn as_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::from_bytes(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_load_reads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.my");
        std::fs::write(&path, "def main() end\n").unwrap();

        let buffer = SourceBuffer::load(&path).unwrap();
        assert_eq!(buffer.as_bytes(), b"def main() end\n");
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer.as_str().unwrap(), "def main() end\n");
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.my");
        std::fs::write(&path, "").unwrap();

        let buffer = SourceBuffer::load(&path).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.my");

        let err = SourceBuffer::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("nope.my"));
    }

    #[test]
    fn test_invalid_utf8_is_kept_verbatim() {
        let buffer = SourceBuffer::from_bytes(vec![b'a', 0xff, b'b']);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.as_str().is_err());
    }
}
