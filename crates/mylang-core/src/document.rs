//! Output document and writer

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::serializer::NodeRecord;
use crate::{MylangError, Result};

/// Top-level output object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRoot {
    /// Declared grammar name
    pub language: String,
    /// Source length in bytes
    pub text_length: usize,
    pub ast: NodeRecord,
}

impl DocumentRoot {
    pub fn new(language: impl Into<String>, text_length: usize, ast: NodeRecord) -> Self {
        Self {
            language: language.into(),
            text_length,
            ast,
        }
    }

    /// Render as JSON, pretty-printed or compact
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let rendered = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        rendered.map_err(MylangError::encoding_error)
    }
}

/// Write `bytes` to `path` atomically
///
/// The bytes go to a temporary file next to `path`, which replaces `path`
/// only once everything has been written and flushed. On failure the
/// temporary file is removed and `path` is left as it was.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|err| MylangError::io_error(dir, err))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| MylangError::io_error(file.path(), err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // NamedTempFile is created 0600
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|err| MylangError::io_error(file.path(), err))?;
    }

    file.persist(path)
        .map_err(|err| MylangError::io_error(path, err.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
    Ok(())
}
