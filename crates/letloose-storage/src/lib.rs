//! JSON persistence for controller documents.

use letloose_core::{ControllerDocument, DOCUMENT_FORMAT_VERSION};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Storage error wrapper.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document does not match schema: {0}")]
    Schema(String),
    #[error("unsupported document version {0}")]
    UnsupportedVersion(u16),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads and writes a single controller document at a fixed path.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Bind a store to `path`. The file is not touched until the first load or save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored document; a missing file yields `None`.
    pub fn load(&self) -> Result<Option<ControllerDocument>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored document");
                return Ok(None);
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };
        let document = decode(&text)?;
        info!(
            path = %self.path.display(),
            records = document.records.len(),
            "loaded controller document"
        );
        Ok(Some(document))
    }

    /// Write `document` as pretty JSON through a sibling temp file, then rename over the target.
    pub fn save(&self, document: &ControllerDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
        }
        let staging = self.staging_path();
        let mut bytes = serde_json::to_vec_pretty(document)?;
        bytes.push(b'\n');
        {
            let mut file = fs::File::create(&staging).map_err(|err| StorageError::io(&staging, err))?;
            file.write_all(&bytes)
                .and_then(|()| file.sync_all())
                .map_err(|err| StorageError::io(&staging, err))?;
        }
        fs::rename(&staging, &self.path).map_err(|err| StorageError::io(&self.path, err))?;
        info!(
            path = %self.path.display(),
            records = document.records.len(),
            "saved controller document"
        );
        Ok(())
    }

    /// Delete the stored document. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::io(&self.path, err)),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("document"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parse a document, checking the version before the record schema.
pub fn decode(text: &str) -> Result<ControllerDocument, StorageError> {
    let value: Value = serde_json::from_str(text)?;
    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| StorageError::Schema("missing numeric version".to_owned()))?;
    let version = u16::try_from(version).map_err(|_| StorageError::UnsupportedVersion(u16::MAX))?;
    if version != DOCUMENT_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(version));
    }
    serde_path_to_error::deserialize::<_, ControllerDocument>(value)
        .map_err(|err| StorageError::Schema(format!("{} at {}", err.inner(), err.path())))
}
