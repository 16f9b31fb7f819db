use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::domain::Catalog;

/// Serializes a catalog to YAML.
///
/// # Errors
///
/// Returns [`WriteError::Yaml`] if serialization fails.
pub fn to_yaml(catalog: &Catalog) -> Result<String, WriteError> {
    Ok(serde_yaml::to_string(catalog)?)
}

/// Serializes a catalog to YAML and atomically writes it to `path`.
///
/// # Errors
///
/// Returns a [`WriteError`] if serialization or writing fails. The file at
/// `path` is left untouched in that case.
#[instrument(level = "debug", skip(catalog), fields(records = catalog.len()))]
pub fn save(catalog: &Catalog, path: &Path) -> Result<(), WriteError> {
    let yaml = to_yaml(catalog)?;
    write_atomic(path, yaml.as_bytes())?;
    info!("Wrote {} records to {}", catalog.len(), path.display());
    Ok(())
}

/// Writes `contents` to `path` all-or-nothing.
///
/// The bytes are written to a temporary file alongside `path`, which is then
/// renamed over the destination. On failure the temporary file is removed.
///
/// # Errors
///
/// Returns a [`WriteError`] if the temporary file cannot be created or written,
/// or if it cannot be moved into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let io_error = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    debug!("Staging output in {}", file.path().display());

    file.write_all(contents).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;

    file.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Errors that can occur while writing the catalog.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The catalog could not be serialized.
    #[error("failed to serialize catalog")]
    Yaml(#[from] serde_yaml::Error),

    /// The output file could not be written.
    #[error("failed to write {}", .path.display())]
    Io {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The staged output could not be moved over the destination.
    #[error("failed to replace {}", .path.display())]
    Persist {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}
