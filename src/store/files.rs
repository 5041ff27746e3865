use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use uuid::Uuid;

use crate::error::{MigrateError, Result};

const OUTPUT_SUFFIX: &str = ".new";

/// Destination for a migrated document: the input path with `.new` appended.
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Read and parse a JSON document without interpreting its shape.
pub fn read_json(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(|source| MigrateError::InputNotFound {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| MigrateError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write `contents` to a staging file beside `path`, then rename it into place
/// so `path` never holds a partially written document.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.{}.staging", Uuid::new_v4()));

    if let Err(err) = fs::write(&staging, contents) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }

    Ok(())
}
