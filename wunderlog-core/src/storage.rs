use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tokio::fs;

use crate::error::{Result, WunderlogError};

/// Creates `path` (and parents) unless it is already a directory.
pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(WunderlogError::io(
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Creating directory {}", path.display());
            match fs::create_dir_all(path).await {
                Ok(()) => Ok(()),
                // lost a race with another creator
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
                Err(e) => Err(WunderlogError::io(path, e)),
            }
        }
        Err(e) => Err(WunderlogError::io(path, e)),
    }
}

/// Serializes `value` with sorted keys and one-space indentation, so the same
/// data always produces the same bytes.
pub fn to_stable_json(value: &Value) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    sort_keys(value).serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes `value` to `path`, replacing any existing file.
pub async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let bytes = to_stable_json(value).map_err(|e| WunderlogError::json(path, e))?;
    fs::write(path, bytes)
        .await
        .map_err(|e| WunderlogError::io(path, e))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// First entry of `dir` whose file name starts with `prefix`.
pub async fn find_with_prefix(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| WunderlogError::io(dir, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| WunderlogError::io(dir, e))?
    {
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}

// Rebuilds maps in key order; needed when serde_json's `preserve_order` is
// switched on somewhere in the dependency graph.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), sort_keys(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
