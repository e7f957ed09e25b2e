//! Whole-file JSON persistence for the stores.
//!
//! Each file holds one pretty-printed JSON array. Reads load everything,
//! writes replace everything: the new contents go to a sibling `.tmp` file
//! which is then renamed over the original.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use crate::errors::{StorageError, StorageResult};

/// Reads the array stored at `path`. A missing or empty file is an empty list.
pub async fn load<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StorageError::Io { path: path.to_path_buf(), source });
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrites `path` with `records`, indented by two spaces.
pub async fn save<T: Serialize>(path: &Path, records: &[T]) -> StorageResult<()> {
    let mut bytes = serde_json::to_vec_pretty(records).map_err(|source| StorageError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');

    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes)
        .await
        .map_err(|source| StorageError::Io { path: tmp.clone(), source })?;
    fs::rename(&tmp, path)
        .await
        .map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
