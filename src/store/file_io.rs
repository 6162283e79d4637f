//! Snapshot file persistence for the JSON store
//!
//! The whole store is one JSON document. It is serialized in memory first,
//! written to a sibling temp file, synced and renamed over the target, so a
//! reader sees either the previous snapshot or the new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

fn io_error(action: &str, path: &Path, err: io::Error) -> LedgerError {
    LedgerError::Io(format!("Failed to {} store file {}: {}", action, path.display(), err))
}

/// `.store.json.<pid>.tmp` next to the target
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".into());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Load a snapshot; a missing file is an empty store
pub fn read_snapshot<T: DeserializeOwned + Default>(path: &Path) -> LedgerResult<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(io_error("read", path, e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        LedgerError::Json(format!(
            "Store file {} is not a valid snapshot (line {}, column {}): {}",
            path.display(),
            e.line(),
            e.column(),
            e
        ))
    })
}

/// Replace the snapshot at `path`
pub fn write_snapshot<T: Serialize>(path: &Path, snapshot: &T) -> LedgerResult<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| LedgerError::Json(format!("Failed to serialize store snapshot: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error("create the directory of", path, e))?;
    }

    let temp_path = temp_path_for(path);
    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(&bytes)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error("write", path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Tables {
        tables: BTreeMap<String, Vec<String>>,
    }

    fn sample() -> Tables {
        let mut tables = BTreeMap::new();
        tables.insert("categories".to_string(), vec!["Food".to_string()]);
        Tables { tables }
    }

    #[test]
    fn test_missing_or_blank_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("store.json");
        assert_eq!(read_snapshot::<Tables>(&missing).unwrap(), Tables::default());

        fs::write(&missing, "  \n").unwrap();
        assert_eq!(read_snapshot::<Tables>(&missing).unwrap(), Tables::default());
    }

    #[test]
    fn test_write_creates_directory_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("store.json");

        write_snapshot(&path, &sample()).unwrap();
        write_snapshot(&path, &sample()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path().join("data"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("store.json")]);
        assert_eq!(read_snapshot::<Tables>(&path).unwrap(), sample());
    }

    #[test]
    fn test_corrupt_snapshot_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "{\"tables\": [").unwrap();

        match read_snapshot::<Tables>(&path) {
            Err(LedgerError::Json(message)) => assert!(message.contains("store.json")),
            other => panic!("expected a Json error, got {:?}", other),
        }
    }
}
