//! File-backed prefs store.

use guardian_core::config::{ConfigStore, RawConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read prefs {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse prefs {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Prefs file holding `blocking_enabled` and `blocked_apps`.
///
/// The file is re-read on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct PrefsFile {
    path: PathBuf,
}

impl PrefsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<RawConfig, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for PrefsFile {
    fn read_raw(&self) -> color_eyre::eyre::Result<RawConfig> {
        Ok(self.read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::config::snapshot;

    #[test]
    fn test_reads_prefs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(
            &path,
            "blocking_enabled = true\nblocked_apps = \"com.a, com.b ,,com.c\"\n",
        )
        .unwrap();

        let config = snapshot(&PrefsFile::new(&path));
        assert!(config.enabled);
        assert_eq!(config.blocked_ids.len(), 3);
        assert!(config.blocked_ids.contains("com.b"));
    }

    #[test]
    fn test_missing_keys_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "blocked_apps = \"com.a\"\n").unwrap();

        let config = snapshot(&PrefsFile::new(&path));
        assert!(!config.enabled);
        assert!(config.blocked_ids.contains("com.a"));
    }

    #[test]
    fn test_unreadable_prefs_fail_open() {
        let dir = tempfile::tempdir().unwrap();
        let missing = PrefsFile::new(dir.path().join("absent.toml"));
        assert!(matches!(missing.read(), Err(StoreError::Read { .. })));
        assert!(!snapshot(&missing).enabled);

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "blocking_enabled = yes please").unwrap();
        let broken = PrefsFile::new(&path);
        assert!(matches!(broken.read(), Err(StoreError::Parse { .. })));
        assert!(!snapshot(&broken).enabled);
    }
}
