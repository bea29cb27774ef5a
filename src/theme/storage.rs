//! Persistent key/value storage for the preferred theme

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ThemeError;

/// Storage key holding the preferred mode
pub const THEME_KEY: &str = "theme";

/// String key/value store, shaped like browser local storage
pub trait ThemeStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError>;
}

/// In-memory store, used for prerendering and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a theme value
    pub fn with_theme(value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(THEME_KEY.to_string(), value.to_string());
        storage
    }
}

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON file store; every `set` rewrites the file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ThemeError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| ThemeError::Storage {
            path: self.path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl ThemeStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        let io_err = |e: std::io::Error| ThemeError::Storage {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?).map_err(io_err)?;
        tracing::debug!("Stored {}={} in {:?}", key, value, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(THEME_KEY).unwrap(), None);
        storage.set(THEME_KEY, "dark").unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".adefs/preferences.json");

        let mut storage = FileStorage::new(&path);
        assert_eq!(storage.get(THEME_KEY).unwrap(), None);
        storage.set(THEME_KEY, "light").unwrap();
        storage.set("other", "kept").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(THEME_KEY),
            Err(ThemeError::Serialize(_))
        ));
    }
}
