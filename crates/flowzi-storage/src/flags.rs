use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use flowzi_core::{CoreError, FlagStore};

fn flag_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::FlagStore(err.to_string())
}

/// Flags persisted as one JSON object on disk. Every `set` rewrites the file
/// through a temp file and a rename.
#[derive(Debug)]
pub struct JsonFlagStore {
    path: PathBuf,
    flags: Mutex<BTreeMap<String, String>>,
}

impl JsonFlagStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let flags = if path.exists() {
            let data = fs::read_to_string(&path).map_err(flag_error)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data).map_err(flag_error)?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), count = flags.len(), "flag store opened");
        Ok(Self {
            path,
            flags: Mutex::new(flags),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().map(|flags| flags.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, CoreError> {
        self.flags
            .lock()
            .map_err(|_| CoreError::FlagStore("flag store lock poisoned".into()))
    }

    fn persist(&self, flags: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(flag_error)?;
        }
        let json = serde_json::to_string_pretty(flags).map_err(flag_error)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp).map_err(flag_error)?;
        file.write_all(json.as_bytes()).map_err(flag_error)?;
        file.sync_all().map_err(flag_error)?;
        fs::rename(&tmp, &self.path).map_err(flag_error)?;
        Ok(())
    }
}

impl FlagStore for JsonFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut flags = self.lock()?;
        let previous = flags.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist(&flags) {
            match previous {
                Some(old) => flags.insert(key.to_string(), old),
                None => flags.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

/// Process-local flags.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<BTreeMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.flags
            .lock()
            .map(|flags| flags.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let flags = self
            .flags
            .lock()
            .map_err(|_| CoreError::FlagStore("flag store lock poisoned".into()))?;
        Ok(flags.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut flags = self
            .flags
            .lock()
            .map_err(|_| CoreError::FlagStore("flag store lock poisoned".into()))?;
        flags.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
