use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "flowzi.json";
const BACKUP_PREFIX: &str = "flowzi";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Loads, saves and snapshots [`Config`] on disk.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `{base}/flowzi.json` and `{base}/backups/`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let backups_dir = base.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(base.join(CONFIG_FILE), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Missing files load as the default configuration.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Writes to a sibling temp file, then renames over the target.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.config_path.with_extension("json.tmp");
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }

    /// Stores a timestamped copy and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let name = match note.and_then(slug) {
            Some(label) => format!("{}_{}_{}.{}", BACKUP_PREFIX, label, stamp, BACKUP_EXTENSION),
            None => format!("{}_{}.{}", BACKUP_PREFIX, stamp, BACKUP_EXTENSION),
        };
        let json = serde_json::to_string_pretty(config)?;
        write_file(&self.backups_dir.join(&name), &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.is_file() {
            return Err(ConfigError::BackupNotFound(backup_name.to_string()));
        }
        let config = Self::load_from(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by_key(|name| Reverse(backup_timestamp(name)));
        Ok(names)
    }
}

/// Lowercase ascii-alphanumeric words joined by dashes.
fn slug(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("-"))
    }
}

fn backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next()?;
    let date = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{}_{}", date, time), BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("  Before EUR switch!! ").as_deref(), Some("before-eur-switch"));
        assert_eq!(slug("***"), None);
    }

    #[test]
    fn timestamp_is_read_from_the_file_name() {
        let parsed = backup_timestamp("flowzi_pre-sync_20250102_030405.json").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-02 03:04:05");
        assert!(backup_timestamp("notes.json").is_none());
    }
}
