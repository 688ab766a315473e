use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Unit;

const PREFS_FILE: &str = "preferences.toml";

/// On-disk shape: two independent scalar entries.
///
/// Example TOML:
/// last_city = "Tokyo"
/// preferred_unit = "imperial"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PrefData {
    last_city: Option<String>,
    preferred_unit: Option<String>,
}

/// Persisted user preferences surviving process restarts.
///
/// Writes are fire-and-forget: a failed write is logged and never reaches
/// the caller. Reads happen once, at open time.
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    data: Mutex<PrefData>,
}

impl PrefStore {
    /// Open the store backed by `dir`, reading any existing file.
    ///
    /// A missing, unreadable, or unparseable file degrades to empty
    /// defaults instead of aborting the dashboard.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let path = dir.into().join(PREFS_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ignoring unparseable preferences file"
                );
                PrefData::default()
            }),
            Err(_) => PrefData::default(),
        };

        Self {
            path,
            data: Mutex::new(data),
        }
    }

    /// Open the store in the platform config directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self::open(dirs.config_dir()))
    }

    /// Last-searched city, if one was ever saved.
    pub fn city(&self) -> Option<String> {
        self.data.lock().last_city.clone()
    }

    /// Stored unit system, defaulting to metric when absent.
    ///
    /// An unrecognized stored value also falls back to metric; the typed
    /// enum cannot pass a foreign value through.
    pub fn unit(&self) -> Unit {
        let data = self.data.lock();
        match data.preferred_unit.as_deref() {
            None => Unit::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = raw, "unrecognized preferred_unit, using metric");
                Unit::default()
            }),
        }
    }

    pub fn set_city(&self, city: &str) {
        let mut data = self.data.lock();
        data.last_city = Some(city.to_string());
        self.save(&data);
    }

    pub fn set_unit(&self, unit: Unit) {
        let mut data = self.data.lock();
        data.preferred_unit = Some(unit.as_str().to_string());
        self.save(&data);
    }

    fn save(&self, data: &PrefData) {
        if let Err(err) = self.write_to_disk(data) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to persist preferences"
            );
        }
    }

    fn write_to_disk(&self, data: &PrefData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "Failed to create preferences directory: {}",
                    parent.display()
                )
            })?;
        }

        let toml =
            toml::to_string_pretty(data).context("Failed to serialize preferences to TOML")?;

        fs::write(&self.path, toml).with_context(|| {
            format!("Failed to write preferences file: {}", self.path.display())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefStore::open(dir.path());

        assert_eq!(store.city(), None);
        assert_eq!(store.unit(), Unit::Metric);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");

        let store = PrefStore::open(dir.path());
        store.set_city("Tokyo");
        store.set_unit(Unit::Imperial);

        let reopened = PrefStore::open(dir.path());
        assert_eq!(reopened.city().as_deref(), Some("Tokyo"));
        assert_eq!(reopened.unit(), Unit::Imperial);
    }

    #[test]
    fn city_write_leaves_unit_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");

        let store = PrefStore::open(dir.path());
        store.set_unit(Unit::Imperial);
        store.set_city("Paris");

        let reopened = PrefStore::open(dir.path());
        assert_eq!(reopened.unit(), Unit::Imperial);
        assert_eq!(reopened.city().as_deref(), Some("Paris"));
    }

    #[test]
    fn foreign_unit_value_falls_back_to_metric() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(PREFS_FILE),
            "preferred_unit = \"kelvin\"\n",
        )
        .expect("write prefs");

        let store = PrefStore::open(dir.path());
        assert_eq!(store.unit(), Unit::Metric);
    }

    #[test]
    fn unparseable_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(PREFS_FILE), "last_city = [not toml").expect("write prefs");

        let store = PrefStore::open(dir.path());
        assert_eq!(store.city(), None);
        assert_eq!(store.unit(), Unit::Metric);
    }
}
