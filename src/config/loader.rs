//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and the fee schedule from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::FeeScheduleEntry;

use super::types::EngineSettings;

/// Loads and provides access to the engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query settings and fee-schedule entries.
///
/// # Directory Structure
///
/// ```text
/// config/renewals/
/// ├── engine.yaml      # Rates, offsets, captions, transports
/// └── schedule/
///     └── ep.yaml      # Fee schedule entries for one jurisdiction
/// ```
///
/// # Example
///
/// ```no_run
/// use renewal_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/renewals").unwrap();
/// let entry = loader.schedule_entry("EP", "patent", "national", 5);
/// assert!(entry.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: EngineSettings,
    schedule: Vec<FeeScheduleEntry>,
}

/// One schedule YAML file: a flat list of entries.
#[derive(Debug, serde::Deserialize)]
struct ScheduleFile {
    entries: Vec<FeeScheduleEntry>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g. "./config/renewals")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if any
    /// required file is missing or contains invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;

        let schedule_dir = path.join("schedule");
        let schedule = Self::load_schedule(&schedule_dir)?;

        Ok(Self { settings, schedule })
    }

    /// Builds a loader from already-constructed parts, for tests and
    /// embedded use.
    pub fn from_parts(settings: EngineSettings, schedule: Vec<FeeScheduleEntry>) -> Self {
        Self { settings, schedule }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all schedule files from the schedule directory.
    fn load_schedule(schedule_dir: &Path) -> EngineResult<Vec<FeeScheduleEntry>> {
        let dir_str = schedule_dir.display().to_string();

        if !schedule_dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(schedule_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut schedule = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let file = Self::load_yaml::<ScheduleFile>(&path)?;
                schedule.extend(file.entries);
            }
        }

        Ok(schedule)
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns every loaded fee-schedule entry.
    pub fn schedule(&self) -> &[FeeScheduleEntry] {
        &self.schedule
    }

    /// Looks up the fee-schedule entry for a jurisdiction/category/origin
    /// key and annuity year, if one exists.
    pub fn schedule_entry(
        &self,
        country: &str,
        category: &str,
        origin: &str,
        qt: u32,
    ) -> Option<&FeeScheduleEntry> {
        self.schedule.iter().find(|e| {
            e.country == country && e.category == category && e.origin == origin && e.qt == qt
        })
    }
}
