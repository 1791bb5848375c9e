use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::models::PickerPlan;
use crate::trials::CongruencyConfig;

const ENABLE_LOGS: bool = true;

const DEFAULT_REPEATS: u32 = 3;
const DEFAULT_DATA_DIR: &str = "battery-data";

/// Battery parameters shared by every run started from this installation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BatterySettings {
    pub repeats: u32,
    pub graphemes: Vec<String>,
    pub weekdays: Vec<String>,
    pub congruency: CongruencyConfig,
}

impl Default for BatterySettings {
    fn default() -> Self {
        let plan = PickerPlan::default();
        Self {
            repeats: DEFAULT_REPEATS,
            graphemes: plan.graphemes,
            weekdays: plan.weekdays,
            congruency: CongruencyConfig::default(),
        }
    }
}

impl BatterySettings {
    pub fn picker_plan(&self) -> PickerPlan {
        PickerPlan {
            graphemes: self.graphemes.clone(),
            weekdays: self.weekdays.clone(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<BatterySettings>,
}

impl SettingsStore {
    /// Opens the settings file, falling back to defaults when it is missing or unreadable JSON.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                crate::log_warn!(
                    "Ignoring malformed settings at {}: {err}",
                    path.display()
                );
                BatterySettings::default()
            })
        } else {
            BatterySettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> BatterySettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: BatterySettings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &BatterySettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// `BATTERY_DATA_DIR`, defaulting to `./battery-data`.
pub fn data_dir() -> PathBuf {
    std::env::var("BATTERY_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// `BATTERY_DEBUG=1` or `true` enables debug-level logging.
pub fn debug_mode() -> bool {
    std::env::var("BATTERY_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::TrialCountMode;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.settings(), BatterySettings::default());
        assert_eq!(store.settings().picker_plan().stimulus_count(), 33);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.settings();
        settings.repeats = 4;
        settings.congruency = CongruencyConfig::fixed(40);
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.settings(), settings);
        assert_eq!(
            reopened.settings().congruency.trial_count_mode,
            TrialCountMode::Fixed
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "repeats": 2 }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().settings();
        assert_eq!(settings.repeats, 2);
        assert_eq!(settings.graphemes.len(), 26);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            SettingsStore::new(path).unwrap().settings(),
            BatterySettings::default()
        );
    }
}
