use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::sensing::SensingIntervals;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusSettings {
    pub sample_interval_ms: u64,
    pub display_interval_ms: u64,
    pub detection_timeout_ms: u64,
    pub camera_device: String,
    /// How long the headless host runs before stopping on its own.
    pub demo_session_secs: u64,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            display_interval_ms: 1_000,
            detection_timeout_ms: 2_000,
            camera_device: "default".into(),
            demo_session_secs: 30,
        }
    }
}

impl FocusSettings {
    /// Intervals for the sensing tasks; zero values are raised to 1 ms.
    pub fn intervals(&self) -> SensingIntervals {
        SensingIntervals {
            sample: Duration::from_millis(self.sample_interval_ms.max(1)),
            display: Duration::from_millis(self.display_interval_ms.max(1)),
            detection_timeout: Duration::from_millis(self.detection_timeout_ms.max(1)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    focus: FocusSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn focus(&self) -> FocusSettings {
        match self.data.read() {
            Ok(guard) => guard.focus.clone(),
            Err(poisoned) => poisoned.into_inner().focus.clone(),
        }
    }

    pub fn update_focus(&self, settings: FocusSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.focus = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
