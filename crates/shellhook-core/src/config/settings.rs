use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shellhook")
        .join("settings.json")
}

/// The single globally persisted configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSettings {
    /// Shell command template run after every completed build.
    /// Empty string disables the hook entirely.
    #[serde(default)]
    pub shell_command: String,
    /// Optional wall-clock cap in seconds for the spawned command.
    /// `None` means the hook waits without bound.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Durable storage for [`HookSettings`], provided by the host server.
pub trait SettingsBackend: Send + Sync {
    /// Restore previously persisted settings. `Ok(None)` means nothing has
    /// been saved yet.
    fn load(&self) -> Result<Option<HookSettings>>;

    fn save(&self, settings: &HookSettings) -> Result<()>;
}

/// Reference backend persisting pretty JSON to a single file,
/// `~/.shellhook/settings.json` by default.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for JsonFileBackend {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<HookSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, settings: &HookSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_none_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("settings.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested").join("settings.json"));

        let settings = HookSettings {
            shell_command: "notify-send \"$JOB_NAME: $RESULT\"".to_string(),
            timeout_secs: Some(30),
        };
        backend.save(&settings).unwrap();

        assert_eq!(backend.load().unwrap(), Some(settings));
    }

    #[test]
    fn corrupt_file_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let backend = JsonFileBackend::new(path);
        assert!(backend.load().is_err());
    }
}
