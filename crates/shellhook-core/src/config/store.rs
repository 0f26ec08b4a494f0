use crate::config::settings::{HookSettings, SettingsBackend};
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::warn;

/// Form field the host's configuration screen submits the command under.
pub const SHELL_SCRIPT_FIELD: &str = "shellScript";
/// Optional form field carrying the timeout, in whole seconds.
pub const TIMEOUT_FIELD: &str = "timeoutSecs";

/// Errors surfaced to the host's settings framework by
/// [`ConfigStore::configure`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The submitted form payload is missing a field or has one of the wrong
    /// shape. The previous configuration stays in effect.
    #[error("invalid configuration form: {0}")]
    InvalidForm(String),
    /// The submission was accepted in memory but could not be written to
    /// durable storage.
    #[error("failed to persist configuration: {0}")]
    Persist(anyhow::Error),
}

/// Holds the global hook configuration and keeps it in sync with the host's
/// durable storage.
///
/// The in-memory value is guarded by a read/write lock: completion events may
/// read it concurrently with a configuration-form submission.
pub struct ConfigStore {
    settings: RwLock<HookSettings>,
    backend: Arc<dyn SettingsBackend>,
}

impl ConfigStore {
    /// Creates the store and restores persisted settings through `backend`.
    ///
    /// A restore failure is logged and leaves the defaults in place; host
    /// startup never fails here.
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        let settings = match backend.load() {
            Ok(Some(restored)) => restored,
            Ok(None) => HookSettings::default(),
            Err(e) => {
                warn!("failed to restore shell hook settings: {e:#}");
                HookSettings::default()
            }
        };
        Self {
            settings: RwLock::new(settings),
            backend,
        }
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> HookSettings {
        self.read().clone()
    }

    /// The configured command string. Empty means the hook is disabled.
    pub fn shell_command(&self) -> String {
        self.read().shell_command.clone()
    }

    /// Applies a configuration-form submission from the host.
    ///
    /// The new value is visible to subsequent reads before the save completes;
    /// a save failure is reported so the settings UI can show it, without
    /// rolling the in-memory value back.
    pub fn configure(&self, form: &Value) -> Result<(), ConfigError> {
        let shell_command = form
            .get(SHELL_SCRIPT_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ConfigError::InvalidForm(format!("missing string field '{SHELL_SCRIPT_FIELD}'"))
            })?;

        let timeout_secs = match form.get(TIMEOUT_FIELD) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_u64().ok_or_else(|| {
                ConfigError::InvalidForm(format!(
                    "field '{TIMEOUT_FIELD}' must be a non-negative integer"
                ))
            })?),
        };

        let next = HookSettings {
            shell_command: shell_command.to_string(),
            timeout_secs,
        };
        *self.write() = next.clone();
        self.backend.save(&next).map_err(ConfigError::Persist)
    }

    fn read(&self) -> RwLockReadGuard<'_, HookSettings> {
        self.settings.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HookSettings> {
        self.settings.write().unwrap_or_else(|e| e.into_inner())
    }
}
