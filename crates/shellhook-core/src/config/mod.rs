pub mod settings;
pub mod store;

pub use settings::{HookSettings, JsonFileBackend, SettingsBackend};
pub use store::{ConfigError, ConfigStore, SHELL_SCRIPT_FIELD, TIMEOUT_FIELD};
