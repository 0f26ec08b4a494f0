pub mod config;
pub mod listeners;
pub mod run;

pub use config::{
    ConfigError, ConfigStore, HookSettings, JsonFileBackend, SettingsBackend, SHELL_SCRIPT_FIELD,
    TIMEOUT_FIELD,
};
pub use listeners::{ListenerRegistry, RunListener, ShellHook, ShellHookBuilder, DISPLAY_NAME};
pub use run::{BufferSink, LogSink, Run, RunResult};
