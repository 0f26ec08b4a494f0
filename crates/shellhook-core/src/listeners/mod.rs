pub mod listener;
pub mod registry;
pub mod shell;

pub use listener::RunListener;
pub use registry::ListenerRegistry;
pub use shell::{ShellHook, ShellHookBuilder, DISPLAY_NAME};
