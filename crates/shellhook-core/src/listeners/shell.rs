use crate::config::ConfigStore;
use crate::listeners::listener::RunListener;
use crate::run::{LogSink, Run};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Label shown by the host's configuration screen.
pub const DISPLAY_NAME: &str = "Global Shell Hook";

const DEFAULT_SHELL: &str = "/bin/sh";

/// The completion hook: runs the globally configured shell command after
/// every run and appends the command's combined output to that run's log.
///
/// The subprocess inherits the full ambient environment plus two overrides:
/// `RESULT` (the run's terminal status token) and `JOB_NAME` (the run's
/// parent job). Everything the hook does stays contained — spawn failures,
/// timeouts and non-zero exits become diagnostic lines in the run's log and
/// never touch the run's result.
pub struct ShellHook {
    config: Arc<ConfigStore>,
    shell: String,
}

impl ShellHook {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: Arc<ConfigStore>) -> ShellHookBuilder {
        ShellHookBuilder::new(config)
    }

    async fn run_command(
        &self,
        command: &str,
        timeout_secs: Option<u64>,
        run: &Run,
        log: &dyn LogSink,
    ) {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .env("RESULT", run.result.as_str())
            .env("JOB_NAME", &run.job_name)
            .kill_on_drop(true);

        let waited = match timeout_secs {
            // Dropping the output future kills the subprocess.
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
                    Ok(waited) => waited,
                    Err(_) => {
                        warn!(job = %run.job_name, "shell hook timed out after {secs}s");
                        log.append_line(&format!(
                            "shell hook timed out after {secs}s, command killed"
                        ));
                        return;
                    }
                }
            }
            None => cmd.output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                log.append_line(&format!("shell hook failed to start: {e}"));
                return;
            }
        };

        log.append(&combined_output(&output.stdout, &output.stderr));

        if !output.status.success() {
            let code = output.status.code();
            warn!(job = %run.job_name, ?code, "shell hook command exited non-zero");
            match code {
                Some(code) => log.append_line(&format!("shell hook exited with status {code}")),
                None => log.append_line("shell hook terminated by signal"),
            }
        }
    }
}

#[async_trait]
impl RunListener for ShellHook {
    async fn on_completed(&self, run: &Run, log: &dyn LogSink) -> Result<()> {
        // Snapshot once; a concurrent reconfiguration affects the next event.
        let settings = self.config.get();
        if settings.shell_command.is_empty() {
            debug!(job = %run.job_name, "no shell hook configured, skipping");
            return Ok(());
        }

        self.run_command(&settings.shell_command, settings.timeout_secs, run, log)
            .await;
        Ok(())
    }
}

/// Builder for [`ShellHook`].
pub struct ShellHookBuilder {
    config: Arc<ConfigStore>,
    shell: String,
}

impl ShellHookBuilder {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Override the shell used to interpret the command (default `/bin/sh`).
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn build(self) -> ShellHook {
        ShellHook {
            config: self.config,
            shell: self.shell,
        }
    }
}

/// Combined text of the subprocess streams, stdout first. Line separators are
/// preserved exactly as the command emitted them.
fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut out = String::from_utf8_lossy(stdout).into_owned();
    out.push_str(&String::from_utf8_lossy(stderr));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HookSettings, SettingsBackend};
    use crate::run::{BufferSink, RunResult};
    use serde_json::json;

    struct NullBackend;

    impl SettingsBackend for NullBackend {
        fn load(&self) -> Result<Option<HookSettings>> {
            Ok(None)
        }

        fn save(&self, _settings: &HookSettings) -> Result<()> {
            Ok(())
        }
    }

    fn unconfigured_store() -> Arc<ConfigStore> {
        Arc::new(ConfigStore::new(Arc::new(NullBackend)))
    }

    fn configured_store(command: &str, timeout_secs: Option<u64>) -> Arc<ConfigStore> {
        let store = unconfigured_store();
        let mut form = json!({ "shellScript": command });
        if let Some(secs) = timeout_secs {
            form["timeoutSecs"] = json!(secs);
        }
        store.configure(&form).unwrap();
        store
    }

    fn completed(job: &str, result: RunResult) -> Run {
        Run::new(job, "#1", result)
    }

    #[tokio::test]
    async fn empty_command_spawns_nothing_and_writes_nothing() {
        let hook = ShellHook::new(unconfigured_store());
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Success), &sink)
            .await
            .unwrap();

        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn output_is_logged_with_line_separators_preserved() {
        let hook = ShellHook::new(configured_store("printf 'a\\nb\\n'", None));
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Success), &sink)
            .await
            .unwrap();

        assert_eq!(sink.contents(), "a\nb\n");
    }

    #[tokio::test]
    async fn stderr_is_captured_into_the_same_log() {
        let hook = ShellHook::new(configured_store("echo out; echo err >&2", None));
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Success), &sink)
            .await
            .unwrap();

        assert_eq!(sink.contents(), "out\nerr\n");
    }

    #[tokio::test]
    async fn run_details_override_ambient_environment() {
        std::env::set_var("JOB_NAME", "ambient-job");
        std::env::set_var("RESULT", "AMBIENT");

        let hook = ShellHook::new(configured_store("printf '%s %s' \"$JOB_NAME\" \"$RESULT\"", None));
        let sink = BufferSink::new();

        hook.on_completed(&completed("nightly-build", RunResult::Unstable), &sink)
            .await
            .unwrap();

        assert_eq!(sink.contents(), "nightly-build UNSTABLE");
    }

    #[tokio::test]
    async fn spawn_failure_becomes_a_diagnostic_line() {
        let store = configured_store("echo hi", None);
        let hook = ShellHook::builder(store)
            .shell("/nonexistent/shell")
            .build();
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Success), &sink)
            .await
            .unwrap();

        let contents = sink.contents();
        assert!(contents.starts_with("shell hook failed to start:"), "{contents}");
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn nonzero_exit_is_surfaced_without_failing_the_hook() {
        let hook = ShellHook::new(configured_store("echo partial; exit 3", None));
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Failure), &sink)
            .await
            .unwrap();

        let contents = sink.contents();
        assert!(contents.contains("partial\n"), "{contents}");
        assert!(contents.contains("shell hook exited with status 3"), "{contents}");
    }

    #[tokio::test]
    async fn timeout_kills_the_command_and_logs_it() {
        let hook = ShellHook::new(configured_store("sleep 30", Some(1)));
        let sink = BufferSink::new();

        hook.on_completed(&completed("deploy", RunResult::Success), &sink)
            .await
            .unwrap();

        assert!(
            sink.contents().contains("timed out after 1s"),
            "{}",
            sink.contents()
        );
    }

    #[tokio::test]
    async fn concurrent_completions_see_their_own_run() {
        let store = configured_store("sleep 1; printf '%s:%s' \"$JOB_NAME\" \"$RESULT\"", None);
        let hook = Arc::new(ShellHook::new(store));

        let sink_a = BufferSink::new();
        let sink_b = BufferSink::new();
        let run_a = completed("alpha", RunResult::Success);
        let run_b = completed("beta", RunResult::Failure);

        let (a, b) = tokio::join!(
            hook.on_completed(&run_a, &sink_a),
            hook.on_completed(&run_b, &sink_b),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(sink_a.contents(), "alpha:SUCCESS");
        assert_eq!(sink_b.contents(), "beta:FAILURE");
    }
}
