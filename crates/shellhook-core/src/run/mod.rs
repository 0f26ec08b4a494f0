use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Terminal status of a completed run, as reported by the host server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
}

impl RunResult {
    /// Token exported to the hook subprocess as the `RESULT` variable.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
            Self::NotBuilt => "NOT_BUILT",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of one completed run, supplied by the host at dispatch time.
///
/// The host owns run identity; listeners only read from this and write to the
/// run's [`LogSink`].
#[derive(Debug, Clone)]
pub struct Run {
    /// Name of the parent job/pipeline the run belongs to.
    pub job_name: String,
    /// Identifier of this particular run (e.g. `"#42"`).
    pub name: String,
    /// Terminal result the host settled on.
    pub result: RunResult,
}

impl Run {
    pub fn new(job_name: impl Into<String>, name: impl Into<String>, result: RunResult) -> Self {
        Self {
            job_name: job_name.into(),
            name: name.into(),
            result,
        }
    }
}

/// Append-only text channel attached to a specific run's log.
///
/// Delivery is the host's concern; appends are infallible from the listener's
/// point of view.
pub trait LogSink: Send + Sync {
    fn append(&self, text: &str);

    fn append_line(&self, text: &str) {
        self.append(text);
        self.append("\n");
    }
}

/// In-memory [`LogSink`] collecting everything appended to it.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: Mutex<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buf.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl LogSink for BufferSink {
    fn append(&self, text: &str) {
        self.buf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
    }
}
