use crate::listeners::listener::RunListener;
use crate::run::{LogSink, Run};
use std::sync::Arc;
use tracing::warn;

/// Dispatches run-completion events to every registered listener.
///
/// Listener failures are logged and contained: a broken listener can never
/// alter the outcome of the run it observes, nor stop later listeners from
/// firing.
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn RunListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: Arc<dyn RunListener>) {
        self.listeners.push(listener);
    }

    /// Fire all listeners for a completed run, in registration order.
    pub async fn fire_completed(&self, run: &Run, log: &dyn LogSink) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_completed(run, log).await {
                warn!(job = %run.job_name, run = %run.name, "run listener failed: {e:#}");
            }
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
