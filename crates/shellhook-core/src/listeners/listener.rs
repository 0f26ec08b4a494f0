use crate::run::{LogSink, Run};
use anyhow::Result;
use async_trait::async_trait;

/// A listener the host invokes exactly once per completed run.
///
/// `log` is the run's own append-only log. Returning an error never affects
/// the run's result; the dispatching [`ListenerRegistry`] logs it and moves
/// on.
///
/// [`ListenerRegistry`]: crate::listeners::ListenerRegistry
#[async_trait]
pub trait RunListener: Send + Sync {
    async fn on_completed(&self, run: &Run, log: &dyn LogSink) -> Result<()>;
}
