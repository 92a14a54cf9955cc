//! Delayed delivery of controller events.

use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::events::{ChatEvent, EventSender};

/// Handle to a scheduled event. Dropping it does not cancel delivery.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<AbortHandle>,
}

impl ScheduledTask {
    pub fn new(handle: AbortHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// A task with nothing behind it, already finished.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Stop the event from being delivered if it hasn't been yet.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

pub trait Scheduler: Send + Sync {
    /// Send `event` on `tx` after `delay`.
    fn schedule(&self, delay: Duration, tx: EventSender, event: ChatEvent) -> ScheduledTask;
}

/// Timers on the tokio runtime. Must be called from within a runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, tx: EventSender, event: ChatEvent) -> ScheduledTask {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                trace!("controller gone, dropping scheduled event");
            }
        });
        ScheduledTask::new(task.abort_handle())
    }
}
