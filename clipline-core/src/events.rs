//! Typed events relayed from the orchestration layer to the presentation
//! layer.
//!
//! Handlers registered on an [`EventDispatcher`] receive events in the order
//! they were produced on the worker's stream; the terminal event for a job is
//! always the last event emitted for that job.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::batch::{BatchId, BatchSummary};
use crate::jobs::{CompletionPayload, FailureReason, JobId, JobKind};

#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A worker process was spawned and its stream is being read.
    JobStarted { job_id: JobId, kind: JobKind },

    /// Throttled progress update. `percent` is on a 0-100 scale and is not
    /// strictly monotonic; consumers must tolerate small regressions.
    Progress {
        job_id: JobId,
        step: String,
        percent: f32,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A stdout line that did not decode as a structured message. Opaque
    /// diagnostic text, never an error by itself.
    Diagnostic { job_id: JobId, line: String },

    /// Terminal: the job completed.
    JobCompleted {
        job_id: JobId,
        payload: CompletionPayload,
    },

    /// Terminal: the job failed.
    JobFailed { job_id: JobId, reason: FailureReason },

    /// Terminal: the job was cancelled. Neutral outcome, not an error.
    JobCancelled { job_id: JobId },

    /// A batch item is about to start. Emitted before the item's job events.
    ItemStarted {
        batch_id: BatchId,
        item_index: usize,
        total: usize,
        item_id: String,
    },

    /// Terminal event of a whole batch run.
    BatchCompleted {
        batch_id: BatchId,
        summary: BatchSummary,
    },
}

impl JobEvent {
    /// Whether this event is the terminal event of a single job.
    pub fn is_job_terminal(&self) -> bool {
        matches!(
            self,
            JobEvent::JobCompleted { .. } | JobEvent::JobFailed { .. } | JobEvent::JobCancelled { .. }
        )
    }
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &JobEvent);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: JobEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
