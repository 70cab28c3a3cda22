//! Sequential batch export pipeline.
//!
//! Runs N independent encode jobs strictly one after another, so progress
//! stays comprehensible and no two jobs contend for the same source file.
//! A single item's failure never aborts the batch; outcomes are recorded per
//! item and folded into one summary. Cancelling skips every not-yet-started
//! item and cancels the in-flight job, keeping completed items as successes.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{EventDispatcher, JobEvent};
use crate::export::encode_spec;
use crate::jobs::JobOutcome;
use crate::supervise::{CancelHandle, JobSupervisor};

static NEXT_BATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(u64);

impl BatchId {
    pub fn next() -> Self {
        Self(NEXT_BATCH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch-{}", self.0)
    }
}

/// Recorded outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// Not started (or skipped by a batch-level cancel).
    Pending,
    Succeeded,
    Failed(String),
    /// The item's job was cancelled mid-flight. Neutral, not a failure.
    Cancelled,
}

/// One clip export in a batch: source, cut window, and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub item_id: String,
    pub source: std::path::PathBuf,
    pub clip_start: f64,
    pub clip_duration: f64,
    pub output: std::path::PathBuf,
    pub outcome: ItemOutcome,
}

/// Aggregate result of a batch run. Serializable as the resume manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    fn from_items(items: Vec<BatchItem>) -> Self {
        let succeeded_count = items
            .iter()
            .filter(|i| i.outcome == ItemOutcome::Succeeded)
            .count();
        let failed_count = items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed(_)))
            .count();
        Self {
            succeeded_count,
            failed_count,
            items,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded_count == self.items.len()
    }

    /// Items that failed, with their recorded reasons.
    pub fn failed_items(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed(_)))
    }

    /// Loads a summary written by a previous run, for resuming.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            CoreError::PathError(format!(
                "failed to read batch manifest '{}': {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            CoreError::OperationFailed(format!(
                "failed to parse batch manifest '{}': {e}",
                path.display()
            ))
        })
    }

    /// Writes the summary as a resume manifest.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let data = serde_json::to_string_pretty(self).map_err(|e| {
            CoreError::OperationFailed(format!("failed to serialize batch manifest: {e}"))
        })?;
        fs::write(path, data).map_err(|e| {
            CoreError::PathError(format!(
                "failed to write batch manifest '{}': {e}",
                path.display()
            ))
        })?;
        Ok(())
    }
}

/// Cancels a running batch: skips unstarted items and cancels the in-flight
/// job. Idempotent; a no-op once the batch has finished.
#[derive(Clone)]
pub struct BatchCancelHandle {
    requested: Arc<AtomicBool>,
    current: Arc<Mutex<Option<CancelHandle>>>,
}

impl BatchCancelHandle {
    fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = current.as_ref() {
            handle.cancel();
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn set_current(&self, handle: CancelHandle) {
        {
            let mut current = self
                .current
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *current = Some(handle.clone());
        }
        // A cancel that raced the item start still reaches the new job.
        if self.is_cancel_requested() {
            handle.cancel();
        }
    }
}

/// An ordered sequence of export items run sequentially to one summary.
pub struct ExportBatch {
    batch_id: BatchId,
    items: Vec<BatchItem>,
    cancel: BatchCancelHandle,
}

impl ExportBatch {
    /// Creates a batch over a fixed item sequence.
    ///
    /// Items that already carry a `Succeeded` outcome (from a resume
    /// manifest) are kept and skipped at run time. Duplicate output paths
    /// are rejected: no two jobs may target the same file.
    pub fn new(items: Vec<BatchItem>) -> CoreResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.output.clone()) {
                return Err(CoreError::PathError(format!(
                    "duplicate output path in batch: {}",
                    item.output.display()
                )));
            }
        }
        Ok(Self {
            batch_id: BatchId::next(),
            items,
            cancel: BatchCancelHandle::new(),
        })
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn cancel_handle(&self) -> BatchCancelHandle {
        self.cancel.clone()
    }

    /// Runs every item in order and returns the aggregate summary.
    ///
    /// Item `i + 1` starts only after item `i` reached a terminal state, so
    /// item events never interleave. The `BatchCompleted` event is emitted
    /// exactly once, after the last item.
    pub fn run(mut self, config: &CoreConfig, events: &EventDispatcher) -> BatchSummary {
        let total = self.items.len();

        for (index, item) in self.items.iter_mut().enumerate() {
            if self.cancel.is_cancel_requested() {
                // Not-yet-started items stay Pending.
                break;
            }
            if item.outcome == ItemOutcome::Succeeded {
                info!("{}: skipping already-exported {}", self.batch_id, item.item_id);
                continue;
            }

            events.emit(JobEvent::ItemStarted {
                batch_id: self.batch_id,
                item_index: index,
                total,
                item_id: item.item_id.clone(),
            });

            let spec = encode_spec(
                config,
                &item.source,
                item.clip_start,
                item.clip_duration,
                &item.output,
            );
            let supervisor = JobSupervisor::new(spec, config);
            self.cancel.set_current(supervisor.cancel_handle());

            item.outcome = match supervisor.run(events) {
                JobOutcome::Completed(_) => ItemOutcome::Succeeded,
                JobOutcome::Failed(reason) => ItemOutcome::Failed(reason.message()),
                JobOutcome::Cancelled => ItemOutcome::Cancelled,
            };
        }

        let summary = BatchSummary::from_items(self.items);
        info!(
            "{}: finished, {}/{} succeeded, {} failed",
            self.batch_id,
            summary.succeeded_count,
            summary.items.len(),
            summary.failed_count
        );
        events.emit(JobEvent::BatchCompleted {
            batch_id: self.batch_id,
            summary: summary.clone(),
        });
        summary
    }
}
