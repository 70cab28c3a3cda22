//! Core library for the clipline clip detection and export system.
//!
//! This crate is the media job orchestration layer: it launches and
//! supervises external worker processes (a clip analysis worker and an
//! encoder), parses their streamed output into typed progress/result/error
//! events, rate-limits what reaches the presentation layer, sequences
//! multi-clip export batches with per-item and aggregate outcomes, and maps
//! playback positions onto an edited (gap-removed) timeline.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipline_core::{analysis_job, batch_from_clips, CoreConfig, EventDispatcher, ExportBatch, JobOutcome};
//! use std::path::{Path, PathBuf};
//!
//! let mut config = CoreConfig::new(PathBuf::from("/path/to/output"));
//! config.encode_copy_streams = true;
//! config.validate().unwrap();
//!
//! let events = EventDispatcher::new();
//! let input = Path::new("/path/to/recording.mkv");
//!
//! // Detect clip-worthy segments.
//! let supervisor = analysis_job(&config, input);
//! let report = match supervisor.run(&events) {
//!     JobOutcome::Completed(payload) => clipline_core::AnalysisReport::from(payload),
//!     other => panic!("analysis did not complete: {other:?}"),
//! };
//!
//! // Export each detected clip as its own file.
//! let items = batch_from_clips(&config, input, &report.clips);
//! let summary = ExportBatch::new(items).unwrap().run(&config, &events);
//! println!("{} succeeded, {} failed", summary.succeeded_count, summary.failed_count);
//! ```

pub mod analysis;
pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod jobs;
pub mod media;
pub mod notifications;
pub mod supervise;
pub mod throttle;
pub mod timeline;
pub mod utils;
pub mod worker;

// Re-exports for public API
pub use analysis::{analysis_job, analysis_spec, AnalysisReport, ClipCandidate, ClipPlan};
pub use batch::{BatchCancelHandle, BatchId, BatchItem, BatchSummary, ExportBatch, ItemOutcome};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use events::{EventDispatcher, EventHandler, JobEvent};
pub use export::{batch_from_clips, batch_from_kept_segments, clip_output_path, encode_spec};
pub use jobs::{CompletionPayload, FailureReason, JobId, JobKind, JobOutcome, JobSpec};
pub use media::{probe_media, MediaSummary};
pub use notifications::{Notifier, NtfyNotifier};
pub use supervise::{CancelHandle, JobSupervisor};
pub use throttle::ProgressGate;
pub use timeline::{
    derive_edit_segments, EditSegment, PlaybackAction, PlaybackController, TimeRange,
};
pub use utils::{format_bytes, format_duration, format_media_time};
pub use worker::check_dependency;
