//! Job identity and lifecycle outcome types.
//!
//! A job is one supervised external process invocation. Exactly one
//! [`JobOutcome`] is produced per job over its lifetime; this is the central
//! invariant enforced by the supervisor.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::analysis::ClipCandidate;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one supervised job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
    /// Allocates the next job id.
    pub fn next() -> Self {
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// The kind of external worker a job supervises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Clip detection worker: emits newline-delimited JSON on stdout.
    Analysis,
    /// Encoder worker: no structured stdout, success is exit code 0.
    Encode,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Analysis => write!(f, "analysis"),
            JobKind::Encode => write!(f, "encode"),
        }
    }
}

/// The external command a supervisor runs.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub kind: JobKind,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl JobSpec {
    pub fn new(kind: JobKind, program: PathBuf, args: Vec<String>) -> Self {
        Self {
            kind,
            program,
            args,
        }
    }

    /// The program name used in failure reasons and log lines.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }
}

/// Payload delivered with a completed job.
///
/// For analysis jobs this carries the detected clips and waveform preview
/// from the worker's structured `complete` message. For encode jobs, and for
/// analysis jobs that exited 0 without a structured completion, the payload
/// is synthesized empty and `synthesized` is set.
#[derive(Debug, Clone, Default)]
pub struct CompletionPayload {
    pub clips: Vec<ClipCandidate>,
    pub waveform: Vec<f32>,
    pub synthesized: bool,
}

/// Why a job failed, from most to least specific.
#[derive(Debug, Clone)]
pub enum FailureReason {
    /// The worker binary could not be launched at all.
    Launch(String),
    /// The worker reported a structured error message; surfaced verbatim.
    WorkerReported(String),
    /// Nonzero exit or signal with no structured error. `detail` carries
    /// escalated stderr text when the heuristic found failure vocabulary,
    /// otherwise a generic code-based message.
    AbnormalExit { code: String, detail: String },
}

impl FailureReason {
    /// The single most specific reason string available, for display.
    pub fn message(&self) -> String {
        match self {
            FailureReason::Launch(reason) => reason.clone(),
            FailureReason::WorkerReported(error) => error.clone(),
            FailureReason::AbnormalExit { detail, .. } => detail.clone(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Launch(reason) => write!(f, "launch failure: {reason}"),
            FailureReason::WorkerReported(error) => write!(f, "{error}"),
            FailureReason::AbnormalExit { code, detail } => {
                write!(f, "process exited with {code}: {detail}")
            }
        }
    }
}

/// The exactly-once terminal outcome of a job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(CompletionPayload),
    Failed(FailureReason),
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}
