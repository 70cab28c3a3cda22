//! Supervision of one worker process from spawn to terminal state.
//!
//! A [`JobSupervisor`] owns the full lifecycle of a single job: it spawns the
//! worker, frames and classifies its stdout stream, throttles progress toward
//! the registered event handlers, drains stderr on a helper thread, and
//! resolves exactly one terminal outcome from the accumulated messages and
//! the exit status. `run` consumes the supervisor, so a job cannot be
//! restarted and the single-terminal-event guarantee holds by construction.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info};

use crate::config::CoreConfig;
use crate::events::{EventDispatcher, JobEvent};
use crate::jobs::{CompletionPayload, FailureReason, JobId, JobKind, JobOutcome, JobSpec};
use crate::throttle::ProgressGate;
use crate::worker::process::{describe_exit, ProcessKiller, WorkerProcess};
use crate::worker::{classify, is_non_critical_encoder_message, looks_like_failure, LineFramer, WorkerMessage};

/// Requests cancellation of a running job.
///
/// Cloneable and safe to call from any thread. Cancelling is idempotent, and
/// calling it on a job that already reached a terminal state is a no-op. A
/// caller that starts a job logically superseding a running one must cancel
/// the previous handle first.
#[derive(Clone)]
pub struct CancelHandle {
    requested: Arc<AtomicBool>,
    terminal: Arc<AtomicBool>,
    killer: Arc<Mutex<Option<ProcessKiller>>>,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            terminal: Arc::new(AtomicBool::new(false)),
            killer: Arc::new(Mutex::new(None)),
        }
    }

    /// Requests cancellation and terminates the worker process if one is
    /// running.
    pub fn cancel(&self) {
        if self.terminal.load(Ordering::SeqCst) {
            return;
        }
        if self.requested.swap(true, Ordering::SeqCst) {
            return;
        }
        let killer = self
            .killer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(killer) = killer.as_ref() {
            killer.kill();
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn register_killer(&self, killer: ProcessKiller) {
        {
            let mut slot = self
                .killer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = Some(killer.clone());
        }
        // A cancel that raced the spawn still terminates the process.
        if self.requested.load(Ordering::SeqCst) {
            killer.kill();
        }
    }

    fn mark_terminal(&self) {
        self.terminal.store(true, Ordering::SeqCst);
        let mut slot = self
            .killer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

/// Supervises one worker process for its whole lifecycle.
pub struct JobSupervisor {
    job_id: JobId,
    spec: JobSpec,
    gate: ProgressGate,
    cancel: CancelHandle,
}

impl JobSupervisor {
    pub fn new(spec: JobSpec, config: &CoreConfig) -> Self {
        Self {
            job_id: JobId::next(),
            spec,
            gate: ProgressGate::from_config(config),
            cancel: CancelHandle::new(),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// A handle that can cancel this job from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs the job to its terminal state, emitting events along the way.
    ///
    /// Exactly one terminal event (`JobCompleted`, `JobFailed`, or
    /// `JobCancelled`) is emitted, always last, and the matching
    /// [`JobOutcome`] is returned.
    pub fn run(mut self, events: &EventDispatcher) -> JobOutcome {
        let started_at = Instant::now();
        let program_name = self.spec.program_name();

        if self.cancel.is_cancel_requested() {
            return self.finish(events, JobOutcome::Cancelled);
        }

        let mut process = match WorkerProcess::spawn(&self.spec.program, &self.spec.args) {
            Ok(process) => process,
            Err(e) => {
                let reason = FailureReason::Launch(e.to_string());
                return self.finish(events, JobOutcome::Failed(reason));
            }
        };
        self.cancel.register_killer(process.killer());

        events.emit(JobEvent::JobStarted {
            job_id: self.job_id,
            kind: self.spec.kind,
        });

        let stderr_text = spawn_stderr_drain(&mut process);

        let mut completion: Option<CompletionPayload> = None;
        let mut worker_error: Option<String> = None;

        if let Some(mut stdout) = process.take_stdout() {
            let mut framer = LineFramer::new();
            let mut buf = [0u8; 8192];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        for line in framer.feed(&buf[..n]) {
                            self.handle_line(&line, events, &mut completion, &mut worker_error);
                        }
                    }
                    Err(e) => {
                        debug!("{}: stdout read ended: {e}", self.job_id);
                        break;
                    }
                }
            }
            if let Some(line) = framer.finish() {
                self.handle_line(&line, events, &mut completion, &mut worker_error);
            }
        }

        let status = process.wait();
        let stderr_text = stderr_text
            .join()
            .unwrap_or_else(|_| String::new());

        // The cancellation flag is checked before the exit status: a killed
        // worker's nonzero exit maps to Cancelled, never Failed.
        let outcome = if self.cancel.is_cancel_requested() {
            JobOutcome::Cancelled
        } else {
            match status {
                Err(e) => JobOutcome::Failed(FailureReason::AbnormalExit {
                    code: "unknown".to_string(),
                    detail: format!("failed to collect exit status: {e}"),
                }),
                Ok(status) => {
                    if let Some(error) = worker_error {
                        JobOutcome::Failed(FailureReason::WorkerReported(error))
                    } else if let Some(payload) = completion {
                        // A zero exit corroborates the structured completion
                        // but is not required.
                        JobOutcome::Completed(payload)
                    } else if status.success() {
                        // Exit 0 without a structured completion: best-effort
                        // synthesized success.
                        JobOutcome::Completed(CompletionPayload {
                            synthesized: true,
                            ..CompletionPayload::default()
                        })
                    } else {
                        let code = describe_exit(status);
                        let detail =
                            failure_detail(self.spec.kind, &program_name, &code, &stderr_text);
                        JobOutcome::Failed(FailureReason::AbnormalExit { code, detail })
                    }
                }
            }
        };

        info!(
            "{} ({}) finished in {:.1}s",
            self.job_id,
            self.spec.kind,
            started_at.elapsed().as_secs_f64()
        );
        self.finish(events, outcome)
    }

    fn handle_line(
        &mut self,
        line: &str,
        events: &EventDispatcher,
        completion: &mut Option<CompletionPayload>,
        worker_error: &mut Option<String>,
    ) {
        if line.trim().is_empty() {
            return;
        }

        match classify(line) {
            Some(WorkerMessage::Progress {
                step,
                progress,
                message,
            }) => {
                // Once a resolution message arrived the job is logically
                // terminal; trailing progress is dropped.
                if completion.is_some() || worker_error.is_some() {
                    return;
                }
                let now = Instant::now();
                if self.gate.should_forward(&step, progress, now) {
                    self.gate.mark_forwarded(&step, progress, now);
                    events.emit(JobEvent::Progress {
                        job_id: self.job_id,
                        step,
                        percent: progress.clamp(0.0, 100.0),
                        message,
                        timestamp: Utc::now(),
                    });
                }
            }
            Some(WorkerMessage::Complete { clips, waveform }) => {
                if completion.is_some() {
                    debug!("{}: duplicate completion message ignored", self.job_id);
                    return;
                }
                *completion = Some(CompletionPayload {
                    clips,
                    waveform,
                    synthesized: false,
                });
            }
            Some(WorkerMessage::Error { error }) => {
                if worker_error.is_none() {
                    *worker_error = Some(error);
                }
            }
            None => {
                events.emit(JobEvent::Diagnostic {
                    job_id: self.job_id,
                    line: line.to_string(),
                });
            }
        }
    }

    fn finish(self, events: &EventDispatcher, outcome: JobOutcome) -> JobOutcome {
        self.cancel.mark_terminal();
        let event = match &outcome {
            JobOutcome::Completed(payload) => JobEvent::JobCompleted {
                job_id: self.job_id,
                payload: payload.clone(),
            },
            JobOutcome::Failed(reason) => JobEvent::JobFailed {
                job_id: self.job_id,
                reason: reason.clone(),
            },
            JobOutcome::Cancelled => JobEvent::JobCancelled {
                job_id: self.job_id,
            },
        };
        events.emit(event);
        outcome
    }
}

/// Drains stderr on a helper thread so the worker never blocks on a full
/// pipe. The collected text is only consulted at exit resolution.
fn spawn_stderr_drain(process: &mut WorkerProcess) -> thread::JoinHandle<String> {
    let stderr = process.take_stderr();
    thread::spawn(move || {
        let mut raw = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut raw);
        }
        String::from_utf8_lossy(&raw).into_owned()
    })
}

/// Picks the most specific failure detail available for an abnormal exit.
///
/// Encoder stderr is surfaced wholesale (minus known-noisy lines); analysis
/// stderr is surfaced only when the failure-vocabulary heuristic matches.
/// Everything else falls back to the generic code-based message.
fn failure_detail(kind: JobKind, program: &str, code: &str, stderr_text: &str) -> String {
    let relevant: Vec<&str> = stderr_text
        .lines()
        .filter(|line| !line.trim().is_empty() && !is_non_critical_encoder_message(line))
        .collect();
    let relevant = relevant.join("\n");

    let surfaced = match kind {
        JobKind::Encode => !relevant.is_empty(),
        JobKind::Analysis => looks_like_failure(&relevant),
    };

    if surfaced {
        relevant
    } else {
        format!("{program} exited with {code}")
    }
}
