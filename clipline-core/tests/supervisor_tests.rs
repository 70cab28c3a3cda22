// clipline-core/tests/supervisor_tests.rs
//
// End-to-end supervisor behavior against small /bin/sh fixture workers:
// terminal-state resolution, the exactly-one-terminal-event invariant, and
// cancellation semantics.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipline_core::events::{EventDispatcher, EventHandler, JobEvent};
use clipline_core::jobs::{FailureReason, JobKind, JobOutcome, JobSpec};
use clipline_core::supervise::JobSupervisor;
use clipline_core::CoreConfig;

/// Collects every dispatched event for later assertions.
#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<JobEvent>>,
}

impl RecordingHandler {
    fn collected(&self) -> Vec<JobEvent> {
        self.events.lock().expect("event lock").clone()
    }

    fn terminal_count(&self) -> usize {
        self.collected()
            .iter()
            .filter(|e| e.is_job_terminal())
            .count()
    }
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &JobEvent) {
        self.events.lock().expect("event lock").push(event.clone());
    }
}

fn test_config() -> CoreConfig {
    let mut config = CoreConfig::new(PathBuf::from("/tmp/clipline-tests"));
    // Forward every progress event so assertions are deterministic.
    config.min_progress_delta = 0.0;
    config.min_progress_interval = Duration::from_millis(0);
    config
}

fn sh_job(kind: JobKind, script: &str) -> JobSpec {
    JobSpec::new(
        kind,
        PathBuf::from("/bin/sh"),
        vec!["-c".to_string(), script.to_string()],
    )
}

fn dispatcher_with(handler: Arc<RecordingHandler>) -> EventDispatcher {
    let mut events = EventDispatcher::new();
    events.add_handler(handler);
    events
}

#[test]
fn test_structured_completion() {
    let script = r#"printf '%s\n' \
        '{"type":"progress","step":"scan","progress":10,"message":"warming up"}' \
        'plain diagnostic line' \
        '{"type":"progress","step":"detect","progress":80,"message":""}' \
        '{"type":"complete","clips":[{"start":1.5,"end":4.0,"score":0.9}],"waveform":[0.25,0.5]}'"#;

    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(sh_job(JobKind::Analysis, script), &test_config());

    let outcome = supervisor.run(&events);

    let payload = match outcome {
        JobOutcome::Completed(payload) => payload,
        other => panic!("expected completion, got {other:?}"),
    };
    assert!(!payload.synthesized);
    assert_eq!(payload.clips.len(), 1);
    assert_eq!(payload.clips[0].start, 1.5);
    assert_eq!(payload.waveform, vec![0.25, 0.5]);

    let collected = handler.collected();
    assert_eq!(handler.terminal_count(), 1);
    assert!(collected.last().expect("events").is_job_terminal());
    assert!(collected
        .iter()
        .any(|e| matches!(e, JobEvent::Progress { step, .. } if step == "detect")));
    assert!(collected
        .iter()
        .any(|e| matches!(e, JobEvent::Diagnostic { line, .. } if line == "plain diagnostic line")));
}

#[test]
fn test_exit_zero_without_completion_synthesizes_success() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(
        sh_job(JobKind::Analysis, "echo 'just chatter'; exit 0"),
        &test_config(),
    );

    match supervisor.run(&events) {
        JobOutcome::Completed(payload) => {
            assert!(payload.synthesized);
            assert!(payload.clips.is_empty());
        }
        other => panic!("expected synthesized completion, got {other:?}"),
    }
    assert_eq!(handler.terminal_count(), 1);
}

#[test]
fn test_worker_reported_error_is_authoritative() {
    // The structured error wins over the exit code and is surfaced verbatim.
    let script = r#"printf '%s\n' '{"type":"error","error":"model file is corrupt"}'; exit 3"#;
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(sh_job(JobKind::Analysis, script), &test_config());

    match supervisor.run(&events) {
        JobOutcome::Failed(FailureReason::WorkerReported(message)) => {
            assert_eq!(message, "model file is corrupt");
        }
        other => panic!("expected worker-reported failure, got {other:?}"),
    }
    assert_eq!(handler.terminal_count(), 1);
}

#[test]
fn test_abnormal_exit_carries_code() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(
        sh_job(JobKind::Analysis, "exit 7"),
        &test_config(),
    );

    match supervisor.run(&events) {
        JobOutcome::Failed(FailureReason::AbnormalExit { code, detail }) => {
            assert_eq!(code, "code 7");
            assert!(detail.contains("code 7"), "generic detail expected: {detail}");
        }
        other => panic!("expected abnormal exit, got {other:?}"),
    }
    assert_eq!(handler.terminal_count(), 1);
}

#[test]
fn test_encoder_stderr_surfaces_on_nonzero_exit() {
    let script = "echo 'Error opening output file: Permission denied' >&2; exit 1";
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(sh_job(JobKind::Encode, script), &test_config());

    match supervisor.run(&events) {
        JobOutcome::Failed(FailureReason::AbnormalExit { detail, .. }) => {
            assert!(detail.contains("Permission denied"), "got: {detail}");
        }
        other => panic!("expected abnormal exit, got {other:?}"),
    }
}

#[test]
fn test_launch_failure_for_missing_binary() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let spec = JobSpec::new(
        JobKind::Analysis,
        PathBuf::from("/nonexistent/clipline-worker"),
        vec![],
    );
    let supervisor = JobSupervisor::new(spec, &test_config());

    match supervisor.run(&events) {
        JobOutcome::Failed(FailureReason::Launch(_)) => {}
        other => panic!("expected launch failure, got {other:?}"),
    }
    // No JobStarted for a process that never launched; still exactly one
    // terminal event.
    assert_eq!(handler.terminal_count(), 1);
    assert!(!handler
        .collected()
        .iter()
        .any(|e| matches!(e, JobEvent::JobStarted { .. })));
}

#[test]
fn test_cancel_maps_to_cancelled_not_failed() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(
        sh_job(JobKind::Analysis, "sleep 30"),
        &test_config(),
    );
    let cancel = supervisor.cancel_handle();

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        cancel.cancel();
    });

    let outcome = supervisor.run(&events);
    canceller.join().expect("canceller thread");

    assert!(matches!(outcome, JobOutcome::Cancelled));
    assert_eq!(handler.terminal_count(), 1);
    assert!(matches!(
        handler.collected().last(),
        Some(JobEvent::JobCancelled { .. })
    ));
}

#[test]
fn test_cancel_after_terminal_is_noop() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(sh_job(JobKind::Analysis, "exit 0"), &test_config());
    let cancel = supervisor.cancel_handle();

    let outcome = supervisor.run(&events);
    assert!(matches!(outcome, JobOutcome::Completed(_)));

    // Cancelling a job already in a terminal state changes nothing.
    cancel.cancel();
    cancel.cancel();
    assert!(!cancel.is_cancel_requested());
    assert_eq!(handler.terminal_count(), 1);
}

#[test]
fn test_cancel_before_run_short_circuits() {
    let handler = Arc::new(RecordingHandler::default());
    let events = dispatcher_with(handler.clone());
    let supervisor = JobSupervisor::new(
        sh_job(JobKind::Analysis, "echo should-not-run"),
        &test_config(),
    );
    supervisor.cancel_handle().cancel();

    assert!(matches!(supervisor.run(&events), JobOutcome::Cancelled));
    assert_eq!(handler.terminal_count(), 1);
    assert!(!handler
        .collected()
        .iter()
        .any(|e| matches!(e, JobEvent::JobStarted { .. })));
}
