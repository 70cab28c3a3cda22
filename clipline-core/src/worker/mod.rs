//! Worker process plumbing: spawning, stream framing, and message
//! classification for external analysis and encoder processes.

pub mod framing;
pub mod message;
pub mod process;

pub use framing::LineFramer;
pub use message::{classify, WorkerMessage};
pub use process::WorkerProcess;

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{CoreError, CoreResult};

/// Verifies that a worker binary can be launched before any job starts.
///
/// Runs `<program> -version` with output discarded; only the ability to start
/// the process matters. Absence maps to `LaunchFailure` so the caller can
/// surface an "install the missing tool" remediation up front instead of a
/// mid-batch failure.
pub fn check_dependency(program: &Path) -> CoreResult<()> {
    let result = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", program.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", program.display());
            Err(CoreError::LaunchFailure {
                program: program.to_string_lossy().into_owned(),
                reason: "binary not found in PATH".to_string(),
            })
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check for '{}': {}",
                program.display(),
                e
            );
            Err(CoreError::LaunchFailure {
                program: program.to_string_lossy().into_owned(),
                reason: e.to_string(),
            })
        }
    }
}

/// Decides whether captured stderr text indicates an actual failure.
///
/// Workers interleave harmless status chatter with real errors on stderr, so
/// this is a vocabulary heuristic, not a guarantee. It is kept as an isolated
/// function so it can be tuned and unit-tested against real stderr samples
/// without touching the process lifecycle code.
pub fn looks_like_failure(stderr_text: &str) -> bool {
    const FAILURE_MARKERS: &[&str] = &[
        "error",
        "failed",
        "fatal",
        "cannot",
        "unable to",
        "invalid",
        "no such file",
        "permission denied",
        "not found",
        "unrecognized",
    ];

    let lowered = stderr_text.to_lowercase();
    FAILURE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Filters encoder stderr lines that look alarming but never indicate actual
/// problems, so they do not pollute a surfaced failure reason.
pub fn is_non_critical_encoder_message(message: &str) -> bool {
    message.contains("deprecated pixel format")
        || message.contains("Timestamps are unset")
        || message.contains("Stream map")
        || message.contains("automatically inserted filter")
        || message.contains("Queue input is backward")
        || message.contains("first frame is no keyframe")
        || message.contains("does not match the corresponding codec")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Corpus of real-world stderr lines the heuristic must classify.
    #[test]
    fn test_failure_vocabulary_detected() {
        assert!(looks_like_failure(
            "out.mp4: Permission denied"
        ));
        assert!(looks_like_failure(
            "Error opening input file missing.mkv: No such file or directory"
        ));
        assert!(looks_like_failure("Conversion failed!"));
        assert!(looks_like_failure("Unable to find a suitable output format"));
        assert!(looks_like_failure("Invalid data found when processing input"));
        assert!(looks_like_failure("Unrecognized option 'frobnicate'."));
    }

    #[test]
    fn test_benign_chatter_passes() {
        assert!(!looks_like_failure(
            "frame=  250 fps=125 q=28.0 size=    1024kB time=00:00:10.00"
        ));
        assert!(!looks_like_failure(
            "Output #0, mp4, to 'clip_001.mp4':"
        ));
        assert!(!looks_like_failure("Press [q] to stop, [?] for help"));
        assert!(!looks_like_failure(""));
    }

    #[test]
    fn test_non_critical_encoder_messages() {
        assert!(is_non_critical_encoder_message(
            "deprecated pixel format used, make sure you did set range correctly"
        ));
        assert!(is_non_critical_encoder_message(
            "Timestamps are unset in a packet for stream 0"
        ));
        assert!(!is_non_critical_encoder_message(
            "Error while decoding stream #0:0: Invalid data found"
        ));
    }
}
