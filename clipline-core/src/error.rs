use thiserror::Error;

/// Custom error types for clipline
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker binary could not be located or executed. This is distinct
    /// from a nonzero exit code: the remediation is "install the missing
    /// tool", not "inspect the job".
    #[error("Failed to launch '{program}': {reason}")]
    LaunchFailure { program: String, reason: String },

    #[error("Worker reported an error: {0}")]
    WorkerReported(String),

    #[error("'{program}' exited abnormally ({code}): {detail}")]
    AbnormalExit {
        program: String,
        code: String,
        detail: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("Media probe failed: {0}")]
    MediaProbe(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for clipline operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `LaunchFailure` from a spawn error.
pub fn launch_failure(program: &str, err: &std::io::Error) -> CoreError {
    let reason = if err.kind() == std::io::ErrorKind::NotFound {
        format!("binary not found in PATH ({err})")
    } else {
        err.to_string()
    };
    CoreError::LaunchFailure {
        program: program.to_string(),
        reason,
    }
}
