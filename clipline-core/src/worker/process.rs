//! Thin wrapper around one spawned worker process.
//!
//! Owns the child's piped streams and exit lifecycle. A spawn failure is a
//! `LaunchFailure`; anything after a successful spawn is resolved by the
//! supervisor from the streams and the exit status.

use std::io;
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

use crate::error::{launch_failure, CoreResult};

/// One spawned worker process with piped stdout/stderr.
pub struct WorkerProcess {
    child: Arc<Mutex<Child>>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl WorkerProcess {
    /// Spawns the worker. stdin is closed; stdout and stderr are piped.
    pub fn spawn(program: &Path, args: &[String]) -> CoreResult<Self> {
        log::debug!(
            "Spawning worker: {} {}",
            program.display(),
            args.join(" ")
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| launch_failure(&program.to_string_lossy(), &e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        Ok(Self {
            child: Arc::new(Mutex::new(child)),
            stdout,
            stderr,
        })
    }

    /// Takes ownership of the stdout pipe. Present until first taken.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Takes ownership of the stderr pipe. Present until first taken.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// A cloneable handle that can terminate the process from another thread.
    pub fn killer(&self) -> ProcessKiller {
        ProcessKiller {
            child: Arc::clone(&self.child),
        }
    }

    /// Waits for the process to exit and returns its status.
    ///
    /// Reaps with `try_wait` so the child lock is never held across a
    /// blocking wait; a concurrent `kill` from a cancel handle can always
    /// acquire it. By the time the caller gets here the output streams have
    /// hit EOF, so the first check almost always succeeds.
    pub fn wait(&self) -> io::Result<ExitStatus> {
        loop {
            {
                let mut child = self
                    .child
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                if let Some(status) = child.try_wait()? {
                    return Ok(status);
                }
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
    }
}

/// Terminates a worker process. Safe to call from any thread; killing an
/// already-exited process is a no-op.
#[derive(Clone)]
pub struct ProcessKiller {
    child: Arc<Mutex<Child>>,
}

impl ProcessKiller {
    pub fn kill(&self) {
        let mut child = self
            .child
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = child.kill() {
            // InvalidInput means the process already exited.
            if e.kind() != io::ErrorKind::InvalidInput {
                log::debug!("Failed to kill worker process: {e}");
            }
        }
    }
}

/// Renders an exit status as the code string used in failure reasons.
pub fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {code}"),
        None => "signal".to_string(),
    }
}
