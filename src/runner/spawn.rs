//! Process spawning abstraction
//!
//! The engine only needs short-lived, fire-and-capture text-producing
//! subprocesses: run a shell command line, collect merged output, report
//! the exit code, and support cancellation mid-run. `ShellSpawner` is the
//! real implementation; tests substitute a programmable fake (see
//! [`crate::testing`]).

use std::process::Stdio;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Captured result of one finished subprocess
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Merged stdout + stderr
    pub text: String,
    /// Exit code; -1 when terminated by a signal
    pub exit_code: i32,
}

/// Result of an asynchronous run that may be cancelled
#[derive(Debug, Clone)]
pub enum SpawnOutcome {
    /// The process ran to completion
    Completed(ProcessOutput),
    /// The run was cancelled and the process killed
    Cancelled,
}

/// Starts subprocesses for the command runner and job scheduler
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Run a shell command line to completion, or until cancelled
    ///
    /// # Errors
    ///
    /// Returns an I/O error only when the process could not be created at
    /// all; backend-reported failures are carried in the output.
    async fn run(
        &self,
        command: &str,
        cancel: CancellationToken,
    ) -> std::io::Result<SpawnOutcome>;

    /// Run a shell command line, blocking the calling thread
    ///
    /// Used by the synchronous lookup path and the existence probe.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the process could not be created.
    fn run_blocking(&self, command: &str) -> std::io::Result<ProcessOutput>;
}

/// Spawner backed by `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellSpawner;

#[async_trait]
impl ProcessSpawner for ShellSpawner {
    async fn run(
        &self,
        command: &str,
        cancel: CancellationToken,
    ) -> std::io::Result<SpawnOutcome> {
        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let wait = child.wait_with_output();
        tokio::pin!(wait);
        tokio::select! {
            // Dropping the in-flight wait future kills the child via
            // kill_on_drop; already-exited processes are unaffected.
            () = cancel.cancelled() => Ok(SpawnOutcome::Cancelled),
            output = &mut wait => {
                let output = output?;
                Ok(SpawnOutcome::Completed(merge_output(
                    &output.stdout,
                    &output.stderr,
                    output.status.code(),
                )))
            }
        }
    }

    fn run_blocking(&self, command: &str) -> std::io::Result<ProcessOutput> {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()?;
        Ok(merge_output(
            &output.stdout,
            &output.stderr,
            output.status.code(),
        ))
    }
}

fn merge_output(stdout: &[u8], stderr: &[u8], code: Option<i32>) -> ProcessOutput {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(stderr));
    ProcessOutput {
        text,
        exit_code: code.unwrap_or(-1),
    }
}
