//! Command transports: where the pool command lines actually run.
//!
//! The `Transport` trait keeps the sources independent of how the commands
//! reach a shell, so the same pipeline runs against a remote pool host over
//! SSH, the local machine, or canned output in tests.

use std::process::Command;

use super::FetchError;

/// Runs one command line and returns its stdout.
pub trait Transport {
    fn run(&mut self, cmdline: &str) -> Result<String, FetchError>;
}

/// Runs commands on a remote host via `ssh <target> <cmdline>`.
///
/// Authentication and retry policy belong to the ssh configuration, not to
/// this pipeline; a failed login surfaces as a plain command failure.
pub struct SshTransport {
    target: String,
}

impl SshTransport {
    /// Creates a transport for a `user@host` target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Transport for SshTransport {
    fn run(&mut self, cmdline: &str) -> Result<String, FetchError> {
        let output = Command::new("ssh")
            .arg(&self.target)
            .arg(cmdline)
            .output()
            .map_err(|e| FetchError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(FetchError::Command {
                cmdline: cmdline.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runs commands locally through `sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for LocalTransport {
    fn run(&mut self, cmdline: &str) -> Result<String, FetchError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmdline)
            .output()
            .map_err(|e| FetchError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(FetchError::Command {
                cmdline: cmdline.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
