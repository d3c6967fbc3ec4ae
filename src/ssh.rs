//! Invocation of the system ssh client.
//!
//! qssh never talks SSH itself; it either hands the terminal to an `ssh`
//! child process or captures `ssh`'s usage text for `qssh -h`.

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

/// The operations qssh needs from an ssh client
pub trait SshClient {
    /// Run ssh with `args` attached to the current terminal and wait for it.
    ///
    /// Returns the child's exit code, or `None` if it was killed by a signal.
    fn run(&self, args: &[OsString]) -> Result<Option<i32>>;

    /// The client's own usage text (what it prints when run without arguments).
    fn usage(&self) -> Result<String>;
}

/// An ssh client found on `PATH` (or any program standing in for it)
#[derive(Debug, Clone)]
pub struct SystemSsh {
    program: OsString,
}

impl SystemSsh {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
        }
    }
}

impl SshClient for SystemSsh {
    fn run(&self, args: &[OsString]) -> Result<Option<i32>> {
        tracing::debug!(program = ?self.program, ?args, "spawning ssh");

        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to launch {}", self.program.to_string_lossy()))?;

        tracing::debug!(%status, "ssh exited");
        Ok(status.code())
    }

    fn usage(&self) -> Result<String> {
        // ssh prints usage on stderr and exits non-zero; the status is irrelevant
        let output = Command::new(&self.program)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {}", self.program.to_string_lossy()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
