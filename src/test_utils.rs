//! Test utilities shared across test modules
//!
//! Fixtures for SSH config files plus stand-ins for the ssh client and the
//! interactive picker, so dispatch can be tested without a terminal.

use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::picker::Picker;
use crate::profiles::Profile;
use crate::ssh::SshClient;

/// Write `contents` as `.ssh/config` inside the temp directory
pub fn write_ssh_config(temp_dir: &TempDir, contents: &str) -> PathBuf {
    let ssh_dir = temp_dir.path().join(".ssh");
    std::fs::create_dir_all(&ssh_dir).unwrap();
    let path = ssh_dir.join("config");
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

/// An [`SshClient`] that records invocations instead of spawning ssh
#[derive(Debug, Default)]
pub struct RecordingSsh {
    calls: RefCell<Vec<Vec<OsString>>>,
    usage_requests: Cell<usize>,
    exit_code: i32,
    fail: bool,
}

impl RecordingSsh {
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Behaves like an ssh binary that cannot be started
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.borrow().clone()
    }

    pub fn usage_requests(&self) -> usize {
        self.usage_requests.get()
    }
}

impl SshClient for RecordingSsh {
    fn run(&self, args: &[OsString]) -> Result<Option<i32>> {
        if self.fail {
            bail!("ssh: not found");
        }
        self.calls.borrow_mut().push(args.to_vec());
        Ok(Some(self.exit_code))
    }

    fn usage(&self) -> Result<String> {
        self.usage_requests.set(self.usage_requests.get() + 1);
        Ok("usage: ssh [-46AaCfGgKkMNnqsTtVvXxYy] destination [command]".to_string())
    }
}

/// A [`Picker`] that answers with a fixed profile name
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answer: Option<String>,
    offered: RefCell<Option<Vec<String>>>,
}

impl ScriptedPicker {
    pub fn select(name: &str) -> Self {
        Self {
            answer: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn cancel() -> Self {
        Self::default()
    }

    pub fn was_shown(&self) -> bool {
        self.offered.borrow().is_some()
    }

    /// Names in the order they were offered
    pub fn offered(&self) -> Vec<String> {
        self.offered.borrow().clone().unwrap_or_default()
    }
}

impl Picker for ScriptedPicker {
    fn pick<'a>(&self, profiles: &'a [Profile]) -> Option<&'a Profile> {
        *self.offered.borrow_mut() = Some(profiles.iter().map(|p| p.name.clone()).collect());
        let answer = self.answer.as_deref()?;
        profiles.iter().find(|p| p.name == answer)
    }
}
